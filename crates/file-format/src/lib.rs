//! Text codecs for diagrams: the line-oriented project format and
//! Asymptote export.

pub mod asy_export;
pub mod errors;
pub mod grammar;
pub mod load;
pub mod save;

pub use asy_export::{export_asymptote, with_symbols, ExportOptions, SymbolGuard, DEFAULT_SCALE};
pub use errors::{ExportError, LoadError, ParseError};
pub use grammar::{describe, encode_command, parse_command, parse_description};
pub use load::{load_project, load_project_strict, LoadReport, SkipReason, SkippedLine};
pub use save::save_project;
