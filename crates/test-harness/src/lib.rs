//! Test harness for construction diagrams.
//!
//! Provides programmatic tools for scripting multi-step constructions,
//! verifying them at every step and producing diagnostic output.
//!
//! # Key Components
//!
//! - [`DiagramBuilder`]: fluent API over the bridge dispatch path
//! - [`oracle`]: verification functions returning pass/fail verdicts
//! - [`report`]: structured text descriptions of a diagram
//! - [`helpers`]: error type, request builders, geometry accessors
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;
pub mod workflow;

pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use report::DiagramReport;
pub use workflow::DiagramBuilder;
