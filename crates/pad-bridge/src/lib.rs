//! Message-level API over the construction engine.
//!
//! A front end holds one [`Session`] and talks to it through [`dispatch`]
//! (typed) or [`dispatch_json`] (serialized), one request per call.

pub mod dispatch;
pub mod messages;
pub mod session;

pub use dispatch::{dispatch, dispatch_json};
pub use messages::{Request, Response, ShapeView, SkippedLineView};
pub use session::{BridgeError, Session};
