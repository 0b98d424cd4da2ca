pub mod category;
pub mod color;
pub mod render;

pub use category::*;
pub use color::*;
pub use render::*;
