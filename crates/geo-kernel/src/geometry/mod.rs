pub mod point;
pub mod vector;
pub mod curves;
pub mod intersection;
pub mod construct;
pub mod triangle;
