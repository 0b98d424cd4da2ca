use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three families of shapes a diagram is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeCategory {
    Point,
    Line,
    Circle,
}

impl ShapeCategory {
    /// Upper-case tag used in the project text format.
    pub fn tag(self) -> &'static str {
        match self {
            ShapeCategory::Point => "POINT",
            ShapeCategory::Line => "LINE",
            ShapeCategory::Circle => "CIRCLE",
        }
    }
}

impl fmt::Display for ShapeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown shape category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ShapeCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "POINT" => Ok(ShapeCategory::Point),
            "LINE" => Ok(ShapeCategory::Line),
            "CIRCLE" => Ok(ShapeCategory::Circle),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}
