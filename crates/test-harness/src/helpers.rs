//! Helper functions: error type, draw-spec constructors, geometry accessors.

use construction_engine::{DrawSpec, PointKind, ShapeKind};
use geo_kernel::{Circle2d, Line2d, Point2d};
use pad_bridge::ShapeView;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("shape not found: {name}")]
    ShapeNotFound { name: String },

    #[error("dispatch error: {message}")]
    DispatchError { message: String },

    #[error("{name} has no defined {expected} geometry")]
    WrongGeometry { name: String, expected: &'static str },

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },
}

// ── DrawSpec Constructors ───────────────────────────────────────────────────

pub fn free_point(name: &str, x: f64, y: f64) -> DrawSpec {
    DrawSpec {
        kind: ShapeKind::Point(PointKind::Free),
        dependencies: Vec::new(),
        name: Some(name.to_string()),
        position: Some(Point2d::new(x, y)),
    }
}

/// A constructed shape. `name` only applies to points.
pub fn construction(kind: ShapeKind, deps: &[&str], name: Option<&str>) -> DrawSpec {
    DrawSpec {
        kind,
        dependencies: deps.iter().map(|d| d.to_string()).collect(),
        name: name.map(str::to_string),
        position: None,
    }
}

// ── Geometry Accessors ──────────────────────────────────────────────────────

pub fn point_of(view: &ShapeView) -> Result<Point2d, HarnessError> {
    view.geometry
        .and_then(|g| g.as_point())
        .ok_or_else(|| HarnessError::WrongGeometry {
            name: view.name.clone(),
            expected: "point",
        })
}

pub fn line_of(view: &ShapeView) -> Result<Line2d, HarnessError> {
    view.geometry
        .and_then(|g| g.as_line())
        .ok_or_else(|| HarnessError::WrongGeometry {
            name: view.name.clone(),
            expected: "line",
        })
}

pub fn circle_of(view: &ShapeView) -> Result<Circle2d, HarnessError> {
    view.geometry
        .and_then(|g| g.as_circle())
        .ok_or_else(|| HarnessError::WrongGeometry {
            name: view.name.clone(),
            expected: "circle",
        })
}
