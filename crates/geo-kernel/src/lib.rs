pub mod geometry;

pub use geometry::curves::{Circle2d, Line2d};
pub use geometry::point::Point2d;
pub use geometry::vector::Vec2;

/// Absolute tolerance for comparing derived coordinates.
pub const EPSILON: f64 = 1e-3;

/// Distance unbounded lines are extended past their defining points.
pub const EXTENT: f64 = 2000.0;

/// Coordinate value marking a construction with no well-defined result.
pub const SENTINEL: f64 = f64::INFINITY;

/// Tolerance configuration for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Values closer than this are considered equal.
    pub epsilon: f64,
    /// How far unbounded lines are drawn past their defining points.
    pub extent: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            extent: EXTENT,
        }
    }
}

impl Tolerance {
    /// Tighter comparison for numerically clean inputs.
    pub fn strict() -> Self {
        Self {
            epsilon: 1e-9,
            ..Self::default()
        }
    }

    /// Looser comparison for coordinates snapped to a pixel grid.
    pub fn loose() -> Self {
        Self {
            epsilon: 0.5,
            ..Self::default()
        }
    }

    /// `|a - b| < epsilon`. Use this instead of `==` on derived coordinates.
    pub fn equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.epsilon
    }

    pub fn points_coincident(&self, a: &Point2d, b: &Point2d) -> bool {
        a.distance_to(b) < self.epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_uses_epsilon() {
        let tol = Tolerance::default();
        assert!(tol.equal(1.0, 1.0009));
        assert!(!tol.equal(1.0, 1.002));
        assert!(!tol.equal(SENTINEL, 1.0));
    }

    #[test]
    fn tolerance_presets() {
        assert!(Tolerance::strict().epsilon < Tolerance::default().epsilon);
        assert!(Tolerance::loose().equal(10.0, 10.3));
        assert_eq!(Tolerance::loose().extent, EXTENT);
        assert!(!Tolerance::strict().points_coincident(&Point2d::ORIGIN, &Point2d::new(1e-6, 0.0)));
        assert!(Tolerance::default().points_coincident(&Point2d::ORIGIN, &Point2d::new(1e-6, 0.0)));
    }
}
