//! Assertion helpers with diagnostic output.
//!
//! Every failure names the shape, the expected and actual values and the
//! tolerance used.

use geo_kernel::Point2d;
use pad_bridge::ShapeView;

use crate::helpers::HarnessError;
use crate::workflow::DiagramBuilder;

/// Assert that `name` is a defined point within `tol` of `(x, y)`.
pub fn assert_point_near(
    d: &DiagramBuilder,
    name: &str,
    x: f64,
    y: f64,
    tol: f64,
) -> Result<(), HarnessError> {
    let p = d.point_at(name)?;
    let dist = p.distance_to(&Point2d::new(x, y));
    if dist <= tol {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected ({:.4}, {:.4}), got ({:.4}, {:.4}), off by {:.3e} (tol={})",
                name, x, y, p.x, p.y, dist, tol,
            ),
        })
    }
}

/// Assert that `name` is a defined circle with the given center and radius.
pub fn assert_circle_near(
    d: &DiagramBuilder,
    name: &str,
    center: (f64, f64),
    radius: f64,
    tol: f64,
) -> Result<(), HarnessError> {
    let c = d.circle_at(name)?;
    let off = c.center.distance_to(&Point2d::new(center.0, center.1));
    if off <= tol && (c.radius - radius).abs() <= tol {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected center ({:.4}, {:.4}) r={:.4}, got ({:.4}, {:.4}) r={:.4} (tol={})",
                name, center.0, center.1, radius, c.center.x, c.center.y, c.radius, tol,
            ),
        })
    }
}

/// Assert that `name` exists but its geometry is the undefined sentinel.
pub fn assert_undefined(d: &DiagramBuilder, name: &str) -> Result<(), HarnessError> {
    let view = d.shape(name)?;
    match view.geometry {
        None => Ok(()),
        Some(g) => Err(HarnessError::AssertionFailed {
            detail: format!("[{}] expected undefined geometry, got {:?}", name, g),
        }),
    }
}

/// Assert that no shape called `name` is alive.
pub fn assert_absent(d: &DiagramBuilder, name: &str) -> Result<(), HarnessError> {
    match d.shape(name) {
        Err(HarnessError::ShapeNotFound { .. }) => Ok(()),
        Ok(view) => Err(HarnessError::AssertionFailed {
            detail: format!("[{}] expected no such shape, found level {} {}", name, view.level, view.kind),
        }),
        Err(other) => Err(other),
    }
}

/// Assert the diagram's (name, construction tag) pairs in insertion order.
pub fn assert_shapes(d: &DiagramBuilder, expected: &[(&str, &str)]) -> Result<(), HarnessError> {
    let actual: Vec<(String, String)> = d
        .shapes()
        .into_iter()
        .map(|s| (s.name, s.kind))
        .collect();

    if actual.len() != expected.len() {
        return Err(HarnessError::AssertionFailed {
            detail: format!(
                "shape count mismatch: expected {}, got {}.\nActual: {:?}",
                expected.len(),
                actual.len(),
                actual,
            ),
        });
    }

    for (i, ((act_name, act_kind), (exp_name, exp_kind))) in
        actual.iter().zip(expected.iter()).enumerate()
    {
        if act_name != exp_name || act_kind != exp_kind {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "shape mismatch at index {}: expected (\"{}\", \"{}\"), got (\"{}\", \"{}\")",
                    i, exp_name, exp_kind, act_name, act_kind,
                ),
            });
        }
    }
    Ok(())
}

/// Assert that two snapshots describe the same diagram, coordinates compared
/// within `tol`. Reports the first differing shape.
pub fn assert_same_diagram(
    before: &[ShapeView],
    after: &[ShapeView],
    tol: f64,
) -> Result<(), HarnessError> {
    if before.len() != after.len() {
        return Err(HarnessError::AssertionFailed {
            detail: format!(
                "shape count changed: {} -> {}",
                before.len(),
                after.len()
            ),
        });
    }
    for (a, b) in before.iter().zip(after) {
        let same_structure = a.name == b.name
            && a.kind == b.kind
            && a.dependencies == b.dependencies
            && a.level == b.level
            && a.hidden == b.hidden
            && a.color == b.color;
        if !same_structure {
            return Err(HarnessError::AssertionFailed {
                detail: format!("shape differs:\n  before: {:?}\n  after:  {:?}", a, b),
            });
        }
        if !geometry_close(a, b, tol) {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] geometry differs: {:?} vs {:?} (tol={})",
                    a.name, a.geometry, b.geometry, tol,
                ),
            });
        }
    }
    Ok(())
}

fn geometry_close(a: &ShapeView, b: &ShapeView, tol: f64) -> bool {
    use construction_engine::Geometry::*;
    match (a.geometry, b.geometry) {
        (None, None) => true,
        (Some(Point(p)), Some(Point(q))) => p.distance_to(&q) <= tol,
        (Some(Line(l)), Some(Line(m))) => {
            l.start.distance_to(&m.start) <= tol && l.end.distance_to(&m.end) <= tol
        }
        (Some(Circle(c)), Some(Circle(d))) => {
            c.center.distance_to(&d.center) <= tol && (c.radius - d.radius).abs() <= tol
        }
        _ => false,
    }
}
