use tracing::trace;

use super::curves::{Circle2d, Line2d};
use super::intersection::{circle_circle_intersect, line_line_intersect};
use super::point::Point2d;
use crate::Tolerance;

/// Orthogonal projection of `p` onto the infinite extension of `line`.
pub fn foot_of_perpendicular(p: &Point2d, line: &Line2d) -> Point2d {
    if !line.is_defined() || !p.is_defined() {
        return Point2d::UNDEFINED;
    }
    line.point_at(line.parameter_of(p))
}

/// Perpendicular bisector of `a`–`b`.
pub fn perpendicular_bisector(a: &Point2d, b: &Point2d, extent: f64) -> Line2d {
    Line2d::from_direction(a.midpoint(b), (*b - *a).perp(), extent)
}

/// Point where a tangent from `p` touches `circle`.
///
/// A point on the circle is its own tangent point. A point inside has none.
/// From outside, the two candidates are the intersections of `circle` with
/// the circle on diameter `p`–center; `clockwise` is forwarded to
/// [`circle_circle_intersect`] with that diameter circle first.
pub fn tangent_point(p: &Point2d, circle: &Circle2d, clockwise: bool, tol: &Tolerance) -> Option<Point2d> {
    if !p.is_defined() || !circle.is_defined() {
        return None;
    }
    let dist = p.distance_to(&circle.center);
    if tol.equal(dist, circle.radius) {
        return Some(*p);
    }
    if dist < circle.radius {
        trace!(dist, radius = circle.radius, "tangent source inside circle");
        return None;
    }
    let thales = Circle2d::new(p.midpoint(&circle.center), dist / 2.0);
    circle_circle_intersect(&thales, circle, clockwise, tol)
}

/// Tangent line from `p` to `circle`, drawn `tol.extent` past both ends.
/// Undefined when `p` is inside.
pub fn tangent_line(p: &Point2d, circle: &Circle2d, clockwise: bool, tol: &Tolerance) -> Line2d {
    match tangent_point(p, circle, clockwise, tol) {
        Some(touch) if tol.points_coincident(&touch, p) => {
            Line2d::from_direction(*p, (*p - circle.center).perp(), tol.extent)
        }
        Some(touch) => Line2d::through(*p, touch, tol.extent),
        None => Line2d::UNDEFINED,
    }
}

/// Center of the circle tangent to `c1` at `p` and also tangent to `c2`.
///
/// `p` is expected on `c1`; if it lies on `c2` instead the two circles swap
/// roles. With `external` set, the helper point is placed on the far side
/// of `p` from its circle's center and the result is externally tangent to
/// the other circle.
pub fn tangent_circle_center(
    c1: &Circle2d,
    c2: &Circle2d,
    p: &Point2d,
    external: bool,
    tol: &Tolerance,
) -> Option<Point2d> {
    if !c1.is_defined() || !c2.is_defined() || !p.is_defined() {
        return None;
    }
    let (home, other) = if tol.equal(p.distance_to(&c2.center), c2.radius) {
        (c2, c1)
    } else {
        (c1, c2)
    };
    let u = (home.center - *p).normalized()?;
    let side = if external { -1.0 } else { 1.0 };
    let helper = *p + u * (side * other.radius);
    if helper.distance_to(&other.center) < 1e-12 {
        return None;
    }

    let radial = Line2d::through(home.center, *p, tol.extent);
    let bisector = perpendicular_bisector(&other.center, &helper, tol.extent);
    line_line_intersect(&radial, &bisector)
}

/// The full tangent circle: center from [`tangent_circle_center`], radius
/// the distance from that center to `p`.
pub fn tangent_circle(
    c1: &Circle2d,
    c2: &Circle2d,
    p: &Point2d,
    external: bool,
    tol: &Tolerance,
) -> Circle2d {
    match tangent_circle_center(c1, c2, p, external, tol) {
        Some(center) => Circle2d::through(center, *p),
        None => Circle2d::UNDEFINED,
    }
}
