//! Closed-form triangle centers.
//!
//! Every function treats a collinear (or coincident) triple as degenerate
//! and answers with the sentinel rather than a huge but finite value.

use super::point::Point2d;
use super::vector::Vec2;
use crate::SENTINEL;

/// True when `a`, `b`, `c` span no area.
pub fn is_collinear(a: &Point2d, b: &Point2d, c: &Point2d) -> bool {
    let ab = *b - *a;
    let ac = *c - *a;
    ab.cross(&ac).abs() <= 1e-10 * ab.length() * ac.length()
}

fn degenerate(a: &Point2d, b: &Point2d, c: &Point2d) -> bool {
    !a.is_defined() || !b.is_defined() || !c.is_defined() || is_collinear(a, b, c)
}

pub fn circumcenter(a: &Point2d, b: &Point2d, c: &Point2d) -> Point2d {
    if degenerate(a, b, c) {
        return Point2d::UNDEFINED;
    }
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    Point2d::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    )
}

pub fn circumradius(a: &Point2d, b: &Point2d, c: &Point2d) -> f64 {
    let o = circumcenter(a, b, c);
    if o.is_defined() { o.distance_to(a) } else { SENTINEL }
}

/// Barycentric combination weighted by the opposite side lengths.
pub fn incenter(a: &Point2d, b: &Point2d, c: &Point2d) -> Point2d {
    if degenerate(a, b, c) {
        return Point2d::UNDEFINED;
    }
    let wa = b.distance_to(c);
    let wb = a.distance_to(c);
    let wc = a.distance_to(b);
    let sum = wa + wb + wc;
    Point2d::new(
        (wa * a.x + wb * b.x + wc * c.x) / sum,
        (wa * a.y + wb * b.y + wc * c.y) / sum,
    )
}

/// `2 · area / perimeter`.
pub fn inradius(a: &Point2d, b: &Point2d, c: &Point2d) -> f64 {
    if degenerate(a, b, c) {
        return SENTINEL;
    }
    let area2 = (*b - *a).cross(&(*c - *a)).abs();
    let perimeter = a.distance_to(b) + b.distance_to(c) + c.distance_to(a);
    area2 / perimeter
}

/// Uses `H = A + B + C − 2·O` with `O` the circumcenter.
pub fn orthocenter(a: &Point2d, b: &Point2d, c: &Point2d) -> Point2d {
    let o = circumcenter(a, b, c);
    if !o.is_defined() {
        return Point2d::UNDEFINED;
    }
    Point2d::new(a.x + b.x + c.x - 2.0 * o.x, a.y + b.y + c.y - 2.0 * o.y)
}

pub fn centroid(a: &Point2d, b: &Point2d, c: &Point2d) -> Point2d {
    if degenerate(a, b, c) {
        return Point2d::UNDEFINED;
    }
    Point2d::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
}

/// Unit direction bisecting the angle `a`–`vertex`–`c`.
///
/// Undefined when either arm has zero length or the angle is straight.
pub fn angle_bisector_direction(a: &Point2d, vertex: &Point2d, c: &Point2d) -> Vec2 {
    let (Some(u), Some(v)) = ((*a - *vertex).normalized(), (*c - *vertex).normalized()) else {
        return Vec2::UNDEFINED;
    };
    (u + v).normalized().unwrap_or(Vec2::UNDEFINED)
}
