use tracing::trace;

use super::curves::{Circle2d, Line2d};
use super::point::Point2d;
use crate::Tolerance;

/// Slack on the `[0, 1]` range of a segment, so hits exactly at an
/// endpoint survive rounding.
const PARAM_SLACK: f64 = 1e-9;

// ─── Line-Line Intersection ──────────────────────────────────────────────────

/// Intersect two lines. None if either is undefined, they are parallel, or
/// the hit lies outside a bounded line's `[0, 1]` parameter range.
pub fn line_line_intersect(l1: &Line2d, l2: &Line2d) -> Option<Point2d> {
    if !l1.is_defined() || !l2.is_defined() {
        return None;
    }
    let d1 = l1.direction();
    let d2 = l2.direction();
    let denom = d1.cross(&d2);
    if denom.abs() <= 1e-12 * d1.length() * d2.length() {
        return None; // parallel
    }

    let w = l2.start - l1.start;
    let t = w.cross(&d2) / denom;
    let u = w.cross(&d1) / denom;

    let in_range = |bounded: bool, s: f64| !bounded || (-PARAM_SLACK..=1.0 + PARAM_SLACK).contains(&s);
    if !in_range(l1.bounded, t) || !in_range(l2.bounded, u) {
        trace!(t, u, "line-line hit outside segment bounds");
        return None;
    }
    Some(l1.point_at(t))
}

// ─── Line-Circle Intersection ────────────────────────────────────────────────

/// Intersect a line with a circle.
///
/// The discriminant `r²·dr² − D²` is divided by `dr²` before it is compared
/// against `tol.epsilon`, so the test does not depend on how far the line's
/// endpoints were extended. With two roots, `nearer_start` picks the one
/// closer to `line.start`; otherwise the farther one is returned.
pub fn line_circle_intersect(
    line: &Line2d,
    circle: &Circle2d,
    nearer_start: bool,
    tol: &Tolerance,
) -> Option<Point2d> {
    if !line.is_defined() || !circle.is_defined() {
        return None;
    }
    let c = circle.center;
    let (x1, y1) = (line.start.x - c.x, line.start.y - c.y);
    let (x2, y2) = (line.end.x - c.x, line.end.y - c.y);
    let dx = x2 - x1;
    let dy = y2 - y1;
    let dr2 = dx * dx + dy * dy;
    let det = x1 * y2 - x2 * y1;
    let disc = circle.radius * circle.radius - det * det / dr2;

    if disc < -tol.epsilon {
        return None;
    }
    if disc < tol.epsilon {
        return Some(Point2d::new(det * dy / dr2 + c.x, -det * dx / dr2 + c.y));
    }

    let root = (disc * dr2).sqrt();
    let sign = if dy < 0.0 { -1.0 } else { 1.0 };
    let first = Point2d::new(
        (det * dy + sign * dx * root) / dr2 + c.x,
        (-det * dx + dy.abs() * root) / dr2 + c.y,
    );
    let second = Point2d::new(
        (det * dy - sign * dx * root) / dr2 + c.x,
        (-det * dx - dy.abs() * root) / dr2 + c.y,
    );

    let first_is_nearer =
        first.distance_squared_to(&line.start) <= second.distance_squared_to(&line.start);
    let hit = if first_is_nearer == nearer_start { first } else { second };
    if line.bounded {
        let t = line.parameter_of(&hit);
        if !(-PARAM_SLACK..=1.0 + PARAM_SLACK).contains(&t) {
            return None;
        }
    }
    Some(hit)
}

// ─── Circle-Circle Intersection ──────────────────────────────────────────────

/// Intersect two circles along their radical line.
///
/// Let `u` be the unit vector from `c1` toward `c2`. With `clockwise` set the
/// hit is offset from the center line along `(u.y, -u.x)`, otherwise along
/// `(-u.y, u.x)`. Tangent circles yield their single touching point.
pub fn circle_circle_intersect(
    c1: &Circle2d,
    c2: &Circle2d,
    clockwise: bool,
    tol: &Tolerance,
) -> Option<Point2d> {
    if !c1.is_defined() || !c2.is_defined() {
        return None;
    }
    let delta = c2.center - c1.center;
    let d = delta.length();
    if d < 1e-12 {
        return None; // concentric
    }
    let (r1, r2) = (c1.radius, c2.radius);

    if tol.equal(d, r1 + r2) {
        return Some(c1.center + delta * (r1 / d));
    }
    if d > r1 + r2 {
        return None;
    }
    if tol.equal(d, (r1 - r2).abs()) {
        let toward = if r1 >= r2 { 1.0 } else { -1.0 };
        return Some(c1.center + delta * (toward * r1 / d));
    }
    if d < (r1 - r2).abs() {
        return None; // one circle inside the other
    }

    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let s = if clockwise { 1.0 } else { -1.0 };
    Some(Point2d::new(
        c1.center.x + delta.x * a / d + h * s * delta.y / d,
        c1.center.y + delta.y * a / d - h * s * delta.x / d,
    ))
}
