use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use super::point::Point2d;
use super::vector::Vec2;
use crate::SENTINEL;

/// A line stored by two endpoints.
///
/// Unbounded lines are drawn between endpoints pushed far past their
/// defining points, but intersection tests treat them as infinite. Only a
/// `bounded` line (a segment) restricts hits to its `[0, 1]` parameter range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line2d {
    pub start: Point2d,
    pub end: Point2d,
    pub bounded: bool,
}

impl Line2d {
    pub const UNDEFINED: Self = Self {
        start: Point2d::UNDEFINED,
        end: Point2d::UNDEFINED,
        bounded: false,
    };

    pub fn segment(a: Point2d, b: Point2d) -> Self {
        Self {
            start: a,
            end: b,
            bounded: true,
        }
    }

    /// Infinite line through `a` and `b`, drawn `extent` past each of them.
    pub fn through(a: Point2d, b: Point2d, extent: f64) -> Self {
        match (b - a).normalized() {
            Some(u) => Self {
                start: a - u * extent,
                end: b + u * extent,
                bounded: false,
            },
            None => Self::UNDEFINED,
        }
    }

    /// Infinite line through `p` along `direction`.
    pub fn from_direction(p: Point2d, direction: Vec2, extent: f64) -> Self {
        if !p.is_defined() {
            return Self::UNDEFINED;
        }
        match direction.normalized() {
            Some(u) => Self {
                start: p - u * extent,
                end: p + u * extent,
                bounded: false,
            },
            None => Self::UNDEFINED,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.start.is_defined() && self.end.is_defined() && self.start != self.end
    }

    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    pub fn unit_direction(&self) -> Option<Vec2> {
        self.direction().normalized()
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// `start + t * (end - start)`.
    pub fn point_at(&self, t: f64) -> Point2d {
        self.start.lerp(&self.end, t)
    }

    /// Parameter of the orthogonal projection of `p` onto the line.
    pub fn parameter_of(&self, p: &Point2d) -> f64 {
        let d = self.direction();
        let len2 = d.length_squared();
        if len2 < 1e-30 {
            return SENTINEL;
        }
        (*p - self.start).dot(&d) / len2
    }

    pub fn distance_to_point(&self, p: &Point2d) -> f64 {
        match self.unit_direction() {
            Some(u) => (*p - self.start).cross(&u).abs(),
            None => SENTINEL,
        }
    }
}

/// A circle by center and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle2d {
    pub center: Point2d,
    pub radius: f64,
}

impl Circle2d {
    pub const UNDEFINED: Self = Self {
        center: Point2d::UNDEFINED,
        radius: SENTINEL,
    };

    pub fn new(center: Point2d, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Circle centered at `center` passing through `on`.
    pub fn through(center: Point2d, on: Point2d) -> Self {
        Self::new(center, center.distance_to(&on))
    }

    pub fn is_defined(&self) -> bool {
        self.center.is_defined() && self.radius.is_finite()
    }

    pub fn point_at_angle(&self, theta: f64) -> Point2d {
        Point2d::new(
            self.center.x + self.radius * theta.cos(),
            self.center.y + self.radius * theta.sin(),
        )
    }

    /// Polar angle of `p` about the center, in `[0, 2π)`.
    pub fn angle_of(&self, p: &Point2d) -> f64 {
        let theta = (p.y - self.center.y).atan2(p.x - self.center.x);
        if theta < 0.0 { theta + TAU } else { theta }
    }
}
