use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use super::vector::Vec2;
use crate::SENTINEL;

/// A point in the drawing plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// The degenerate-result sentinel.
    pub const UNDEFINED: Self = Self {
        x: SENTINEL,
        y: SENTINEL,
    };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// False for the sentinel and for anything NaN-poisoned by it.
    pub fn is_defined(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    pub fn distance_squared_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
        }
    }

    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x + t * (other.x - self.x),
            y: self.y + t * (other.y - self.y),
        }
    }

    /// Scale about `focus`: `focus + factor * (self - focus)`.
    pub fn scaled_about(&self, focus: &Self, factor: f64) -> Self {
        *focus + (*self - *focus) * factor
    }

    pub fn to_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl Add<Vec2> for Point2d {
    type Output = Point2d;
    fn add(self, rhs: Vec2) -> Self::Output {
        Point2d::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2d {
    type Output = Vec2;
    fn sub(self, rhs: Self) -> Self::Output {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub<Vec2> for Point2d {
    type Output = Point2d;
    fn sub(self, rhs: Vec2) -> Self::Output {
        Point2d::new(self.x - rhs.x, self.y - rhs.y)
    }
}
