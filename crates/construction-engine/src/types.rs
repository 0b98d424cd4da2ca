use geo_kernel::{Circle2d, Line2d, Point2d};
use pad_types::{Color, ShapeCategory};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;
use std::str::FromStr;

new_key_type! {
    /// Stable handle to a shape in a [`Diagram`](crate::Diagram).
    pub struct ShapeId;
}

/// Labels point down and to the right until dragged.
pub const DEFAULT_LABEL_DIRECTION: f64 = -std::f64::consts::FRAC_PI_4;

/// Which classical center a triangle-center point tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriangleCenter {
    Circumcenter,
    Incenter,
    Orthocenter,
    Centroid,
}

impl TriangleCenter {
    pub fn tag(self) -> &'static str {
        match self {
            TriangleCenter::Circumcenter => "CIRCUMCENTER",
            TriangleCenter::Incenter => "INCENTER",
            TriangleCenter::Orthocenter => "ORTHOCENTER",
            TriangleCenter::Centroid => "CENTROID",
        }
    }
}

impl FromStr for TriangleCenter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CIRCUMCENTER" => Ok(TriangleCenter::Circumcenter),
            "INCENTER" => Ok(TriangleCenter::Incenter),
            "ORTHOCENTER" => Ok(TriangleCenter::Orthocenter),
            "CENTROID" => Ok(TriangleCenter::Centroid),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PointKind {
    /// Owns its coordinates.
    Free,
    /// Rides on a line (parameter along it) or circle (polar angle).
    OnShape { relative_location: f64 },
    /// Meets two curves. `identifier` picks between two solutions.
    Intersection { identifier: bool },
    Midpoint,
    /// `A + ratio * (B - A)`.
    Relative { ratio: f64 },
    TriangleCenter { center: TriangleCenter },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LineKind {
    Segment,
    Through,
    Parallel,
    Perpendicular,
    AngleBisector,
    PerpBisector,
    Tangent { identifier: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CircleKind {
    /// Center plus a point on the circle.
    ByRadiusPoint,
    Circumcircle,
    Incircle,
    /// Tangent to one circle at a given point and to a second circle.
    Tangent { identifier: bool },
}

/// The construction rule of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Point(PointKind),
    Line(LineKind),
    Circle(CircleKind),
}

/// What a dependency slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Point,
    Line,
    Circle,
    /// A line or a circle.
    Curve,
}

impl Slot {
    pub fn accepts(self, category: ShapeCategory) -> bool {
        matches!(
            (self, category),
            (Slot::Point, ShapeCategory::Point)
                | (Slot::Line, ShapeCategory::Line)
                | (Slot::Circle, ShapeCategory::Circle)
                | (Slot::Curve, ShapeCategory::Line | ShapeCategory::Circle)
        )
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Slot::Point => "point",
            Slot::Line => "line",
            Slot::Circle => "circle",
            Slot::Curve => "curve",
        };
        f.write_str(s)
    }
}

impl ShapeKind {
    pub fn category(&self) -> ShapeCategory {
        match self {
            ShapeKind::Point(_) => ShapeCategory::Point,
            ShapeKind::Line(_) => ShapeCategory::Line,
            ShapeKind::Circle(_) => ShapeCategory::Circle,
        }
    }

    /// Construction tag used in project files.
    pub fn tag(&self) -> &'static str {
        match self {
            ShapeKind::Point(k) => match k {
                PointKind::Free => "POINT",
                PointKind::OnShape { .. } => "POINT_ON_SHAPE",
                PointKind::Intersection { .. } => "INTERSECTION_POINT",
                PointKind::Midpoint => "MIDPOINT",
                PointKind::Relative { .. } => "RELATIVE_POINT",
                PointKind::TriangleCenter { .. } => "TRIANGLE_CENTER",
            },
            ShapeKind::Line(k) => match k {
                LineKind::Segment => "SEGMENT",
                LineKind::Through => "LINE",
                LineKind::Parallel => "PARALLEL_LINE",
                LineKind::Perpendicular => "PERPENDICULAR_LINE",
                LineKind::AngleBisector => "ANGLE_BISECTOR",
                LineKind::PerpBisector => "PERPENDICULAR_BISECTOR",
                LineKind::Tangent { .. } => "TANGENT_LINE",
            },
            ShapeKind::Circle(k) => match k {
                CircleKind::ByRadiusPoint => "CIRCLE",
                CircleKind::Circumcircle => "CIRCUMCIRCLE",
                CircleKind::Incircle => "INCIRCLE",
                CircleKind::Tangent { .. } => "TANGENT_CIRCLE",
            },
        }
    }

    /// Dependency slots in order.
    pub fn slots(&self) -> &'static [Slot] {
        use Slot::*;
        match self {
            ShapeKind::Point(k) => match k {
                PointKind::Free => &[],
                PointKind::OnShape { .. } => &[Curve],
                PointKind::Intersection { .. } => &[Curve, Curve],
                PointKind::Midpoint | PointKind::Relative { .. } => &[Point, Point],
                PointKind::TriangleCenter { .. } => &[Point, Point, Point],
            },
            ShapeKind::Line(k) => match k {
                LineKind::Segment | LineKind::Through | LineKind::PerpBisector => &[Point, Point],
                LineKind::Parallel | LineKind::Perpendicular => &[Point, Line],
                LineKind::AngleBisector => &[Point, Point, Point],
                LineKind::Tangent { .. } => &[Point, Circle],
            },
            ShapeKind::Circle(k) => match k {
                CircleKind::ByRadiusPoint => &[Point, Point],
                CircleKind::Circumcircle | CircleKind::Incircle => &[Point, Point, Point],
                CircleKind::Tangent { .. } => &[Circle, Circle, Point],
            },
        }
    }

    /// The two-solution selector, if this construction has one.
    pub fn identifier(&self) -> Option<bool> {
        match self {
            ShapeKind::Point(PointKind::Intersection { identifier })
            | ShapeKind::Line(LineKind::Tangent { identifier })
            | ShapeKind::Circle(CircleKind::Tangent { identifier }) => Some(*identifier),
            _ => None,
        }
    }
}

/// Derived coordinates of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point(Point2d),
    Line(Line2d),
    Circle(Circle2d),
}

impl Geometry {
    pub fn undefined(category: ShapeCategory) -> Self {
        match category {
            ShapeCategory::Point => Geometry::Point(Point2d::UNDEFINED),
            ShapeCategory::Line => Geometry::Line(Line2d::UNDEFINED),
            ShapeCategory::Circle => Geometry::Circle(Circle2d::UNDEFINED),
        }
    }

    pub fn is_defined(&self) -> bool {
        match self {
            Geometry::Point(p) => p.is_defined(),
            Geometry::Line(l) => l.is_defined(),
            Geometry::Circle(c) => c.is_defined(),
        }
    }

    /// Collapse NaN-poisoned or infinite results onto the sentinel.
    pub fn normalized(self) -> Self {
        match self {
            Geometry::Point(p) if !p.is_defined() => Geometry::Point(Point2d::UNDEFINED),
            Geometry::Line(l) if !l.is_defined() => Geometry::Line(Line2d::UNDEFINED),
            Geometry::Circle(c) if !c.is_defined() => Geometry::Circle(Circle2d::UNDEFINED),
            other => other,
        }
    }

    pub fn as_point(&self) -> Option<Point2d> {
        match self {
            Geometry::Point(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<Line2d> {
        match self {
            Geometry::Line(l) => Some(*l),
            _ => None,
        }
    }

    pub fn as_circle(&self) -> Option<Circle2d> {
        match self {
            Geometry::Circle(c) => Some(*c),
            _ => None,
        }
    }
}

/// A live node of the construction graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    pub name: String,
    pub kind: ShapeKind,
    /// Fixed at construction.
    pub dependencies: Vec<ShapeId>,
    /// Shapes constructed from this one, in insertion order.
    pub children: Vec<ShapeId>,
    /// 0 for roots, otherwise one more than the deepest dependency.
    pub level: u32,
    pub hidden: bool,
    /// Marked for the next sweep.
    pub removed: bool,
    pub in_export: bool,
    pub color: Color,
    /// Radians, in screen coordinates (y down).
    pub label_direction: f64,
    pub geometry: Geometry,
}

impl Shape {
    pub fn category(&self) -> ShapeCategory {
        self.kind.category()
    }

    pub fn is_root(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// What to build: handed to [`Diagram::add_shape`](crate::Diagram::add_shape).
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSpec {
    pub kind: ShapeKind,
    pub dependencies: Vec<ShapeId>,
    /// Point name; a free name is picked when absent. Ignored for lines and
    /// circles, whose names derive from their dependencies.
    pub name: Option<String>,
    /// Initial coordinates of a free point.
    pub position: Option<Point2d>,
}

impl ShapeSpec {
    pub fn new(kind: ShapeKind, dependencies: Vec<ShapeId>) -> Self {
        Self {
            kind,
            dependencies,
            name: None,
            position: None,
        }
    }

    pub fn free_point(x: f64, y: f64) -> Self {
        Self {
            kind: ShapeKind::Point(PointKind::Free),
            dependencies: Vec::new(),
            name: None,
            position: Some(Point2d::new(x, y)),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Serializable view of one shape, used to compare diagram states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSnapshot {
    pub name: String,
    pub kind: ShapeKind,
    pub dependencies: Vec<String>,
    pub level: u32,
    pub hidden: bool,
    pub color: Color,
    pub label_direction: f64,
    pub geometry: Geometry,
}

/// Errors from graph and history operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("no shape named {name}")]
    UnknownName { name: String },

    #[error("shape handle is stale")]
    UnknownShape,

    #[error("name already in use: {name}")]
    DuplicateName { name: String },

    #[error("invalid point name: {name:?}")]
    InvalidName { name: String },

    #[error("{kind} expects ({expected}), got ({found})")]
    WrongDependencies {
        kind: &'static str,
        expected: String,
        found: String,
    },

    #[error("a free point needs a position")]
    MissingPosition,

    #[error("{name} is not a point")]
    NotAPoint { name: String },

    #[error("{name} cannot be moved directly")]
    NotMovable { name: String },

    #[error("{name} has no defined geometry")]
    Undefined { name: String },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,
}
