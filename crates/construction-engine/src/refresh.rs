use std::collections::HashSet;

use geo_kernel::geometry::construct::{perpendicular_bisector, tangent_circle, tangent_line};
use geo_kernel::geometry::intersection::{
    circle_circle_intersect, line_circle_intersect, line_line_intersect,
};
use geo_kernel::geometry::triangle::{
    angle_bisector_direction, centroid, circumcenter, circumradius, incenter, inradius,
    orthocenter,
};
use geo_kernel::{Circle2d, Line2d, Point2d};
use tracing::{debug, instrument, trace};

use crate::graph::Diagram;
use crate::types::{
    CircleKind, EngineError, Geometry, LineKind, PointKind, ShapeId, ShapeKind, TriangleCenter,
};

impl Diagram {
    /// `id` followed by everything built on it: pre-order depth-first over
    /// children in insertion order, each shape once.
    pub fn descendants(&self, id: ShapeId) -> Vec<ShapeId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let Some(shape) = self.shapes.get(node) else {
                continue;
            };
            if !seen.insert(node) {
                continue;
            }
            out.push(node);
            stack.extend(shape.children.iter().rev().copied());
        }
        out
    }

    /// Recompute `id` and its whole downstream closure from current
    /// dependency state.
    ///
    /// The closure is walked depth-first, then stably ordered by level so a
    /// shape reached through two parents is recomputed once, after both.
    #[instrument(skip(self))]
    pub fn refresh(&mut self, id: ShapeId) {
        let mut closure = self.descendants(id);
        closure.sort_by_key(|node| self.shapes[*node].level);
        debug!(count = closure.len(), "refresh cascade");
        for node in closure {
            self.recompute(node);
        }
    }

    /// Recompute every live shape once, roots first.
    pub fn refresh_all(&mut self) {
        for node in self.level_order() {
            self.recompute(node);
        }
    }

    /// Mark `id` and everything downstream of it for removal. Nothing is
    /// dropped until the next [`sweep`](Diagram::sweep).
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: ShapeId) -> Result<(), EngineError> {
        self.shape(id)?;
        let doomed = self.descendants(id);
        debug!(count = doomed.len(), "marking for removal");
        for node in doomed {
            self.shapes[node].removed = true;
        }
        Ok(())
    }

    pub(crate) fn recompute(&mut self, id: ShapeId) {
        let geometry = self.compute_geometry(id).normalized();
        if let Some(shape) = self.shapes.get_mut(id) {
            shape.geometry = geometry;
        }
    }

    fn compute_geometry(&self, id: ShapeId) -> Geometry {
        let Some(shape) = self.shapes.get(id) else {
            return Geometry::Point(Point2d::UNDEFINED);
        };
        let deps = &shape.dependencies;
        let tol = &self.tolerance;
        let extent = tol.extent;
        let pt = |i: usize| self.point(deps[i]);
        let line = |i: usize| self.line_geometry(deps[i]);
        let circle = |i: usize| self.circle_geometry(deps[i]);

        match shape.kind {
            ShapeKind::Point(kind) => Geometry::Point(match kind {
                PointKind::Free => shape.geometry.as_point().unwrap_or(Point2d::UNDEFINED),
                PointKind::OnShape { relative_location } => {
                    match self.shapes.get(deps[0]).map(|s| s.geometry) {
                        Some(Geometry::Line(l)) if l.is_defined() => l.point_at(relative_location),
                        Some(Geometry::Circle(c)) if c.is_defined() => {
                            c.point_at_angle(relative_location)
                        }
                        _ => Point2d::UNDEFINED,
                    }
                }
                PointKind::Intersection { identifier } => self.intersection(deps[0], deps[1], identifier),
                PointKind::Midpoint => pt(0).midpoint(&pt(1)),
                PointKind::Relative { ratio } => pt(0).lerp(&pt(1), ratio),
                PointKind::TriangleCenter { center } => {
                    let (a, b, c) = (pt(0), pt(1), pt(2));
                    match center {
                        TriangleCenter::Circumcenter => circumcenter(&a, &b, &c),
                        TriangleCenter::Incenter => incenter(&a, &b, &c),
                        TriangleCenter::Orthocenter => orthocenter(&a, &b, &c),
                        TriangleCenter::Centroid => centroid(&a, &b, &c),
                    }
                }
            }),
            ShapeKind::Line(kind) => Geometry::Line(match kind {
                LineKind::Segment => Line2d::segment(pt(0), pt(1)),
                LineKind::Through => Line2d::through(pt(0), pt(1), extent),
                LineKind::Parallel => Line2d::from_direction(pt(0), line(1).direction(), extent),
                LineKind::Perpendicular => {
                    Line2d::from_direction(pt(0), line(1).direction().perp(), extent)
                }
                LineKind::AngleBisector => {
                    let vertex = pt(1);
                    Line2d::from_direction(vertex, angle_bisector_direction(&pt(0), &vertex, &pt(2)), extent)
                }
                LineKind::PerpBisector => perpendicular_bisector(&pt(0), &pt(1), extent),
                LineKind::Tangent { identifier } => tangent_line(&pt(0), &circle(1), identifier, tol),
            }),
            ShapeKind::Circle(kind) => Geometry::Circle(match kind {
                CircleKind::ByRadiusPoint => Circle2d::through(pt(0), pt(1)),
                CircleKind::Circumcircle => {
                    let (a, b, c) = (pt(0), pt(1), pt(2));
                    Circle2d::new(circumcenter(&a, &b, &c), circumradius(&a, &b, &c))
                }
                CircleKind::Incircle => {
                    let (a, b, c) = (pt(0), pt(1), pt(2));
                    Circle2d::new(incenter(&a, &b, &c), inradius(&a, &b, &c))
                }
                CircleKind::Tangent { identifier } => {
                    tangent_circle(&circle(0), &circle(1), &pt(2), identifier, tol)
                }
            }),
        }
    }

    /// Dispatch on the curve pair. A line always precedes a circle.
    fn intersection(&self, a: ShapeId, b: ShapeId, identifier: bool) -> Point2d {
        let ga = self.shapes.get(a).map(|s| s.geometry);
        let gb = self.shapes.get(b).map(|s| s.geometry);
        let hit = match (ga, gb) {
            (Some(Geometry::Line(l1)), Some(Geometry::Line(l2))) => line_line_intersect(&l1, &l2),
            (Some(Geometry::Line(l)), Some(Geometry::Circle(c))) => {
                line_circle_intersect(&l, &c, identifier, &self.tolerance)
            }
            (Some(Geometry::Circle(c1)), Some(Geometry::Circle(c2))) => {
                circle_circle_intersect(&c1, &c2, identifier, &self.tolerance)
            }
            _ => None,
        };
        if hit.is_none() {
            trace!(?a, ?b, "no intersection");
        }
        hit.unwrap_or(Point2d::UNDEFINED)
    }

    pub(crate) fn line_geometry(&self, id: ShapeId) -> Line2d {
        self.shapes
            .get(id)
            .and_then(|s| s.geometry.as_line())
            .unwrap_or(Line2d::UNDEFINED)
    }

    pub(crate) fn circle_geometry(&self, id: ShapeId) -> Circle2d {
        self.shapes
            .get(id)
            .and_then(|s| s.geometry.as_circle())
            .unwrap_or(Circle2d::UNDEFINED)
    }
}
