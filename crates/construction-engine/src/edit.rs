use geo_kernel::{Point2d, Vec2};
use pad_types::{Color, ShapeCategory};
use tracing::{debug, instrument};

use crate::graph::Diagram;
use crate::names::is_valid_point_name;
use crate::types::{EngineError, Geometry, PointKind, ShapeId, ShapeKind};

impl Diagram {
    /// Rename a point and re-derive the names of everything built on it.
    /// Rejected names leave the point untouched.
    #[instrument(skip(self))]
    pub fn rename(&mut self, id: ShapeId, new_name: &str) -> Result<(), EngineError> {
        let shape = self.shape(id)?;
        if shape.category() != ShapeCategory::Point {
            return Err(EngineError::NotAPoint {
                name: shape.name.clone(),
            });
        }
        if shape.name == new_name {
            return Ok(());
        }
        if !is_valid_point_name(new_name) {
            return Err(EngineError::InvalidName {
                name: new_name.to_string(),
            });
        }
        if !self.is_name_available(new_name) {
            return Err(EngineError::DuplicateName {
                name: new_name.to_string(),
            });
        }
        self.get_mut(id)?.name = new_name.to_string();
        self.refresh_names(id);
        Ok(())
    }

    /// Set a point's name without validation and re-derive downstream
    /// names. Used for temporary symbol substitution during export.
    pub fn relabel(&mut self, id: ShapeId, name: &str) -> Result<(), EngineError> {
        let shape = self.get_mut(id)?;
        if shape.name == name {
            return Ok(());
        }
        shape.name = name.to_string();
        self.refresh_names(id);
        Ok(())
    }

    pub fn set_color(&mut self, id: ShapeId, color: Color) -> Result<(), EngineError> {
        self.get_mut(id)?.color = color;
        Ok(())
    }

    pub fn set_hidden(&mut self, id: ShapeId, hidden: bool) -> Result<(), EngineError> {
        self.get_mut(id)?.hidden = hidden;
        Ok(())
    }

    pub fn show_all(&mut self) {
        for shape in self.shapes.values_mut() {
            shape.hidden = false;
        }
    }

    /// Set the label direction of a point, in radians.
    pub fn set_label_direction(&mut self, id: ShapeId, direction: f64) -> Result<(), EngineError> {
        let shape = self.get_mut(id)?;
        if shape.category() != ShapeCategory::Point {
            return Err(EngineError::NotAPoint {
                name: shape.name.clone(),
            });
        }
        shape.label_direction = direction;
        Ok(())
    }

    /// Drag a point toward `target`.
    ///
    /// A free point jumps there. A point on a line takes the parameter of the
    /// foot of the perpendicular, clamped to `[0, 1]`; a point on a circle
    /// takes the polar angle of `target`. Derived points cannot be moved,
    /// and neither can a point whose host is undefined.
    #[instrument(skip(self))]
    pub fn move_point(&mut self, id: ShapeId, target: Point2d) -> Result<(), EngineError> {
        let shape = self.shape(id)?;
        let kind = shape.kind;
        let host = shape.dependencies.first().copied();
        match (kind, host) {
            (ShapeKind::Point(PointKind::Free), _) => {
                self.get_mut(id)?.geometry = Geometry::Point(target);
            }
            (ShapeKind::Point(PointKind::OnShape { .. }), Some(host)) => {
                let relative_location = match self.shape(host)?.geometry {
                    Geometry::Line(l) if l.is_defined() => l.parameter_of(&target).clamp(0.0, 1.0),
                    Geometry::Circle(c) if c.is_defined() => c.angle_of(&target),
                    _ => {
                        return Err(EngineError::Undefined {
                            name: self.shape(host)?.name.clone(),
                        })
                    }
                };
                self.get_mut(id)?.kind =
                    ShapeKind::Point(PointKind::OnShape { relative_location });
            }
            _ => {
                return Err(EngineError::NotMovable {
                    name: self.shape(id)?.name.clone(),
                })
            }
        }
        self.refresh(id);
        Ok(())
    }

    /// Shift every free root point.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let delta = Vec2::new(dx, dy);
        self.map_roots(|p| p + delta);
        debug!(dx, dy, "translated roots");
    }

    /// Scale every free root point about `focus`.
    pub fn zoom(&mut self, focus: Point2d, factor: f64) {
        self.map_roots(|p| p.scaled_about(&focus, factor));
        debug!(?focus, factor, "zoomed roots");
    }

    fn map_roots(&mut self, f: impl Fn(Point2d) -> Point2d) {
        for shape in self.shapes.values_mut() {
            if shape.level != 0 {
                continue;
            }
            if let Geometry::Point(p) = shape.geometry {
                shape.geometry = Geometry::Point(f(p));
            }
        }
        self.refresh_all();
    }
}
