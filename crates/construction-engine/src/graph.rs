use std::collections::HashSet;

use geo_kernel::{Point2d, Tolerance};
use pad_types::{Color, RenderConfig, ShapeCategory};
use slotmap::SlotMap;
use tracing::{debug, instrument};

use crate::names::{derived_name, is_valid_point_name};
use crate::types::{
    EngineError, Geometry, PointKind, Shape, ShapeId, ShapeKind, ShapeSnapshot, ShapeSpec, Slot,
    DEFAULT_LABEL_DIRECTION,
};

/// The live construction graph.
///
/// Shapes sit in an arena keyed by [`ShapeId`]; `order` keeps insertion
/// order, which drives refresh and export ordering.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    pub(crate) shapes: SlotMap<ShapeId, Shape>,
    pub(crate) order: Vec<ShapeId>,
    /// Diagram-wide rendering parameters.
    pub render: RenderConfig,
    pub tolerance: Tolerance,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ShapeId) -> Result<&mut Shape, EngineError> {
        self.shapes.get_mut(id).ok_or(EngineError::UnknownShape)
    }

    pub fn shape(&self, id: ShapeId) -> Result<&Shape, EngineError> {
        self.shapes.get(id).ok_or(EngineError::UnknownShape)
    }

    /// Shape ids in insertion order.
    pub fn ids(&self) -> &[ShapeId] {
        &self.order
    }

    /// Shapes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.shapes.get(id).map(|s| (id, s)))
    }

    /// Linear scan by name. Shapes marked for removal are not found.
    pub fn find_by_name(&self, name: &str) -> Option<ShapeId> {
        self.iter()
            .find(|(_, s)| !s.removed && s.name == name)
            .map(|(id, _)| id)
    }

    pub fn shape_by_name(&self, name: &str) -> Option<&Shape> {
        self.find_by_name(name).and_then(|id| self.shapes.get(id))
    }

    pub fn resolve(&self, name: &str) -> Result<ShapeId, EngineError> {
        self.find_by_name(name).ok_or_else(|| EngineError::UnknownName {
            name: name.to_string(),
        })
    }

    pub fn name_of(&self, id: ShapeId) -> Option<&str> {
        self.shapes.get(id).map(|s| s.name.as_str())
    }

    pub fn is_name_available(&self, name: &str) -> bool {
        self.find_by_name(name).is_none()
    }

    /// Current coordinates of a point, or the sentinel.
    pub fn point(&self, id: ShapeId) -> Point2d {
        self.shapes
            .get(id)
            .and_then(|s| s.geometry.as_point())
            .unwrap_or(Point2d::UNDEFINED)
    }

    /// Build a shape, wire it into its dependencies' child lists and compute
    /// its geometry. A taken point name or a repeated line/circle
    /// construction leaves the diagram untouched.
    #[instrument(skip(self, spec), fields(kind = spec.kind.tag()))]
    pub fn add_shape(&mut self, spec: ShapeSpec) -> Result<ShapeId, EngineError> {
        let ShapeSpec {
            mut kind,
            mut dependencies,
            name,
            position,
        } = spec;
        self.check_dependencies(&kind, &dependencies)?;
        self.normalize_intersection(&mut kind, &mut dependencies);

        let name = match kind.category() {
            ShapeCategory::Point => {
                let name = match name {
                    Some(n) if is_valid_point_name(&n) => n,
                    Some(n) => return Err(EngineError::InvalidName { name: n }),
                    None => self.next_free_name(1),
                };
                if !self.is_name_available(&name) {
                    return Err(EngineError::DuplicateName { name });
                }
                name
            }
            _ => {
                if let Some(twin) = self.find_construction(&kind, &dependencies) {
                    return Err(EngineError::DuplicateName {
                        name: self.shapes[twin].name.clone(),
                    });
                }
                let dep_names: Vec<&str> = dependencies
                    .iter()
                    .filter_map(|&d| self.name_of(d))
                    .collect();
                let base = derived_name(&kind, &dep_names).unwrap_or_default();
                self.unique_name(&base, None)
            }
        };

        let geometry = match kind {
            ShapeKind::Point(PointKind::Free) => {
                Geometry::Point(position.ok_or(EngineError::MissingPosition)?)
            }
            _ => Geometry::undefined(kind.category()),
        };
        let level = dependencies
            .iter()
            .filter_map(|&d| self.shapes.get(d))
            .map(|d| d.level + 1)
            .max()
            .unwrap_or(0);

        let id = self.shapes.insert(Shape {
            name,
            kind,
            dependencies: dependencies.clone(),
            children: Vec::new(),
            level,
            hidden: false,
            removed: false,
            in_export: true,
            color: Color::BLACK,
            label_direction: DEFAULT_LABEL_DIRECTION,
            geometry,
        });
        self.order.push(id);
        for dep in dependencies {
            if let Some(parent) = self.shapes.get_mut(dep) {
                if !parent.children.contains(&id) {
                    parent.children.push(id);
                }
            }
        }
        self.recompute(id);
        debug!(?id, level, "shape added");
        Ok(id)
    }

    /// A live shape built by the same rule from the same dependencies.
    fn find_construction(&self, kind: &ShapeKind, deps: &[ShapeId]) -> Option<ShapeId> {
        self.iter()
            .find(|(_, s)| !s.removed && s.kind == *kind && s.dependencies == deps)
            .map(|(id, _)| id)
    }

    fn check_dependencies(&self, kind: &ShapeKind, deps: &[ShapeId]) -> Result<(), EngineError> {
        let slots = kind.slots();
        let mut categories = Vec::with_capacity(deps.len());
        for &d in deps {
            let shape = self.shape(d)?;
            if shape.removed {
                return Err(EngineError::UnknownShape);
            }
            categories.push(shape.category());
        }
        let fits = slots.len() == categories.len()
            && slots.iter().zip(&categories).all(|(s, c)| s.accepts(*c));
        if fits {
            Ok(())
        } else {
            Err(EngineError::WrongDependencies {
                kind: kind.tag(),
                expected: join(slots.iter().map(Slot::to_string)),
                found: join(categories.iter().map(|c| c.tag().to_lowercase())),
            })
        }
    }

    /// Intersections always store a line ahead of a circle.
    fn normalize_intersection(&self, kind: &mut ShapeKind, deps: &mut [ShapeId]) {
        if let ShapeKind::Point(PointKind::Intersection { .. }) = kind {
            let first = self.shapes.get(deps[0]).map(Shape::category);
            let second = self.shapes.get(deps[1]).map(Shape::category);
            if first == Some(ShapeCategory::Circle) && second == Some(ShapeCategory::Line) {
                deps.swap(0, 1);
            }
        }
    }

    /// Drop every shape marked removed, plus anything built on one.
    ///
    /// Marks propagate in a single level-ordered pass, since a dependency
    /// always sits on a lower level than its dependents. Returns how many
    /// shapes were dropped.
    pub fn sweep(&mut self) -> usize {
        for id in self.level_order() {
            let doomed = self.shapes[id]
                .dependencies
                .iter()
                .any(|d| self.shapes.get(*d).map_or(true, |s| s.removed));
            if doomed {
                self.shapes[id].removed = true;
            }
        }

        let before = self.order.len();
        let shapes = &mut self.shapes;
        self.order.retain(|&id| {
            let keep = !shapes[id].removed;
            if !keep {
                shapes.remove(id);
            }
            keep
        });
        let live: HashSet<ShapeId> = self.order.iter().copied().collect();
        for shape in self.shapes.values_mut() {
            shape.children.retain(|c| live.contains(c));
        }
        let dropped = before - self.order.len();
        if dropped > 0 {
            debug!(dropped, "swept removed shapes");
        }
        dropped
    }

    /// Sweep, then refresh everything from the roots down.
    pub fn update(&mut self) {
        self.sweep();
        self.refresh_all();
    }

    /// Remove all shapes and reset rendering parameters.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.order.clear();
        self.render = RenderConfig::default();
    }

    /// Ids sorted by level; insertion order within a level.
    pub(crate) fn level_order(&self) -> Vec<ShapeId> {
        let mut ids = self.order.clone();
        ids.sort_by_key(|id| self.shapes[*id].level);
        ids
    }

    /// Highest level among live shapes.
    pub fn max_level(&self) -> u32 {
        self.iter().map(|(_, s)| s.level).max().unwrap_or(0)
    }

    /// Decide which shapes the vector export may reference: a shape is
    /// exported when its geometry is defined and all its dependencies are.
    pub fn compute_export_set(&mut self) {
        for id in self.level_order() {
            let deps_ok = self.shapes[id]
                .dependencies
                .iter()
                .all(|d| self.shapes.get(*d).is_some_and(|s| s.in_export));
            let shape = &mut self.shapes[id];
            shape.in_export = deps_ok && shape.geometry.is_defined();
        }
    }

    /// Name-resolved copy of every shape, for comparing states.
    pub fn snapshot(&self) -> Vec<ShapeSnapshot> {
        self.iter()
            .map(|(_, s)| ShapeSnapshot {
                name: s.name.clone(),
                kind: s.kind,
                dependencies: s
                    .dependencies
                    .iter()
                    .filter_map(|&d| self.name_of(d).map(str::to_string))
                    .collect(),
                level: s.level,
                hidden: s.hidden,
                color: s.color,
                label_direction: s.label_direction,
                geometry: s.geometry,
            })
            .collect()
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(", ")
}
