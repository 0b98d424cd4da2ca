use geo_kernel::Point2d;
use pad_types::{Color, GlobalVariable};
use serde::{Deserialize, Serialize};

use crate::graph::Diagram;
use crate::types::{EngineError, PointKind, ShapeId, ShapeKind, ShapeSpec};

/// Everything needed to rebuild one shape, with dependencies by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawSpec {
    pub kind: ShapeKind,
    pub dependencies: Vec<String>,
    /// Point name. Lines and circles derive theirs.
    pub name: Option<String>,
    /// Free-point coordinates.
    pub position: Option<Point2d>,
}

impl DrawSpec {
    /// Capture shape `id` as it currently stands.
    pub fn capture(diagram: &Diagram, id: ShapeId) -> Result<Self, EngineError> {
        let shape = diagram.get(id).ok_or(EngineError::UnknownShape)?;
        let dependencies = shape
            .dependencies
            .iter()
            .map(|&d| {
                diagram
                    .name_of(d)
                    .map(str::to_string)
                    .ok_or(EngineError::UnknownShape)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let is_point = matches!(shape.kind, ShapeKind::Point(_));
        let position = match shape.kind {
            ShapeKind::Point(PointKind::Free) => shape.geometry.as_point(),
            _ => None,
        };
        Ok(Self {
            kind: shape.kind,
            dependencies,
            name: is_point.then(|| shape.name.clone()),
            position,
        })
    }

    fn to_shape_spec(&self, diagram: &Diagram) -> Result<ShapeSpec, EngineError> {
        let dependencies = self
            .dependencies
            .iter()
            .map(|n| diagram.resolve(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ShapeSpec {
            kind: self.kind,
            dependencies,
            name: self.name.clone(),
            position: self.position,
        })
    }
}

/// One replayable user action. Targets are referenced by name, so a
/// command means the same thing whenever it is replayed in sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    Draw { shape: DrawSpec },
    Delete { target: String },
    Hide { target: String },
    ShowAll,
    Move { target: String, x: f64, y: f64 },
    Rename { target: String, new_name: String },
    Recolor { target: String, color: Color },
    DragLabel { target: String, direction: f64 },
    Translate { dx: f64, dy: f64 },
    Zoom { x: f64, y: f64, factor: f64 },
    SetGlobal { variable: GlobalVariable, value: f64 },
}

impl Command {
    /// Apply to `diagram`. Callers run [`Diagram::update`] afterwards.
    pub fn apply(&self, diagram: &mut Diagram) -> Result<(), EngineError> {
        match self {
            Command::Draw { shape } => {
                let spec = shape.to_shape_spec(diagram)?;
                diagram.add_shape(spec)?;
            }
            Command::Delete { target } => {
                let id = diagram.resolve(target)?;
                diagram.delete(id)?;
            }
            Command::Hide { target } => {
                let id = diagram.resolve(target)?;
                diagram.set_hidden(id, true)?;
            }
            Command::ShowAll => diagram.show_all(),
            Command::Move { target, x, y } => {
                let id = diagram.resolve(target)?;
                diagram.move_point(id, Point2d::new(*x, *y))?;
            }
            Command::Rename { target, new_name } => {
                let id = diagram.resolve(target)?;
                diagram.rename(id, new_name)?;
            }
            Command::Recolor { target, color } => {
                let id = diagram.resolve(target)?;
                diagram.set_color(id, *color)?;
            }
            Command::DragLabel { target, direction } => {
                let id = diagram.resolve(target)?;
                diagram.set_label_direction(id, *direction)?;
            }
            Command::Translate { dx, dy } => diagram.translate(*dx, *dy),
            Command::Zoom { x, y, factor } => diagram.zoom(Point2d::new(*x, *y), *factor),
            Command::SetGlobal { variable, value } => diagram.render.set(*variable, *value),
        }
        Ok(())
    }
}

/// Linear undo history. Commands before `cursor` are in effect; the rest
/// are the redo tail.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    commands: Vec<Command>,
    cursor: usize,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the redo tail and push `cmd`.
    pub fn append(&mut self, cmd: Command) {
        self.commands.truncate(self.cursor);
        self.commands.push(cmd);
        self.cursor += 1;
    }

    pub fn step_back(&mut self) -> Result<(), EngineError> {
        if !self.can_undo() {
            return Err(EngineError::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(())
    }

    pub fn step_forward(&mut self) -> Result<(), EngineError> {
        if !self.can_redo() {
            return Err(EngineError::NothingToRedo);
        }
        self.cursor += 1;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Commands currently in effect.
    pub fn applied(&self) -> &[Command] {
        &self.commands[..self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
    }
}
