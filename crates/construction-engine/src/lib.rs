pub mod edit;
pub mod graph;
pub mod history;
pub mod names;
pub mod refresh;
pub mod types;

use tracing::{info, warn};

pub use crate::graph::Diagram;
pub use crate::history::{Command, CommandLog, DrawSpec};
pub use crate::names::{derived_name, is_valid_point_name};
pub use crate::types::*;

/// The construction engine.
///
/// Owns the diagram and the command history. Undo and redo rebuild the
/// diagram from scratch by replaying the history up to the cursor, which
/// costs O(history length) per step.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub diagram: Diagram,
    pub log: CommandLog,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `cmd`, re-synchronize the diagram and record it. A command
    /// that fails to apply is not recorded.
    pub fn execute(&mut self, cmd: Command) -> Result<(), EngineError> {
        let result = cmd.apply(&mut self.diagram);
        self.diagram.update();
        result?;
        self.log.append(cmd);
        Ok(())
    }

    /// Record a command whose effect the caller has already applied.
    pub fn record(&mut self, cmd: Command) {
        self.log.append(cmd);
    }

    /// Add a shape and record the matching draw command.
    pub fn add_shape(&mut self, spec: ShapeSpec) -> Result<ShapeId, EngineError> {
        let id = self.diagram.add_shape(spec)?;
        let draw = DrawSpec::capture(&self.diagram, id)?;
        self.log.append(Command::Draw { shape: draw });
        Ok(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ShapeId> {
        self.diagram.find_by_name(name)
    }

    pub fn update(&mut self) {
        self.diagram.update();
    }

    pub fn undo(&mut self) -> Result<(), EngineError> {
        self.log.step_back()?;
        self.replay();
        info!(cursor = self.log.cursor(), "undo");
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EngineError> {
        self.log.step_forward()?;
        self.replay();
        info!(cursor = self.log.cursor(), "redo");
        Ok(())
    }

    /// Empty diagram, empty history, default render settings.
    pub fn reset(&mut self) {
        self.diagram.clear();
        self.log.clear();
    }

    fn replay(&mut self) {
        self.diagram.clear();
        for cmd in self.log.applied() {
            if let Err(e) = cmd.apply(&mut self.diagram) {
                warn!(error = %e, ?cmd, "command failed during replay");
            }
        }
        self.diagram.update();
    }
}
