use construction_engine::{Command, DrawSpec, Engine, EngineError, ShapeId};
use file_format::{
    export_asymptote, load_project, parse_command, save_project, ExportError, ExportOptions,
    LoadReport, ParseError,
};
use tracing::{debug, instrument};

use crate::messages::ShapeView;

/// One open document: the engine plus the canvas it is drawn on.
#[derive(Debug, Clone)]
pub struct Session {
    pub engine: Engine,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Session {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            engine: Engine::new(),
            canvas_width,
            canvas_height,
        }
    }

    /// Draw a shape, update the diagram and record the draw.
    #[instrument(skip(self))]
    pub fn add_shape(&mut self, shape: DrawSpec) -> Result<ShapeId, BridgeError> {
        self.engine.execute(Command::Draw { shape })?;
        // A successful draw is the newest shape, and update never sweeps it.
        let id = self
            .engine
            .diagram
            .ids()
            .last()
            .copied()
            .ok_or(EngineError::UnknownShape)?;
        Ok(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ShapeId> {
        self.engine.find_by_name(name)
    }

    pub fn update(&mut self) {
        self.engine.update();
    }

    pub fn add_command(&mut self, command: Command) -> Result<(), BridgeError> {
        self.engine.execute(command)?;
        Ok(())
    }

    /// Parse one line of project text and apply it like [`Self::add_command`].
    #[instrument(skip(self))]
    pub fn add_command_text(&mut self, line: &str) -> Result<(), BridgeError> {
        let command = parse_command(line)?;
        debug!(?command, "parsed command text");
        self.engine.execute(command)?;
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), BridgeError> {
        self.engine.undo()?;
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), BridgeError> {
        self.engine.redo()?;
        Ok(())
    }

    /// Replace the document with `text`. Bad lines are skipped and listed
    /// in the report.
    pub fn load(&mut self, text: &str) -> LoadReport {
        load_project(&mut self.engine, text)
    }

    pub fn to_project_text(&self) -> String {
        save_project(&self.engine)
    }

    /// Export at `width` x `height`, which also becomes the session canvas.
    pub fn to_export_text(&mut self, width: f64, height: f64) -> Result<String, BridgeError> {
        let options = ExportOptions::new(width, height);
        let text = export_asymptote(&mut self.engine.diagram, &options)?;
        self.canvas_width = width;
        self.canvas_height = height;
        debug!(bytes = text.len(), "export ready");
        Ok(text)
    }

    /// Every live shape, in insertion order.
    pub fn shapes(&self) -> Vec<ShapeView> {
        self.engine
            .diagram
            .snapshot()
            .into_iter()
            .map(ShapeView::from)
            .collect()
    }

    pub fn shape_view(&self, id: ShapeId) -> Option<ShapeView> {
        let name = self.engine.diagram.name_of(id)?;
        self.shapes().into_iter().find(|s| s.name == name)
    }
}

impl Default for Session {
    fn default() -> Self {
        let options = ExportOptions::default();
        Self::new(options.canvas_width, options.canvas_height)
    }
}

/// Errors from the bridge layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),

    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}
