use construction_engine::{Command, DrawSpec, Geometry, ShapeSnapshot};
use file_format::LoadReport;
use pad_types::{Color, RenderConfig, ShapeCategory};
use serde::{Deserialize, Serialize};

/// Messages from the front end to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Draw a new shape and record it in the history.
    AddShape { shape: DrawSpec },
    /// Look a shape up by name.
    FindShape { name: String },
    /// Sweep removed shapes and recompute everything.
    Update,
    /// Apply and record an edit.
    Command { command: Command },
    /// Same as `Command`, written as a project-file line such as `move(A, 1, 2)`.
    CommandText { line: String },
    Undo,
    Redo,
    /// Replace the session with a project file.
    LoadProject { text: String },
    SaveProject,
    /// Export, at the session canvas unless a size is given.
    ExportAsymptote {
        #[serde(default)]
        width: Option<f64>,
        #[serde(default)]
        height: Option<f64>,
    },
    /// Change the canvas used by later exports.
    SetCanvas { width: f64, height: f64 },
}

/// Messages from the engine back to the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// The diagram changed; the full shape list follows.
    DiagramUpdated {
        shapes: Vec<ShapeView>,
        render: RenderConfig,
        can_undo: bool,
        can_redo: bool,
    },
    ShapeAdded { shape: ShapeView },
    ShapeFound { shape: Option<ShapeView> },
    ProjectLoaded {
        applied: usize,
        skipped: Vec<SkippedLineView>,
        shapes: Vec<ShapeView>,
    },
    SaveReady { text: String },
    ExportReady { asymptote: String },
    CanvasResized { width: f64, height: f64 },
    Error { message: String },
}

/// A shape as the front end sees it. Undefined geometry is `None`, so the
/// message never carries non-finite numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeView {
    pub name: String,
    pub category: ShapeCategory,
    pub kind: String,
    pub dependencies: Vec<String>,
    pub level: u32,
    pub hidden: bool,
    pub color: Color,
    pub label_direction: f64,
    pub geometry: Option<Geometry>,
}

impl From<ShapeSnapshot> for ShapeView {
    fn from(s: ShapeSnapshot) -> Self {
        Self {
            category: s.kind.category(),
            kind: s.kind.tag().to_string(),
            name: s.name,
            dependencies: s.dependencies,
            level: s.level,
            hidden: s.hidden,
            color: s.color,
            label_direction: s.label_direction,
            geometry: s.geometry.is_defined().then_some(s.geometry),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLineView {
    pub line_number: usize,
    pub text: String,
    pub reason: String,
}

impl SkippedLineView {
    pub fn from_report(report: &LoadReport) -> Vec<Self> {
        report
            .skipped
            .iter()
            .map(|s| Self {
                line_number: s.line_number,
                text: s.text.clone(),
                reason: s.reason.to_string(),
            })
            .collect()
    }
}
