//! Structured text reports of a diagram.
//!
//! The text form is for reading in test failures; `to_json` gives the same
//! content to tools.

use std::fmt;

use construction_engine::Geometry;
use pad_bridge::ShapeView;
use serde::Serialize;

use crate::helpers::HarnessError;
use crate::oracle::OracleVerdict;
use crate::workflow::DiagramBuilder;

/// A complete diagram report with all sections.
#[derive(Debug, Clone, Serialize)]
pub struct DiagramReport {
    pub entries: Vec<ShapeEntry>,
    pub max_level: u32,
    pub applied_commands: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub oracle_results: Vec<OracleVerdict>,
}

/// A single shape's report entry.
#[derive(Debug, Clone, Serialize)]
pub struct ShapeEntry {
    pub name: String,
    pub kind: String,
    pub level: u32,
    pub dependencies: Vec<String>,
    pub hidden: bool,
    pub geometry: String,
}

impl From<&ShapeView> for ShapeEntry {
    fn from(view: &ShapeView) -> Self {
        Self {
            name: view.name.clone(),
            kind: view.kind.clone(),
            level: view.level,
            dependencies: view.dependencies.clone(),
            hidden: view.hidden,
            geometry: describe_geometry(view.geometry),
        }
    }
}

impl DiagramReport {
    /// Format the report as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Diagram Report ===\n\n");

        let hidden = self.entries.iter().filter(|e| e.hidden).count();
        let undefined = self
            .entries
            .iter()
            .filter(|e| e.geometry == "undefined")
            .count();
        out.push_str(&format!(
            "Shapes ({} shapes, {} hidden, {} undefined, max level {}):\n",
            self.entries.len(),
            hidden,
            undefined,
            self.max_level,
        ));
        for entry in &self.entries {
            let flag = if entry.hidden { " [HIDDEN]" } else { "" };
            out.push_str(&format!(
                "  L{} {} \"{}\"{}\n",
                entry.level, entry.kind, entry.name, flag,
            ));
            if !entry.dependencies.is_empty() {
                out.push_str(&format!("      from: {}\n", entry.dependencies.join(", ")));
            }
            out.push_str(&format!("      {}\n", entry.geometry));
        }

        out.push_str(&format!(
            "\nHistory: {} applied (undo: {}, redo: {})\n",
            self.applied_commands,
            yes_no(self.can_undo),
            yes_no(self.can_redo),
        ));

        if !self.oracle_results.is_empty() {
            out.push_str(&format!(
                "\nOracle Results ({} checks):\n",
                self.oracle_results.len()
            ));
            for v in &self.oracle_results {
                let status = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
            }
        }

        out
    }

    pub fn to_json(&self) -> Result<String, HarnessError> {
        serde_json::to_string_pretty(self).map_err(|e| HarnessError::AssertionFailed {
            detail: format!("report serialization: {e}"),
        })
    }

    pub fn all_passed(&self) -> bool {
        self.oracle_results.iter().all(|v| v.passed)
    }
}

impl fmt::Display for DiagramReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl DiagramBuilder {
    /// Generate a complete diagram report, running the structural oracles.
    pub fn report(&self) -> DiagramReport {
        let engine = &self.session.engine;
        DiagramReport {
            entries: self.shapes().iter().map(ShapeEntry::from).collect(),
            max_level: engine.diagram.max_level(),
            applied_commands: engine.log.cursor(),
            can_undo: engine.log.can_undo(),
            can_redo: engine.log.can_redo(),
            oracle_results: self.check_structure(),
        }
    }
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

fn describe_geometry(geometry: Option<Geometry>) -> String {
    match geometry {
        None => "undefined".to_string(),
        Some(Geometry::Point(p)) => format!("point ({:.3}, {:.3})", p.x, p.y),
        Some(Geometry::Line(l)) => format!(
            "{} ({:.3}, {:.3}) -> ({:.3}, {:.3})",
            if l.bounded { "segment" } else { "line" },
            l.start.x,
            l.start.y,
            l.end.x,
            l.end.y,
        ),
        Some(Geometry::Circle(c)) => format!(
            "circle center ({:.3}, {:.3}) r={:.3}",
            c.center.x, c.center.y, c.radius,
        ),
    }
}
