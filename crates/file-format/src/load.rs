use construction_engine::{Command, Engine};
use tracing::{info, warn};

use crate::errors::{LoadError, ParseError};
use crate::grammar::parse_command;

/// Why a project line was not applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Parse(ParseError),
    Rejected(construction_engine::EngineError),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Parse(e) => write!(f, "{e}"),
            SkipReason::Rejected(e) => write!(f, "rejected: {e}"),
        }
    }
}

/// A project line that was ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based.
    pub line_number: usize,
    pub text: String,
    pub reason: SkipReason,
}

/// Outcome of a lenient load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub applied: usize,
    pub skipped: Vec<SkippedLine>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Replace the engine's contents with the project in `text`.
///
/// Malformed lines and commands the diagram rejects are skipped and
/// reported; the load itself never fails. Applied commands become the new
/// history.
pub fn load_project(engine: &mut Engine, text: &str) -> LoadReport {
    engine.reset();
    let mut report = LoadReport::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let reason = match parse_command(line) {
            Ok(cmd) => match apply(engine, cmd) {
                Ok(()) => {
                    report.applied += 1;
                    continue;
                }
                Err(e) => SkipReason::Rejected(e),
            },
            Err(e) => SkipReason::Parse(e),
        };
        warn!(line = idx + 1, %reason, "skipping project line");
        report.skipped.push(SkippedLine {
            line_number: idx + 1,
            text: line.to_string(),
            reason,
        });
    }

    engine.update();
    info!(
        applied = report.applied,
        skipped = report.skipped.len(),
        "project loaded"
    );
    report
}

/// Like [`load_project`], but the first bad line aborts the load. On
/// error the engine is left empty.
pub fn load_project_strict(engine: &mut Engine, text: &str) -> Result<LoadReport, LoadError> {
    let report = load_project(engine, text);
    match report.skipped.first() {
        None => Ok(report),
        Some(first) => {
            let line = first.line_number;
            let err = match &first.reason {
                SkipReason::Parse(source) => LoadError::Parse {
                    line,
                    source: source.clone(),
                },
                SkipReason::Rejected(source) => LoadError::Rejected {
                    line,
                    source: source.clone(),
                },
            };
            engine.reset();
            Err(err)
        }
    }
}

fn apply(engine: &mut Engine, cmd: Command) -> Result<(), construction_engine::EngineError> {
    cmd.apply(&mut engine.diagram)?;
    engine.record(cmd);
    Ok(())
}
