use construction_engine::EngineError;
use tracing::{debug, warn};

use crate::messages::{Request, Response, SkippedLineView};
use crate::session::{BridgeError, Session};

/// Dispatch a request to the session and return a response.
///
/// Failures come back as [`Response::Error`] and are not recorded in the
/// history.
pub fn dispatch(session: &mut Session, request: Request) -> Response {
    match handle_request(session, request) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "request failed");
            Response::Error {
                message: e.to_string(),
            }
        }
    }
}

/// [`dispatch`] over JSON text. Malformed requests produce an error
/// response rather than a failure.
pub fn dispatch_json(session: &mut Session, request: &str) -> String {
    let response = match serde_json::from_str::<Request>(request) {
        Ok(req) => dispatch(session, req),
        Err(e) => Response::Error {
            message: BridgeError::Serialization {
                reason: e.to_string(),
            }
            .to_string(),
        },
    };
    serde_json::to_string(&response).unwrap_or_else(|e| {
        serde_json::json!({ "type": "Error", "message": format!("serialization error: {e}") })
            .to_string()
    })
}

fn handle_request(session: &mut Session, request: Request) -> Result<Response, BridgeError> {
    debug!(?request, "dispatch");
    match request {
        Request::AddShape { shape } => {
            let id = session.add_shape(shape)?;
            let shape = session.shape_view(id).ok_or(EngineError::UnknownShape)?;
            Ok(Response::ShapeAdded { shape })
        }

        Request::FindShape { name } => {
            let shape = session
                .find_by_name(&name)
                .and_then(|id| session.shape_view(id));
            Ok(Response::ShapeFound { shape })
        }

        Request::Update => {
            session.update();
            Ok(diagram_updated(session))
        }

        Request::Command { command } => {
            session.add_command(command)?;
            Ok(diagram_updated(session))
        }

        Request::CommandText { line } => {
            session.add_command_text(&line)?;
            Ok(diagram_updated(session))
        }

        Request::Undo => {
            session.undo()?;
            Ok(diagram_updated(session))
        }

        Request::Redo => {
            session.redo()?;
            Ok(diagram_updated(session))
        }

        Request::LoadProject { text } => {
            let report = session.load(&text);
            Ok(Response::ProjectLoaded {
                applied: report.applied,
                skipped: SkippedLineView::from_report(&report),
                shapes: session.shapes(),
            })
        }

        Request::SaveProject => Ok(Response::SaveReady {
            text: session.to_project_text(),
        }),

        Request::ExportAsymptote { width, height } => {
            let width = width.unwrap_or(session.canvas_width);
            let height = height.unwrap_or(session.canvas_height);
            Ok(Response::ExportReady {
                asymptote: session.to_export_text(width, height)?,
            })
        }

        Request::SetCanvas { width, height } => {
            session.canvas_width = width;
            session.canvas_height = height;
            Ok(Response::CanvasResized { width, height })
        }
    }
}

/// Build a DiagramUpdated response from the current session state.
fn diagram_updated(session: &Session) -> Response {
    Response::DiagramUpdated {
        shapes: session.shapes(),
        render: session.engine.diagram.render,
        can_undo: session.engine.log.can_undo(),
        can_redo: session.engine.log.can_redo(),
    }
}
