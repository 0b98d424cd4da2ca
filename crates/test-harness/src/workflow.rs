//! DiagramBuilder: fluent API for scripting constructions in tests.
//!
//! Wraps `pad_bridge::dispatch()` to test the real dispatch path, not a
//! simulation. Every method takes shape names, and construction methods
//! return the name the new shape ended up with.

use construction_engine::{
    CircleKind, Command, DrawSpec, LineKind, PointKind, ShapeKind, TriangleCenter,
};
use geo_kernel::{Circle2d, Line2d, Point2d};
use pad_bridge::{dispatch, dispatch_json, Request, Response, Session, ShapeView};
use pad_types::{Color, GlobalVariable};

use crate::helpers::*;
use crate::oracle::{self, OracleVerdict};

/// A fluent builder for constructing and verifying diagrams in tests.
pub struct DiagramBuilder {
    pub session: Session,
    history: Vec<(String, String)>,
    auto_check: bool,
    via_json: bool,
}

impl DiagramBuilder {
    /// A builder on the default canvas.
    pub fn new() -> Self {
        Self::with_session(Session::default())
    }

    pub fn with_canvas(width: f64, height: f64) -> Self {
        Self::with_session(Session::new(width, height))
    }

    fn with_session(session: Session) -> Self {
        Self {
            session,
            history: Vec::new(),
            auto_check: false,
            via_json: false,
        }
    }

    /// After every operation, run the structural oracles and fail on any
    /// violation.
    pub fn with_auto_check(mut self) -> Self {
        self.auto_check = true;
        self
    }

    /// Send every request through its JSON encoding.
    pub fn via_json(mut self) -> Self {
        self.via_json = true;
        self
    }

    // ── Points ──────────────────────────────────────────────────────────

    pub fn point(&mut self, name: &str, x: f64, y: f64) -> Result<String, HarnessError> {
        self.draw(free_point(name, x, y))
    }

    pub fn midpoint(&mut self, name: &str, a: &str, b: &str) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Point(PointKind::Midpoint),
            &[a, b],
            Some(name),
        ))
    }

    /// The point `a + ratio * (b - a)`.
    pub fn relative(
        &mut self,
        name: &str,
        a: &str,
        b: &str,
        ratio: f64,
    ) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Point(PointKind::Relative { ratio }),
            &[a, b],
            Some(name),
        ))
    }

    pub fn intersection(
        &mut self,
        name: &str,
        first: &str,
        second: &str,
        identifier: bool,
    ) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Point(PointKind::Intersection { identifier }),
            &[first, second],
            Some(name),
        ))
    }

    /// A point riding on `host` at `location`: a line parameter or a polar
    /// angle.
    pub fn point_on(
        &mut self,
        name: &str,
        host: &str,
        location: f64,
    ) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Point(PointKind::OnShape {
                relative_location: location,
            }),
            &[host],
            Some(name),
        ))
    }

    pub fn triangle_center(
        &mut self,
        name: &str,
        center: TriangleCenter,
        vertices: [&str; 3],
    ) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Point(PointKind::TriangleCenter { center }),
            &vertices,
            Some(name),
        ))
    }

    // ── Lines ───────────────────────────────────────────────────────────

    pub fn segment(&mut self, a: &str, b: &str) -> Result<String, HarnessError> {
        self.draw(construction(ShapeKind::Line(LineKind::Segment), &[a, b], None))
    }

    pub fn line(&mut self, a: &str, b: &str) -> Result<String, HarnessError> {
        self.draw(construction(ShapeKind::Line(LineKind::Through), &[a, b], None))
    }

    pub fn parallel(&mut self, through: &str, to: &str) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Line(LineKind::Parallel),
            &[through, to],
            None,
        ))
    }

    pub fn perpendicular(&mut self, through: &str, to: &str) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Line(LineKind::Perpendicular),
            &[through, to],
            None,
        ))
    }

    /// Bisector of angle `a`-`vertex`-`c`.
    pub fn angle_bisector(&mut self, a: &str, vertex: &str, c: &str) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Line(LineKind::AngleBisector),
            &[a, vertex, c],
            None,
        ))
    }

    pub fn perp_bisector(&mut self, a: &str, b: &str) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Line(LineKind::PerpBisector),
            &[a, b],
            None,
        ))
    }

    pub fn tangent_line(
        &mut self,
        from: &str,
        circle: &str,
        identifier: bool,
    ) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Line(LineKind::Tangent { identifier }),
            &[from, circle],
            None,
        ))
    }

    // ── Circles ─────────────────────────────────────────────────────────

    pub fn circle(&mut self, center: &str, on: &str) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Circle(CircleKind::ByRadiusPoint),
            &[center, on],
            None,
        ))
    }

    pub fn circumcircle(&mut self, a: &str, b: &str, c: &str) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Circle(CircleKind::Circumcircle),
            &[a, b, c],
            None,
        ))
    }

    pub fn incircle(&mut self, a: &str, b: &str, c: &str) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Circle(CircleKind::Incircle),
            &[a, b, c],
            None,
        ))
    }

    /// Circle tangent to `home` at `at`, and to `other`.
    pub fn tangent_circle(
        &mut self,
        home: &str,
        other: &str,
        at: &str,
        identifier: bool,
    ) -> Result<String, HarnessError> {
        self.draw(construction(
            ShapeKind::Circle(CircleKind::Tangent { identifier }),
            &[home, other, at],
            None,
        ))
    }

    // ── Edits ───────────────────────────────────────────────────────────

    pub fn move_point(&mut self, name: &str, x: f64, y: f64) -> Result<&mut Self, HarnessError> {
        self.command(Command::Move {
            target: name.to_string(),
            x,
            y,
        })
    }

    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<&mut Self, HarnessError> {
        self.command(Command::Rename {
            target: name.to_string(),
            new_name: new_name.to_string(),
        })
    }

    pub fn delete(&mut self, name: &str) -> Result<&mut Self, HarnessError> {
        self.command(Command::Delete {
            target: name.to_string(),
        })
    }

    pub fn hide(&mut self, name: &str) -> Result<&mut Self, HarnessError> {
        self.command(Command::Hide {
            target: name.to_string(),
        })
    }

    pub fn recolor(&mut self, name: &str, color: Color) -> Result<&mut Self, HarnessError> {
        self.command(Command::Recolor {
            target: name.to_string(),
            color,
        })
    }

    pub fn translate(&mut self, dx: f64, dy: f64) -> Result<&mut Self, HarnessError> {
        self.command(Command::Translate { dx, dy })
    }

    pub fn zoom(&mut self, x: f64, y: f64, factor: f64) -> Result<&mut Self, HarnessError> {
        self.command(Command::Zoom { x, y, factor })
    }

    pub fn set_global(
        &mut self,
        variable: GlobalVariable,
        value: f64,
    ) -> Result<&mut Self, HarnessError> {
        self.command(Command::SetGlobal { variable, value })
    }

    pub fn command(&mut self, command: Command) -> Result<&mut Self, HarnessError> {
        let label = format!("Command({command:?})");
        let response = self.send(Request::Command { command });
        self.expect_updated(&label, response)?;
        Ok(self)
    }

    // ── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> Result<&mut Self, HarnessError> {
        let response = self.send(Request::Undo);
        self.expect_updated("Undo", response)?;
        Ok(self)
    }

    pub fn redo(&mut self) -> Result<&mut Self, HarnessError> {
        let response = self.send(Request::Redo);
        self.expect_updated("Redo", response)?;
        Ok(self)
    }

    /// Log of (request, outcome) pairs sent so far.
    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    // ── File I/O ────────────────────────────────────────────────────────

    /// Save the project and return its text.
    pub fn save(&mut self) -> Result<String, HarnessError> {
        match self.send(Request::SaveProject) {
            Response::SaveReady { text } => Ok(text),
            other => Err(self.unexpected("SaveProject", other)),
        }
    }

    /// Load a project, replacing the current diagram. Returns the number of
    /// skipped lines.
    pub fn load(&mut self, text: &str) -> Result<usize, HarnessError> {
        match self.send(Request::LoadProject {
            text: text.to_string(),
        }) {
            Response::ProjectLoaded { skipped, .. } => {
                self.history
                    .push(("LoadProject".into(), format!("{} skipped", skipped.len())));
                self.after_step()?;
                Ok(skipped.len())
            }
            other => Err(self.unexpected("LoadProject", other)),
        }
    }

    /// Asymptote export at the session canvas.
    pub fn export(&mut self) -> Result<String, HarnessError> {
        match self.send(Request::ExportAsymptote {
            width: None,
            height: None,
        }) {
            Response::ExportReady { asymptote } => Ok(asymptote),
            other => Err(self.unexpected("ExportAsymptote", other)),
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn shape(&self, name: &str) -> Result<ShapeView, HarnessError> {
        self.session
            .find_by_name(name)
            .and_then(|id| self.session.shape_view(id))
            .ok_or_else(|| HarnessError::ShapeNotFound {
                name: name.to_string(),
            })
    }

    pub fn point_at(&self, name: &str) -> Result<Point2d, HarnessError> {
        point_of(&self.shape(name)?)
    }

    pub fn line_at(&self, name: &str) -> Result<Line2d, HarnessError> {
        line_of(&self.shape(name)?)
    }

    pub fn circle_at(&self, name: &str) -> Result<Circle2d, HarnessError> {
        circle_of(&self.shape(name)?)
    }

    pub fn shape_count(&self) -> usize {
        self.session.engine.diagram.len()
    }

    pub fn shapes(&self) -> Vec<ShapeView> {
        self.session.shapes()
    }

    /// Run the structural oracles against the current diagram.
    pub fn check_structure(&self) -> Vec<OracleVerdict> {
        oracle::check_structure(&self.session.engine.diagram)
    }

    // ── Internal ────────────────────────────────────────────────────────

    fn send(&mut self, request: Request) -> Response {
        if !self.via_json {
            return dispatch(&mut self.session, request);
        }
        let encoded = match serde_json::to_string(&request) {
            Ok(text) => text,
            Err(e) => {
                return Response::Error {
                    message: e.to_string(),
                }
            }
        };
        let reply = dispatch_json(&mut self.session, &encoded);
        serde_json::from_str(&reply).unwrap_or_else(|e| Response::Error {
            message: format!("undecodable response: {e}"),
        })
    }

    fn draw(&mut self, shape: DrawSpec) -> Result<String, HarnessError> {
        let label = format!("AddShape({})", shape.kind.tag());
        match self.send(Request::AddShape { shape }) {
            Response::ShapeAdded { shape } => {
                self.history.push((label, shape.name.clone()));
                self.after_step()?;
                Ok(shape.name)
            }
            other => Err(self.unexpected(&label, other)),
        }
    }

    fn expect_updated(&mut self, label: &str, response: Response) -> Result<(), HarnessError> {
        match response {
            Response::DiagramUpdated { .. } => {
                self.history.push((label.to_string(), "DiagramUpdated".into()));
                self.after_step()
            }
            other => Err(self.unexpected(label, other)),
        }
    }

    fn unexpected(&mut self, label: &str, response: Response) -> HarnessError {
        let message = match response {
            Response::Error { message } => message,
            other => format!("{label}: unexpected response {other:?}"),
        };
        self.history.push((label.to_string(), format!("Error: {message}")));
        HarnessError::DispatchError { message }
    }

    fn after_step(&self) -> Result<(), HarnessError> {
        if !self.auto_check {
            return Ok(());
        }
        match self.check_structure().into_iter().find(|v| !v.passed) {
            Some(v) => Err(HarnessError::OracleFailure {
                oracle: v.oracle_name,
                detail: v.detail,
            }),
            None => Ok(()),
        }
    }
}

impl Default for DiagramBuilder {
    fn default() -> Self {
        Self::new()
    }
}
