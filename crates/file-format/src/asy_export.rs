//! Asymptote export.
//!
//! The document is a preamble, one block per dependency level and a clip
//! to the canvas. Shapes whose geometry is undefined, and everything built
//! on them, are left out. Screen coordinates have y pointing down, so
//! free points are flipped against the canvas height.

use std::fmt::Write;
use std::ops::{Deref, DerefMut};

use construction_engine::{
    CircleKind, Diagram, EngineError, LineKind, PointKind, ShapeId, ShapeKind, TriangleCenter,
};
use pad_types::Color;
use tracing::{debug, instrument};

use crate::errors::ExportError;

/// Screen pixels per Asymptote unit.
pub const DEFAULT_SCALE: f64 = 100.0;

/// Canvas geometry used to place free points and the clip path.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportOptions {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub scale: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            scale: DEFAULT_SCALE,
        }
    }
}

impl ExportOptions {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            canvas_width,
            canvas_height,
            scale: DEFAULT_SCALE,
        }
    }

    fn validate(&self) -> Result<(), ExportError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.canvas_width) || !positive(self.canvas_height) {
            return Err(ExportError::InvalidCanvas {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }
        if !positive(self.scale) {
            return Err(ExportError::InvalidScale(self.scale));
        }
        Ok(())
    }
}

/// Render `diagram` as an Asymptote document.
///
/// Point names containing primes are swapped for valid symbols while the
/// document is generated and restored before returning, whether or not
/// generation succeeds.
#[instrument(skip(diagram))]
pub fn export_asymptote(diagram: &mut Diagram, options: &ExportOptions) -> Result<String, ExportError> {
    options.validate()?;
    diagram.compute_export_set();
    with_symbols(diagram, |symbols| {
        let mut out = String::new();
        write_document(&mut out, symbols, options)?;
        Ok(out)
    })
}

/// Run `f` with prime-free symbols substituted into `diagram`.
pub fn with_symbols<T>(
    diagram: &mut Diagram,
    f: impl FnOnce(&SymbolGuard<'_>) -> Result<T, ExportError>,
) -> Result<T, ExportError> {
    let mut guard = SymbolGuard::new(diagram);
    let primed: Vec<ShapeId> = guard
        .iter()
        .filter(|(_, s)| s.name.contains('\''))
        .map(|(id, _)| id)
        .collect();
    for id in primed {
        guard.substitute(id)?;
    }
    f(&guard)
}

/// Holds temporary symbol names and puts the real names back on drop.
pub struct SymbolGuard<'a> {
    diagram: &'a mut Diagram,
    originals: Vec<(ShapeId, String)>,
    saved: Vec<(ShapeId, String)>,
}

impl<'a> SymbolGuard<'a> {
    pub fn new(diagram: &'a mut Diagram) -> Self {
        let saved = diagram
            .iter()
            .map(|(id, s)| (id, s.name.clone()))
            .collect();
        Self {
            diagram,
            originals: Vec::new(),
            saved,
        }
    }

    /// Replace each prime in the name of point `id` with `p`, extending the
    /// symbol until it is unused.
    pub fn substitute(&mut self, id: ShapeId) -> Result<(), ExportError> {
        let original = self
            .diagram
            .name_of(id)
            .ok_or(EngineError::UnknownShape)?
            .to_string();
        let mut symbol = original.replace('\'', "p");
        while !self.diagram.is_name_available(&symbol) {
            symbol.push('p');
        }
        debug!(%original, %symbol, "substituting export symbol");
        self.originals.push((id, original));
        self.diagram.relabel(id, &symbol)?;
        Ok(())
    }

    /// The name a reader sees, as opposed to the symbol in the code.
    pub fn display_name(&self, id: ShapeId) -> Option<&str> {
        self.originals
            .iter()
            .find(|(orig, _)| *orig == id)
            .map(|(_, name)| name.as_str())
            .or_else(|| self.diagram.name_of(id))
    }
}

impl Deref for SymbolGuard<'_> {
    type Target = Diagram;

    fn deref(&self) -> &Diagram {
        self.diagram
    }
}

impl DerefMut for SymbolGuard<'_> {
    fn deref_mut(&mut self) -> &mut Diagram {
        self.diagram
    }
}

impl Drop for SymbolGuard<'_> {
    fn drop(&mut self) {
        // Derived names too: their suffixes can shift under substitution.
        self.diagram.restore_names(std::mem::take(&mut self.saved));
    }
}

// ─── Document ────────────────────────────────────────────────────────────────

fn write_document(
    out: &mut String,
    diagram: &SymbolGuard<'_>,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let exported: Vec<ShapeId> = diagram
        .iter()
        .filter(|(_, s)| s.in_export)
        .map(|(id, _)| id)
        .collect();

    writeln!(out, "// Generated by asypad {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "import olympiad;")?;
    writeln!(out, "import markers;")?;
    writeln!(out, "import math;")?;
    writeln!(out, "import graph;")?;
    writeln!(out, "// change the unit size to fit your needs")?;
    writeln!(out, "unitsize({}cm);", num(diagram.render.unit_size))?;
    writeln!(out, "defaultpen(linewidth({}));", num(diagram.render.stroke_width))?;

    let mut pens: Vec<Color> = Vec::new();
    for &id in &exported {
        let color = diagram.shape(id)?.color;
        if !pens.contains(&color) {
            pens.push(color);
        }
    }
    writeln!(out, "// colored pens")?;
    for color in &pens {
        writeln!(out, "pen {} = rgb(\"{}\");", pen(*color), color.to_hex())?;
    }

    let mut writer = StatementWriter {
        out: &mut *out,
        symbols: diagram,
        options,
    };
    let max_level = exported
        .iter()
        .filter_map(|&id| diagram.get(id))
        .map(|s| s.level)
        .max()
        .unwrap_or(0);
    for level in 0..=max_level {
        writeln!(writer.out, "// dependency level {level}")?;
        match level {
            0 => writeln!(
                writer.out,
                "/* You can change the coordinates of these level 0 points.\n   \
                 The drawing keeps the same relationships, but parts of it may be clipped. */"
            )?,
            1 => writeln!(
                writer.out,
                "// Do not change anything below, unless you are experienced in Asymptote."
            )?,
            _ => {}
        }
        for &id in &exported {
            if diagram.shape(id)?.level == level {
                writer.statement(id)?;
            }
        }
    }

    let w = num(options.canvas_width / options.scale);
    let h = num(options.canvas_height / options.scale);
    writeln!(out, "// clip the drawing view")?;
    writeln!(out, "clip((0, 0)--(0, {h})--({w}, {h})--({w}, 0)--cycle);")?;
    Ok(())
}

/// Every number in the output: rounded to six decimals, shortest form,
/// no negative zero.
fn num(v: f64) -> String {
    let r = (v * 1e6).round() / 1e6;
    format!("{}", if r == 0.0 { 0.0 } else { r })
}

fn pen(color: Color) -> String {
    format!("c{}", color.to_hex())
}

fn name(diagram: &Diagram, id: ShapeId) -> Result<&str, ExportError> {
    Ok(diagram.name_of(id).ok_or(EngineError::UnknownShape)?)
}

fn dep(diagram: &Diagram, id: ShapeId, index: usize) -> Result<&str, ExportError> {
    let shape = diagram.shape(id)?;
    let d = *shape
        .dependencies
        .get(index)
        .ok_or(EngineError::UnknownShape)?;
    name(diagram, d)
}

/// Whether point `p` currently lies on circle `c`.
fn lies_on(diagram: &Diagram, p: ShapeId, c: ShapeId) -> bool {
    diagram
        .get(p)
        .and_then(|s| s.geometry.as_point())
        .zip(diagram.get(c).and_then(|s| s.geometry.as_circle()))
        .is_some_and(|(pt, c)| diagram.tolerance.equal(pt.distance_to(&c.center), c.radius))
}

struct StatementWriter<'o, 'd, 'g> {
    out: &'o mut String,
    symbols: &'d SymbolGuard<'g>,
    options: &'d ExportOptions,
}

impl<'d> StatementWriter<'_, 'd, '_> {
    fn diagram(&self) -> &'d Diagram {
        self.symbols
    }

    /// Half-length of an unbounded line, in Asymptote units.
    fn extent(&self) -> f64 {
        self.diagram().tolerance.extent / self.options.scale
    }

    fn statement(&mut self, id: ShapeId) -> Result<(), ExportError> {
        match self.diagram().shape(id)?.kind {
            ShapeKind::Point(kind) => self.point(id, kind),
            ShapeKind::Line(kind) => self.line(id, kind),
            ShapeKind::Circle(kind) => self.circle(id, kind),
        }
    }

    fn point(&mut self, id: ShapeId, kind: PointKind) -> Result<(), ExportError> {
        let d = self.diagram();
        let shape = d.shape(id)?;
        let sym = name(d, id)?;
        let value = match kind {
            PointKind::Free => {
                let p = shape.geometry.as_point().ok_or(EngineError::NotAPoint {
                    name: sym.to_string(),
                })?;
                let s = self.options.scale;
                format!(
                    "({}, {})",
                    num(p.x / s),
                    num((self.options.canvas_height - p.y) / s)
                )
            }
            PointKind::OnShape { relative_location } => {
                let host = shape.dependencies[0];
                let host_name = name(d, host)?;
                match d.shape(host)?.kind {
                    ShapeKind::Circle(_) => {
                        let t = (-relative_location / std::f64::consts::TAU).rem_euclid(1.0);
                        format!("relpoint({host_name}, {})", num(t))
                    }
                    _ => format!("relpoint({host_name}, {})", num(relative_location)),
                }
            }
            PointKind::Intersection { identifier } => {
                let (a, b) = (dep(d, id, 0)?, dep(d, id, 1)?);
                let both_lines = shape
                    .dependencies
                    .iter()
                    .all(|&dp| matches!(d.get(dp).map(|s| s.kind), Some(ShapeKind::Line(_))));
                if both_lines {
                    format!("intersectionpoint({a}, {b})")
                } else {
                    let index = if identifier { 0 } else { 1 };
                    format!("intersectionpoints({a}, {b})[{index}]")
                }
            }
            PointKind::Midpoint => format!("({}+{})/2", dep(d, id, 0)?, dep(d, id, 1)?),
            PointKind::Relative { ratio } => {
                let (a, b) = (dep(d, id, 0)?, dep(d, id, 1)?);
                format!("{a}+{}*({b}-{a})", num(ratio))
            }
            PointKind::TriangleCenter { center } => {
                let func = match center {
                    TriangleCenter::Circumcenter => "circumcenter",
                    TriangleCenter::Incenter => "incenter",
                    TriangleCenter::Orthocenter => "orthocenter",
                    TriangleCenter::Centroid => "centroid",
                };
                format!(
                    "{func}({}, {}, {})",
                    dep(d, id, 0)?,
                    dep(d, id, 1)?,
                    dep(d, id, 2)?
                )
            }
        };

        write!(self.out, "pair {sym} = {value};")?;
        if !shape.hidden {
            let label = self.symbols.display_name(id).unwrap_or(sym);
            // Screen angles turn clockwise, Asymptote's counterclockwise.
            let degrees = num((-shape.label_direction).to_degrees().rem_euclid(360.0));
            write!(
                self.out,
                " dot({sym}, {pen}); label(\"${label}$\", {sym}, dir({degrees}));",
                pen = pen(shape.color)
            )?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn line(&mut self, id: ShapeId, kind: LineKind) -> Result<(), ExportError> {
        let d = self.diagram();
        let sym = name(d, id)?;
        let e = num(self.extent());
        let path = match kind {
            LineKind::Segment => format!("{}--{}", dep(d, id, 0)?, dep(d, id, 1)?),
            LineKind::Through => {
                let (a, b) = (dep(d, id, 0)?, dep(d, id, 1)?);
                format!("({a}-{e}*unit({b}-{a}))--({b}+{e}*unit({b}-{a}))")
            }
            LineKind::Parallel => {
                let (p, l) = (dep(d, id, 0)?, dep(d, id, 1)?);
                format!("({p}-{e}*dir({l}))--({p}+{e}*dir({l}))")
            }
            LineKind::Perpendicular => {
                let (p, l) = (dep(d, id, 0)?, dep(d, id, 1)?);
                format!("({p}-{e}*rotate(90)*dir({l}))--({p}+{e}*rotate(90)*dir({l}))")
            }
            LineKind::AngleBisector => {
                let (a, v, c) = (dep(d, id, 0)?, dep(d, id, 1)?, dep(d, id, 2)?);
                let u = format!("unit(bisectorpoint({a}, {v}, {c})-{v})");
                format!("({v}-{e}*{u})--({v}+{e}*{u})")
            }
            LineKind::PerpBisector => {
                let (a, b) = (dep(d, id, 0)?, dep(d, id, 1)?);
                let m = format!("({a}+{b})/2");
                let u = format!("rotate(90)*unit({b}-{a})");
                format!("({m}-{e}*{u})--({m}+{e}*{u})")
            }
            LineKind::Tangent { identifier } => {
                let shape = d.shape(id)?;
                let (p_id, c_id) = (shape.dependencies[0], shape.dependencies[1]);
                let p = name(d, p_id)?;
                let (center, radius) = circle_parts(d, c_id)?;
                let u = if lies_on(d, p_id, c_id) {
                    format!("rotate(90)*unit({p}-{center})")
                } else {
                    let touch = format!("{sym}_touch");
                    let n = if identifier { 1 } else { 2 };
                    writeln!(self.out, "pair {touch} = tangent({p}, {center}, {radius}, {n});")?;
                    format!("unit({touch}-{p})")
                };
                format!("({p}-{e}*{u})--({p}+{e}*{u})")
            }
        };
        self.path(id, &path)
    }

    fn circle(&mut self, id: ShapeId, kind: CircleKind) -> Result<(), ExportError> {
        let d = self.diagram();
        let path = match kind {
            CircleKind::ByRadiusPoint => {
                let (o, r) = (dep(d, id, 0)?, dep(d, id, 1)?);
                format!("Circle({o}, abs({r}-{o}))")
            }
            CircleKind::Circumcircle => format!(
                "circumcircle({}, {}, {})",
                dep(d, id, 0)?,
                dep(d, id, 1)?,
                dep(d, id, 2)?
            ),
            CircleKind::Incircle => format!(
                "incircle({}, {}, {})",
                dep(d, id, 0)?,
                dep(d, id, 1)?,
                dep(d, id, 2)?
            ),
            CircleKind::Tangent { identifier } => {
                let center = self.tangent_center(id, identifier)?;
                format!("Circle({center}, abs({}-{center}))", dep(d, id, 2)?)
            }
        };
        self.path(id, &path)
    }

    fn path(&mut self, id: ShapeId, path: &str) -> Result<(), ExportError> {
        let d = self.diagram();
        let shape = d.shape(id)?;
        let sym = name(d, id)?;
        write!(self.out, "path {sym} = {path};")?;
        if !shape.hidden {
            write!(self.out, " draw({sym}, {});", pen(shape.color))?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Declare the auxiliary points of tangent circle `id` and return the
    /// symbol of its center.
    fn tangent_center(&mut self, id: ShapeId, identifier: bool) -> Result<String, ExportError> {
        let d = self.diagram();
        let shape = d.shape(id)?;
        let sym = name(d, id)?;
        let (c1, c2, p_id) = (
            shape.dependencies[0],
            shape.dependencies[1],
            shape.dependencies[2],
        );
        let p = name(d, p_id)?;
        let (home, other) = if lies_on(d, p_id, c2) { (c2, c1) } else { (c1, c2) };
        let (home_center, _) = circle_parts(d, home)?;
        let (other_center, other_radius) = circle_parts(d, other)?;
        let sign = if identifier { '-' } else { '+' };
        let foot = format!("{sym}_foot");
        let center = format!("{sym}_center");
        writeln!(
            self.out,
            "pair {foot} = {p}{sign}({other_radius})*unit({home_center}-{p});"
        )?;
        writeln!(
            self.out,
            "pair {center} = extension({home_center}, {p}, ({other_center}+{foot})/2, \
             ({other_center}+{foot})/2+rotate(90)*({foot}-{other_center}));"
        )?;
        Ok(center)
    }
}

/// Center and radius expressions for circle `id`. A tangent circle refers
/// to the center its own statement declared.
fn circle_parts(d: &Diagram, id: ShapeId) -> Result<(String, String), ExportError> {
    let shape = d.shape(id)?;
    let args = || -> Result<String, ExportError> {
        Ok(format!("{}, {}, {}", dep(d, id, 0)?, dep(d, id, 1)?, dep(d, id, 2)?))
    };
    Ok(match shape.kind {
        ShapeKind::Circle(CircleKind::ByRadiusPoint) => {
            let (o, r) = (dep(d, id, 0)?, dep(d, id, 1)?);
            (o.to_string(), format!("abs({r}-{o})"))
        }
        ShapeKind::Circle(CircleKind::Circumcircle) => {
            let args = args()?;
            (format!("circumcenter({args})"), format!("circumradius({args})"))
        }
        ShapeKind::Circle(CircleKind::Incircle) => {
            let args = args()?;
            (format!("incenter({args})"), format!("inradius({args})"))
        }
        ShapeKind::Circle(CircleKind::Tangent { .. }) => {
            let center = format!("{}_center", name(d, id)?);
            let radius = format!("abs({}-{center})", dep(d, id, 2)?);
            (center, radius)
        }
        _ => {
            return Err(EngineError::WrongDependencies {
                kind: shape.kind.tag(),
                expected: "CIRCLE".to_string(),
                found: shape.category().to_string(),
            }
            .into())
        }
    })
}
