//! The line grammar of project files.
//!
//! Every command is one line of the form `verb(arg, ...)`. Shapes are
//! described inside `draw(...)` as
//! `CATEGORY: type = KIND [name: N] [dependencies: A, B] [key = value]...`.

use construction_engine::{
    CircleKind, Command, DrawSpec, LineKind, PointKind, ShapeKind, TriangleCenter,
};
use geo_kernel::Point2d;
use pad_types::{Color, GlobalVariable, ShapeCategory};

use crate::errors::ParseError;

/// Argument of `hide` that shows every shape instead.
pub const SHOW_ALL: &str = "all";

// ─── Encoding ────────────────────────────────────────────────────────────────

/// Render `cmd` as one project line, without a trailing newline.
pub fn encode_command(cmd: &Command) -> String {
    match cmd {
        Command::Draw { shape } => format!("draw({})", describe(shape)),
        Command::Delete { target } => format!("delete({target})"),
        Command::Hide { target } => format!("hide({target})"),
        Command::ShowAll => format!("hide({SHOW_ALL})"),
        Command::Move { target, x, y } => format!("move({target}, {x}, {y})"),
        Command::Rename { target, new_name } => format!("rename({target}, {new_name})"),
        Command::Recolor { target, color } => format!("color({target}, {color})"),
        Command::DragLabel { target, direction } => format!("drag({target}, {direction})"),
        Command::Translate { dx, dy } => format!("translate({dx}, {dy})"),
        Command::Zoom { x, y, factor } => format!("zoom({x}, {y}, {factor})"),
        Command::SetGlobal { variable, value } => format!("globalvar({variable}={value})"),
    }
}

/// Structured description of a shape, as used inside `draw(...)`.
pub fn describe(spec: &DrawSpec) -> String {
    let mut out = format!("{}: type = {}", spec.kind.category(), spec.kind.tag());
    if let Some(name) = &spec.name {
        out.push_str(&format!(" name: {name}"));
    }
    match spec.dependencies.len() {
        0 => {}
        1 => out.push_str(&format!(" dependency: {}", spec.dependencies[0])),
        _ => out.push_str(&format!(" dependencies: {}", spec.dependencies.join(", "))),
    }
    if let Some(p) = spec.position {
        out.push_str(&format!(" x = {} y = {}", p.x, p.y));
    }
    match spec.kind {
        ShapeKind::Point(PointKind::OnShape { relative_location }) => {
            out.push_str(&format!(" relativeLocation = {relative_location}"));
        }
        ShapeKind::Point(PointKind::Relative { ratio }) => {
            out.push_str(&format!(" ratio = {ratio}"));
        }
        ShapeKind::Point(PointKind::TriangleCenter { center }) => {
            out.push_str(&format!(" center = {}", center.tag()));
        }
        _ => {}
    }
    if let Some(identifier) = spec.kind.identifier() {
        out.push_str(&format!(" identifier = {identifier}"));
    }
    out
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Parse one non-empty project line.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let open = line.find('(').ok_or(ParseError::Malformed)?;
    let inner = line[open + 1..]
        .strip_suffix(')')
        .ok_or(ParseError::Malformed)?;
    let verb = line[..open].trim();

    match verb {
        "draw" => Ok(Command::Draw {
            shape: parse_description(inner)?,
        }),
        "delete" => {
            let [target] = args::<1>("delete", inner)?;
            Ok(Command::Delete { target })
        }
        "hide" => {
            let [target] = args::<1>("hide", inner)?;
            Ok(if target == SHOW_ALL {
                Command::ShowAll
            } else {
                Command::Hide { target }
            })
        }
        "move" => {
            let [target, x, y] = args::<3>("move", inner)?;
            Ok(Command::Move {
                target,
                x: number(&x)?,
                y: number(&y)?,
            })
        }
        "rename" => {
            let [target, new_name] = args::<2>("rename", inner)?;
            Ok(Command::Rename { target, new_name })
        }
        "color" => {
            let [target, color] = args::<2>("color", inner)?;
            Ok(Command::Recolor {
                target,
                color: color.parse::<Color>()?,
            })
        }
        "drag" => {
            let [target, direction] = args::<2>("drag", inner)?;
            Ok(Command::DragLabel {
                target,
                direction: number(&direction)?,
            })
        }
        "translate" => {
            let [dx, dy] = args::<2>("translate", inner)?;
            Ok(Command::Translate {
                dx: number(&dx)?,
                dy: number(&dy)?,
            })
        }
        "zoom" => {
            let [x, y, factor] = args::<3>("zoom", inner)?;
            Ok(Command::Zoom {
                x: number(&x)?,
                y: number(&y)?,
                factor: number(&factor)?,
            })
        }
        "globalvar" => {
            let (key, value) = inner.split_once('=').ok_or(ParseError::Malformed)?;
            Ok(Command::SetGlobal {
                variable: key.parse::<GlobalVariable>()?,
                value: number(value)?,
            })
        }
        other => Err(ParseError::UnknownVerb(other.to_string())),
    }
}

/// Split comma-separated arguments, requiring exactly `N`.
fn args<const N: usize>(verb: &'static str, inner: &str) -> Result<[String; N], ParseError> {
    let parts: Vec<String> = inner
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let found = parts.len();
    parts.try_into().map_err(|_| ParseError::ArgumentCount {
        verb,
        expected: N,
        found,
    })
}

fn number(s: &str) -> Result<f64, ParseError> {
    let s = s.trim();
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber(s.to_string()))
}

fn boolean(s: &str) -> Result<bool, ParseError> {
    match s.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ParseError::InvalidBool(other.to_string())),
    }
}

/// Fields collected from a shape description.
#[derive(Debug, Default)]
struct Fields {
    name: Option<String>,
    dependencies: Vec<String>,
    values: Vec<(String, String)>,
}

impl Fields {
    fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required(&self, key: &'static str) -> Result<&str, ParseError> {
        self.value(key).ok_or(ParseError::MissingField(key))
    }
}

/// Break a description into words, with `:`, `=` and `,` as their own
/// tokens.
fn tokenize(desc: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in desc.chars() {
        match c {
            ':' | '=' | ',' => {
                if !word.is_empty() {
                    tokens.push(std::mem::take(&mut word));
                }
                tokens.push(c.to_string());
            }
            c if c.is_whitespace() => {
                if !word.is_empty() {
                    tokens.push(std::mem::take(&mut word));
                }
            }
            c => word.push(c),
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

/// Parse the inside of `draw(...)`.
pub fn parse_description(desc: &str) -> Result<DrawSpec, ParseError> {
    let tokens = tokenize(desc);
    let mut it = tokens.iter().map(String::as_str).peekable();
    let mut expect = |want: &str| -> Result<String, ParseError> {
        match it.next() {
            Some(t) if want.is_empty() || t == want => Ok(t.to_string()),
            Some(t) => Err(ParseError::UnexpectedToken(t.to_string())),
            None => Err(ParseError::Malformed),
        }
    };

    let category = expect("")?.parse::<ShapeCategory>()?;
    expect(":")?;
    expect("type")?;
    expect("=")?;
    let tag = expect("")?;

    let mut fields = Fields::default();
    while let Some(key) = it.next() {
        match key {
            "name" => {
                expect_token(&mut it, ":")?;
                fields.name = Some(next_token(&mut it)?);
            }
            "dependency" | "dependencies" => {
                expect_token(&mut it, ":")?;
                fields.dependencies.push(next_token(&mut it)?);
                while it.peek() == Some(&",") {
                    it.next();
                    fields.dependencies.push(next_token(&mut it)?);
                }
            }
            key => {
                expect_token(&mut it, "=")?;
                let value = next_token(&mut it)?;
                fields.values.push((key.to_string(), value));
            }
        }
    }

    let kind = kind_from_tag(&tag, &fields)?;
    if kind.category() != category {
        return Err(ParseError::CategoryMismatch {
            kind: tag,
            category: category.to_string(),
        });
    }
    let position = match kind {
        ShapeKind::Point(PointKind::Free) => Some(Point2d::new(
            number(fields.required("x")?)?,
            number(fields.required("y")?)?,
        )),
        _ => None,
    };
    let name = match category {
        ShapeCategory::Point => fields.name,
        _ => None,
    };
    Ok(DrawSpec {
        kind,
        dependencies: fields.dependencies,
        name,
        position,
    })
}

fn next_token<'a>(it: &mut impl Iterator<Item = &'a str>) -> Result<String, ParseError> {
    match it.next() {
        Some(t @ (":" | "=" | ",")) => Err(ParseError::UnexpectedToken(t.to_string())),
        Some(t) => Ok(t.to_string()),
        None => Err(ParseError::Malformed),
    }
}

fn expect_token<'a>(it: &mut impl Iterator<Item = &'a str>, want: &str) -> Result<(), ParseError> {
    match it.next() {
        Some(t) if t == want => Ok(()),
        Some(t) => Err(ParseError::UnexpectedToken(t.to_string())),
        None => Err(ParseError::Malformed),
    }
}

fn kind_from_tag(tag: &str, fields: &Fields) -> Result<ShapeKind, ParseError> {
    // Older files omit the selector on two-solution constructions.
    let identifier = || fields.value("identifier").map_or(Ok(true), boolean);
    Ok(match tag {
        "POINT" => ShapeKind::Point(PointKind::Free),
        "POINT_ON_SHAPE" => ShapeKind::Point(PointKind::OnShape {
            relative_location: number(fields.required("relativeLocation")?)?,
        }),
        "INTERSECTION_POINT" => ShapeKind::Point(PointKind::Intersection {
            identifier: identifier()?,
        }),
        "MIDPOINT" => ShapeKind::Point(PointKind::Midpoint),
        "RELATIVE_POINT" => ShapeKind::Point(PointKind::Relative {
            ratio: number(fields.required("ratio")?)?,
        }),
        "TRIANGLE_CENTER" => {
            let center = fields.required("center")?;
            ShapeKind::Point(PointKind::TriangleCenter {
                center: center
                    .parse::<TriangleCenter>()
                    .map_err(ParseError::UnknownKind)?,
            })
        }
        "SEGMENT" => ShapeKind::Line(LineKind::Segment),
        "LINE" => ShapeKind::Line(LineKind::Through),
        "PARALLEL_LINE" => ShapeKind::Line(LineKind::Parallel),
        "PERPENDICULAR_LINE" => ShapeKind::Line(LineKind::Perpendicular),
        "ANGLE_BISECTOR" => ShapeKind::Line(LineKind::AngleBisector),
        "PERPENDICULAR_BISECTOR" => ShapeKind::Line(LineKind::PerpBisector),
        "TANGENT_LINE" => ShapeKind::Line(LineKind::Tangent {
            identifier: identifier()?,
        }),
        "CIRCLE" => ShapeKind::Circle(CircleKind::ByRadiusPoint),
        "CIRCUMCIRCLE" => ShapeKind::Circle(CircleKind::Circumcircle),
        "INCIRCLE" => ShapeKind::Circle(CircleKind::Incircle),
        "TANGENT_CIRCLE" => ShapeKind::Circle(CircleKind::Tangent {
            identifier: identifier()?,
        }),
        other => return Err(ParseError::UnknownKind(other.to_string())),
    })
}
