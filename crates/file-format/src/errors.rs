use construction_engine::EngineError;
use pad_types::{InvalidColor, UnknownCategory, UnknownVariable};

/// Errors turning one project line into a command.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("line is not of the form verb(args)")]
    Malformed,

    #[error("unknown verb: {0}")]
    UnknownVerb(String),

    #[error("{verb} expects {expected} argument(s), got {found}")]
    ArgumentCount {
        verb: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    #[error("invalid boolean: {0:?}")]
    InvalidBool(String),

    #[error(transparent)]
    Color(#[from] InvalidColor),

    #[error(transparent)]
    Variable(#[from] UnknownVariable),

    #[error(transparent)]
    Category(#[from] UnknownCategory),

    #[error("unknown construction: {0}")]
    UnknownKind(String),

    #[error("{kind} is not a {category} construction")]
    CategoryMismatch { kind: String, category: String },

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unexpected token {0:?}")]
    UnexpectedToken(String),
}

/// Errors from a strict project load.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("line {line}: {source}")]
    Parse { line: usize, source: ParseError },

    #[error("line {line}: command rejected: {source}")]
    Rejected { line: usize, source: EngineError },
}

/// Errors during vector export.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("canvas must be positive and finite, got {width}x{height}")]
    InvalidCanvas { width: f64, height: f64 },

    #[error("scale must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("failed to write export text")]
    Write(#[from] std::fmt::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
