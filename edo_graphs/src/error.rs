// Error types for every stage of the pipeline.
//
// Each stage reports its own enum so callers can match on the failure they
// care about; `Error` wraps them all for the pipeline entry points and the
// binaries. Nothing here is retried: a stage either completes or returns one
// of these.

use std::path::PathBuf;
use thiserror::Error;

/// A symbol or chord that breaks the necklace codec's contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid base-62 digit {0:?}")]
    InvalidDigit(char),

    #[error("run of {run} inactive positions does not fit one base-62 digit")]
    RunTooLong { run: usize },

    #[error("rotation index {index} out of range for {edo}-EDO")]
    RotationOutOfRange { index: usize, edo: usize },

    #[error("shape {shape:?} decodes to {len} positions, more than {edo}")]
    Overflow { shape: String, len: usize, edo: usize },

    #[error("symbol {0:?} has no rotation suffix")]
    MissingRotation(String),

    #[error("empty rotation suffix in symbol {0:?}")]
    EmptyRotation(String),
}

/// Configuration that failed validation before any file was touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("could not parse {field} from {value:?}")]
    Parse { field: &'static str, value: String },

    #[error("settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Malformed graph file, with the 1-based line where reading stopped.
#[derive(Error, Debug)]
pub enum GraphFileError {
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("graph file ended early: {0}")]
    Truncated(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GraphFileError {
    pub(crate) fn syntax(line: usize, reason: impl Into<String>) -> Self {
        GraphFileError::Syntax {
            line,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout needs at least one dimension")]
    ZeroDimensions,

    #[error("layout cancelled after {completed} iterations")]
    Cancelled { completed: u32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("viewport {size} is too small for a margin of {margin}")]
    ViewportTooSmall { size: f64, margin: f64 },
}

/// Any failure surfaced by the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    GraphFile(#[from] GraphFileError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Bounds(#[from] BoundsError),

    #[error("no component with at least {min_component} chords survived filtering")]
    EmptyGraph { min_component: usize },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scene serialization: {0}")]
    Scene(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
