use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a storm record or deriving its unit hydrograph.
#[derive(Debug, Error)]
pub enum HydrographError {
    /// Net rainfall depth is zero (or within tolerance of zero), so the
    /// direct runoff cannot be normalized.
    #[error(
        "net rainfall depth is {net_rainfall_depth} in; infiltration rate {infiltration_rate} in/hr absorbs all rainfall, cannot normalize to a unit hydrograph"
    )]
    DegenerateInput {
        net_rainfall_depth: f64,
        infiltration_rate: f64,
    },

    /// Storm record violates a structural requirement
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("column {column} has {actual} samples, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// Parse error with 1-based line number
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid value for {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("failed to load config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HydrographError>;
