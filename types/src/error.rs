//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("failed to read config file: {0}")]
    Io(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid parameter {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
