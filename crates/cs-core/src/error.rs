use thiserror::Error;

use crate::types::SyntaxDiagnostic;

#[derive(Error, Debug)]
pub enum CodeslimError {
    #[error("Optimization produced invalid code: {diagnostic}")]
    OptimizationFailed { diagnostic: SyntaxDiagnostic },
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Definition not found: {name}")]
    DefinitionNotFound { name: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Load error: {0}")]
    Load(anyhow::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CodeslimError {
    /// The parser diagnostic, when this is a validation failure.
    pub fn diagnostic(&self) -> Option<&SyntaxDiagnostic> {
        match self {
            Self::OptimizationFailed { diagnostic } => Some(diagnostic),
            _ => None,
        }
    }
}

/// Memory measurement failures. Soft: callers usually fall back to 0.0.
#[derive(Error, Debug)]
pub enum MeasurementError {
    #[error("Measurement unavailable: {0}")]
    Unavailable(String),
    #[error("Measurement timed out after {0} ms")]
    TimedOut(u64),
}

pub type Result<T> = std::result::Result<T, CodeslimError>;
