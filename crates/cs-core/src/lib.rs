//! Shared types, errors and configuration for codeslim.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    CodeslimConfig, CommentConfig, CommentStrategy, IndentConfig, IndentStrategy,
    MeasurementConfig, PipelineConfig, StorageConfig, WhitespaceConfig,
};
pub use error::{CodeslimError, MeasurementError, Result};
pub use types::{
    IndentNote, LogicalLine, SourceText, SyntaxDiagnostic, TransformedArtifact, ValidationResult,
};
