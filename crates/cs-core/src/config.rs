use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CodeslimError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeslimConfig {
    pub pipeline: PipelineConfig,
    pub comments: CommentConfig,
    pub indent: IndentConfig,
    pub whitespace: WhitespaceConfig,
    pub measurement: MeasurementConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fail the transformation when the indent stage reports malformed input.
    pub strict_indent: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStrategy {
    /// String-aware scanner with escape handling.
    #[default]
    Scanner,
    /// Per-quote-character parity heuristic.
    QuoteParity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    pub strategy: CommentStrategy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentStrategy {
    /// Depth from the source's own indentation stack.
    #[default]
    Structural,
    /// Depth from block-opening keywords and `pass` dedents.
    Keyword,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentConfig {
    pub strategy: IndentStrategy,
    /// Spaces per depth unit.
    pub unit_width: usize,
    /// Line prefixes that open a block (keyword strategy).
    pub block_keywords: Vec<String>,
    /// Statement that closes a block (keyword strategy).
    pub placeholder: String,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            strategy: IndentStrategy::default(),
            unit_width: 4,
            block_keywords: [
                "def ", "class ", "if ", "elif ", "else:", "try:", "except ", "finally:",
                "with ", "while ", "for ",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            placeholder: "pass".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhitespaceConfig {
    /// Characters that never need surrounding whitespace.
    pub punctuation: String,
}

impl Default for WhitespaceConfig {
    fn default() -> Self {
        Self {
            punctuation: "{}:,()".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    pub interpreter: String,
    /// Zero disables the timeout.
    pub timeout_ms: u64,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            interpreter: "python3".into(),
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub hr_suffix: String,
    pub mr_suffix: String,
    pub extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            hr_suffix: "_hr".into(),
            mr_suffix: "_mr".into(),
            extension: "py".into(),
        }
    }
}

impl StorageConfig {
    /// Key of the human-readable variant, e.g. `mymod_hr.py`.
    pub fn hr_key(&self, name: &str) -> String {
        self.key(name, &self.hr_suffix)
    }

    /// Key of the minified variant, e.g. `mymod_mr.py`.
    pub fn mr_key(&self, name: &str) -> String {
        self.key(name, &self.mr_suffix)
    }

    fn key(&self, name: &str, suffix: &str) -> String {
        if self.extension.is_empty() {
            format!("{name}{suffix}")
        } else {
            format!("{name}{suffix}.{}", self.extension)
        }
    }
}

impl CodeslimConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading config");
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.indent.unit_width == 0 {
            return Err(CodeslimError::Config("indent.unit_width must be positive".into()));
        }
        if self.indent.strategy == IndentStrategy::Keyword {
            if self.indent.block_keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(CodeslimError::Config("indent.block_keywords is empty".into()));
            }
            if self.indent.placeholder.trim().is_empty() {
                return Err(CodeslimError::Config("indent.placeholder is empty".into()));
            }
        }
        if self.whitespace.punctuation.chars().any(char::is_whitespace) {
            return Err(CodeslimError::Config(
                "whitespace.punctuation may not contain whitespace".into(),
            ));
        }
        if self.measurement.interpreter.trim().is_empty() {
            return Err(CodeslimError::Config("measurement.interpreter is empty".into()));
        }
        if self.storage.hr_suffix == self.storage.mr_suffix {
            return Err(CodeslimError::Config(
                "storage.hr_suffix and storage.mr_suffix must differ".into(),
            ));
        }
        Ok(())
    }
}
