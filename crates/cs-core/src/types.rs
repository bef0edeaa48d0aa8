use serde::{Deserialize, Serialize};
use std::fmt;

/// One compilation unit of source text. Stages take a `&SourceText` and
/// return a fresh one; nothing mutates in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceText(String);

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn lines(&self) -> std::str::Split<'_, char> {
        self.0.split('\n')
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceText {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SourceText {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for SourceText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A line after comment removal, with the depth it will be emitted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub content: String,
    /// Indent in spaces; always a multiple of the unit width.
    pub depth: usize,
}

impl LogicalLine {
    pub fn new(content: impl Into<String>, depth: usize) -> Self {
        Self {
            content: content.into(),
            depth,
        }
    }

    pub fn render(&self) -> String {
        format!("{}{}", " ".repeat(self.depth), self.content)
    }
}

/// Parser diagnostic. Never fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxDiagnostic {
    pub message: String,
    /// 1-based.
    #[serde(default)]
    pub line: Option<usize>,
    /// 1-based.
    #[serde(default)]
    pub column: Option<usize>,
}

impl SyntaxDiagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for SyntaxDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => write!(f, "{} (line {line}, column {col})", self.message),
            (Some(line), None) => write!(f, "{} (line {line})", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ValidationResult {
    Valid,
    Invalid { diagnostic: SyntaxDiagnostic },
}

impl ValidationResult {
    pub fn invalid(diagnostic: SyntaxDiagnostic) -> Self {
        Self::Invalid { diagnostic }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Something the indent stage noticed about malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndentNote {
    /// More dedents than open blocks; depth was clamped at zero.
    Underflow { line: usize },
    /// A dedent landed between two enclosing indentation levels.
    InconsistentDedent { line: usize },
}

impl fmt::Display for IndentNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Underflow { line } => write!(f, "indentation underflow at line {line}"),
            Self::InconsistentDedent { line } => {
                write!(f, "dedent does not match any outer level at line {line}")
            }
        }
    }
}

/// Pipeline output. Can only be built from a `Valid` result, so holding
/// one means the text parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformedArtifact {
    text: SourceText,
    validation: ValidationResult,
    notes: Vec<IndentNote>,
}

impl TransformedArtifact {
    /// Returns the diagnostic back when `validation` is not `Valid`.
    pub fn from_validated(
        text: SourceText,
        validation: ValidationResult,
        notes: Vec<IndentNote>,
    ) -> std::result::Result<Self, SyntaxDiagnostic> {
        match validation {
            ValidationResult::Valid => Ok(Self {
                text,
                validation: ValidationResult::Valid,
                notes,
            }),
            ValidationResult::Invalid { diagnostic } => Err(diagnostic),
        }
    }

    pub fn text(&self) -> &SourceText {
        &self.text
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn notes(&self) -> &[IndentNote] {
        &self.notes
    }

    pub fn into_text(self) -> SourceText {
        self.text
    }
}
