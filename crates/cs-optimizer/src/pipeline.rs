//! Transformation pipeline — strip, reindent, collapse, validate.

use crate::stage2_indent::Reindented;
use crate::stage3_whitespace::Collapser;
use crate::stage4_validate::{PythonValidator, SyntaxValidator};
use crate::{stage1_comments, stage2_indent};
use cs_core::{
    CodeslimConfig, CodeslimError, CommentStrategy, IndentConfig, Result, SourceText,
    TransformedArtifact, ValidationResult,
};
use tracing::{debug, warn};

/// The main transformation pipeline.
///
/// Stage order is fixed. Only a validated artifact ever leaves
/// [`Pipeline::transform`]; anything else becomes
/// [`CodeslimError::OptimizationFailed`].
pub struct Pipeline {
    comments: CommentStrategy,
    indent: IndentConfig,
    strict_indent: bool,
    collapser: Collapser,
    validator: Box<dyn SyntaxValidator>,
}

impl Pipeline {
    pub fn new(config: &CodeslimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            comments: config.comments.strategy,
            indent: config.indent.clone(),
            strict_indent: config.pipeline.strict_indent,
            collapser: Collapser::new(&config.whitespace.punctuation)?,
            validator: Box::new(PythonValidator::new()),
        })
    }

    /// Replace the syntax validator.
    pub fn with_validator(mut self, validator: impl SyntaxValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn language(&self) -> &'static str {
        self.validator.language()
    }

    pub fn strip_comments(&self, source: &SourceText) -> SourceText {
        SourceText::new(stage1_comments::strip(source.as_str(), self.comments))
    }

    pub fn reindent(&self, source: &SourceText) -> Reindented {
        stage2_indent::reindent(source.as_str(), &self.indent)
    }

    pub fn collapse(&self, source: &SourceText) -> SourceText {
        SourceText::new(self.collapser.collapse(source.as_str()))
    }

    pub fn validate(&self, source: &SourceText) -> ValidationResult {
        self.validator.validate(source)
    }

    /// Comment-free, canonically indented, still multi-line rendering.
    /// Not validated.
    pub fn humanize(&self, source: &SourceText) -> SourceText {
        let stripped = self.strip_comments(source);
        self.reindent(&stripped).text()
    }

    /// Run all four stages.
    pub fn transform(&self, source: &SourceText) -> Result<TransformedArtifact> {
        let stripped = self.strip_comments(source);
        debug!(before = source.len(), after = stripped.len(), "comments stripped");

        let reindented = self.reindent(&stripped);
        for note in &reindented.notes {
            warn!(%note, "indent stage reported malformed input");
        }
        if self.strict_indent {
            if let Some(note) = reindented.notes.first() {
                return Err(CodeslimError::MalformedInput(note.to_string()));
            }
        }
        let reindented_text = reindented.text();
        debug!(lines = reindented.lines.len(), "reindented");

        let collapsed = self.collapse(&reindented_text);
        debug!(after = collapsed.len(), "whitespace collapsed");

        let validation = self.validate(&collapsed);
        TransformedArtifact::from_validated(collapsed, validation, reindented.notes).map_err(
            |diagnostic| {
                debug!(%diagnostic, "transformed text rejected");
                CodeslimError::OptimizationFailed { diagnostic }
            },
        )
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        let config = CodeslimConfig::default();
        Self {
            comments: config.comments.strategy,
            indent: config.indent,
            strict_indent: config.pipeline.strict_indent,
            collapser: Collapser::default(),
            validator: Box::new(PythonValidator::new()),
        }
    }
}

/// Transform with the default pipeline.
pub fn transform(source: &SourceText) -> Result<TransformedArtifact> {
    Pipeline::default().transform(source)
}
