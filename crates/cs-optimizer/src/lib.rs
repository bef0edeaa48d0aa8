//! codeslim optimizer — four-stage Python minification pipeline.
//!
//! Stages:
//! 1. Comment removal (`#` comments, standalone triple-quoted strings)
//! 2. Indentation reconstruction
//! 3. Whitespace collapsing
//! 4. Syntax validation — only valid output leaves the pipeline

pub mod extract;
pub mod pipeline;
pub mod stage1_comments;
pub mod stage2_indent;
pub mod stage3_whitespace;
pub mod stage4_validate;

pub use extract::extract_definition;
pub use pipeline::{transform, Pipeline};
pub use stage2_indent::Reindented;
pub use stage3_whitespace::Collapser;
pub use stage4_validate::{PythonValidator, SyntaxValidator};

#[cfg(test)]
mod tests;
