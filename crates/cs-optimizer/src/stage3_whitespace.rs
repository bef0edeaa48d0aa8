//! Stage 3: whitespace collapsing — single-line minified rendering.

use cs_core::{CodeslimError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Punctuation that never needs surrounding whitespace.
pub const DEFAULT_PUNCTUATION: &str = "{}:,()";

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static RE_DEFAULT_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| punctuation_regex(DEFAULT_PUNCTUATION).unwrap());

fn punctuation_regex(punctuation: &str) -> std::result::Result<Regex, regex::Error> {
    let class: String = punctuation
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    Regex::new(&format!(r"\s*([{class}])\s*"))
}

/// Collapses whitespace runs and drops whitespace around punctuation.
#[derive(Debug, Clone)]
pub struct Collapser {
    punct_re: Option<Regex>,
}

impl Collapser {
    pub fn new(punctuation: &str) -> Result<Self> {
        if punctuation.is_empty() {
            return Ok(Self { punct_re: None });
        }
        let re = punctuation_regex(punctuation)
            .map_err(|e| CodeslimError::Config(format!("bad punctuation set: {e}")))?;
        Ok(Self { punct_re: Some(re) })
    }

    pub fn collapse(&self, text: &str) -> String {
        let spaced = RE_WHITESPACE.replace_all(text, " ");
        let result = match &self.punct_re {
            Some(re) => re.replace_all(&spaced, "${1}").into_owned(),
            None => spaced.into_owned(),
        };
        result.trim().to_string()
    }
}

impl Default for Collapser {
    fn default() -> Self {
        Self {
            punct_re: Some(RE_DEFAULT_PUNCT.clone()),
        }
    }
}

/// Collapse with the default punctuation set.
pub fn collapse(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    Collapser::default().collapse(text)
}
