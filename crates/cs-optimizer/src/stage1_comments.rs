//! Stage 1: comment removal — `#` comments and standalone triple-quoted strings.

use cs_core::CommentStrategy;
use regex::Regex;
use std::sync::LazyLock;

static RE_TRIPLE_DOUBLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##""""[\s\S]*?""""##).unwrap());
static RE_TRIPLE_SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'''[\s\S]*?'''").unwrap());

const STRING_PREFIX: &str = "rRuUbBfF";

/// Strip comments with the given strategy.
pub fn strip(text: &str, strategy: CommentStrategy) -> String {
    match strategy {
        CommentStrategy::Scanner => strip_scanner(text),
        CommentStrategy::QuoteParity => strip_quote_parity(text),
    }
}

// ========== Quote parity ==========

/// Remove every triple-quoted span, then truncate each line at the first `#`
/// unless an odd number of `"` or `'` precedes it.
///
/// Parity is counted per quote character, so `"it's" # x` keeps its comment.
pub fn strip_quote_parity(text: &str) -> String {
    let text = RE_TRIPLE_DOUBLE.replace_all(text, "");
    let text = RE_TRIPLE_SINGLE.replace_all(&text, "");
    text.split('\n')
        .map(strip_line_parity)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_line_parity(line: &str) -> &str {
    if line.contains("\"\"\"") || line.contains("'''") {
        return line;
    }
    let Some(pos) = line.find('#') else {
        return line;
    };
    let before = &line[..pos];
    let inside_string = ['"', '\''].iter().any(|q| before.matches(*q).count() % 2 == 1);
    if inside_string {
        line
    } else {
        &line[..pos]
    }
}

// ========== Scanner ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    InString { quote: char },
}

/// Tokenizing comment stripper.
///
/// Tracks which kind of string literal is open and honors backslash escapes.
/// A `#` in code starts a comment that runs to end of line. Triple-quoted
/// strings that form a statement on their own (docstrings) are removed;
/// triple-quoted strings used as values are kept.
pub fn strip_scanner(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut brackets = 0usize;
    let mut i = 0;

    while i < n {
        let c = chars[i];
        match state {
            State::Code => match c {
                '#' => {
                    while i < n && chars[i] != '\n' {
                        i += 1;
                    }
                    let kept = out.trim_end_matches([' ', '\t']).len();
                    out.truncate(kept);
                }
                '"' | '\'' => {
                    let triple = i + 2 < n && chars[i + 1] == c && chars[i + 2] == c;
                    if !triple {
                        state = State::InString { quote: c };
                        out.push(c);
                        i += 1;
                        continue;
                    }
                    let end = triple_end(&chars, i + 3, c);
                    if brackets == 0 && is_standalone(&out, &chars, end) {
                        let kept = out.trim_end_matches(|ch: char| STRING_PREFIX.contains(ch)).len();
                        out.truncate(kept);
                    } else {
                        out.extend(&chars[i..end]);
                    }
                    i = end;
                }
                '(' | '[' | '{' => {
                    brackets += 1;
                    out.push(c);
                    i += 1;
                }
                ')' | ']' | '}' => {
                    brackets = brackets.saturating_sub(1);
                    out.push(c);
                    i += 1;
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            },
            State::InString { quote } => {
                if c == '\\' && i + 1 < n {
                    out.push(c);
                    out.push(chars[i + 1]);
                    i += 2;
                    continue;
                }
                // An unterminated single-line literal ends at the newline.
                if c == quote || c == '\n' {
                    state = State::Code;
                }
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Index just past the closing triple quote, or `chars.len()` if unterminated.
fn triple_end(chars: &[char], mut j: usize, quote: char) -> usize {
    let n = chars.len();
    while j < n {
        if chars[j] == '\\' {
            j += 2;
            continue;
        }
        if j + 2 < n && chars[j] == quote && chars[j + 1] == quote && chars[j + 2] == quote {
            return j + 3;
        }
        j += 1;
    }
    n
}

/// A triple-quoted string is standalone when only indentation and string
/// prefix letters precede it on its line and only whitespace or a comment
/// follows it.
fn is_standalone(out: &str, chars: &[char], end: usize) -> bool {
    let line_start = out.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let before = out[line_start..].trim_start_matches([' ', '\t']);
    if before.len() > 2 || !before.chars().all(|ch| STRING_PREFIX.contains(ch)) {
        return false;
    }
    let mut j = end;
    while j < chars.len() && (chars[j] == ' ' || chars[j] == '\t') {
        j += 1;
    }
    j >= chars.len() || matches!(chars[j], '\n' | '\r' | '#')
}
