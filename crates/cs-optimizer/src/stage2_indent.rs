//! Stage 2: indentation reconstruction.
//!
//! Blank lines are dropped and every remaining line is re-emitted at a
//! canonical depth of `unit_width` spaces per block level.

use cs_core::{IndentConfig, IndentNote, IndentStrategy, LogicalLine, SourceText};

/// Output of the indent stage: the re-emitted lines plus anything the stage
/// noticed about malformed input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reindented {
    pub lines: Vec<LogicalLine>,
    pub notes: Vec<IndentNote>,
}

impl Reindented {
    pub fn text(&self) -> SourceText {
        SourceText::new(
            self.lines
                .iter()
                .map(LogicalLine::render)
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

/// Reindent with the configured strategy.
pub fn reindent(text: &str, config: &IndentConfig) -> Reindented {
    match config.strategy {
        IndentStrategy::Structural => reindent_structural(text, config.unit_width),
        IndentStrategy::Keyword => {
            reindent_keyword(text, config.unit_width, &config.block_keywords, &config.placeholder)
        }
    }
}

// ========== Keyword ==========

/// Keyword-driven depth counter.
///
/// A line starting with a block keyword is emitted at the current depth and
/// opens one level. A line equal to `placeholder` closes one level and is
/// emitted at the closed depth. Closing below zero is recorded as
/// [`IndentNote::Underflow`] and the depth stays at zero.
pub fn reindent_keyword(
    text: &str,
    unit_width: usize,
    block_keywords: &[String],
    placeholder: &str,
) -> Reindented {
    let mut out = Reindented::default();
    let mut depth = 0usize;

    for (idx, raw) in text.split('\n').enumerate() {
        let stripped = raw.trim();
        if stripped.is_empty() {
            continue;
        }
        if block_keywords
            .iter()
            .any(|k| !k.is_empty() && stripped.starts_with(k.as_str()))
        {
            out.lines.push(LogicalLine::new(stripped, depth * unit_width));
            depth += 1;
        } else if stripped == placeholder {
            match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => out.notes.push(IndentNote::Underflow { line: idx + 1 }),
            }
            out.lines.push(LogicalLine::new(stripped, depth * unit_width));
        } else {
            out.lines.push(LogicalLine::new(stripped, depth * unit_width));
        }
    }
    out
}

// ========== Structural ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenString {
    quote: char,
    triple: bool,
}

/// Continuation state carried from one physical line to the next.
#[derive(Debug, Default)]
struct LineScan {
    brackets: usize,
    string: Option<OpenString>,
    backslash: bool,
}

impl LineScan {
    fn continues(&self) -> bool {
        self.brackets > 0 || self.string.is_some() || self.backslash
    }

    fn scan(&mut self, line: &str) {
        let chars: Vec<char> = line.chars().collect();
        let n = chars.len();
        let mut i = 0;
        self.backslash = false;

        while i < n {
            let c = chars[i];
            match self.string {
                Some(open) => {
                    if c == '\\' {
                        if i + 1 >= n {
                            // escaped newline keeps the literal open
                            return;
                        }
                        i += 2;
                        continue;
                    }
                    if c == open.quote {
                        if !open.triple {
                            self.string = None;
                        } else if i + 2 < n && chars[i + 1] == c && chars[i + 2] == c {
                            self.string = None;
                            i += 3;
                            continue;
                        }
                    }
                    i += 1;
                }
                None => match c {
                    '#' => break,
                    '"' | '\'' => {
                        let triple = i + 2 < n && chars[i + 1] == c && chars[i + 2] == c;
                        self.string = Some(OpenString { quote: c, triple });
                        i += if triple { 3 } else { 1 };
                    }
                    '(' | '[' | '{' => {
                        self.brackets += 1;
                        i += 1;
                    }
                    ')' | ']' | '}' => {
                        self.brackets = self.brackets.saturating_sub(1);
                        i += 1;
                    }
                    '\\' if i + 1 == n => {
                        self.backslash = true;
                        i += 1;
                    }
                    _ => i += 1,
                },
            }
        }

        if matches!(self.string, Some(OpenString { triple: false, .. })) {
            self.string = None;
        }
    }
}

/// Visual width of leading whitespace; tabs advance to the next multiple of 8.
fn leading_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            '\x0c' => width = 0,
            _ => break,
        }
    }
    width
}

/// Depth from the source's own block structure.
///
/// Physical lines are grouped into logical lines (open brackets, backslash
/// continuations and multi-line strings join them). Each logical line's
/// leading whitespace is matched against an indentation stack, so block
/// depth is recovered without relying on placeholder statements.
/// Continuation lines go one unit deeper than their statement; lines that
/// start inside a string literal are kept verbatim.
pub fn reindent_structural(text: &str, unit_width: usize) -> Reindented {
    let mut out = Reindented::default();
    let mut stack: Vec<usize> = vec![0];
    let mut scan = LineScan::default();
    let mut depth = 0usize;
    let mut first = true;

    for (idx, raw) in text.split('\n').enumerate() {
        let raw = raw.trim_end_matches('\r');
        let stripped = raw.trim();

        if scan.continues() {
            let in_string = scan.string.is_some();
            scan.scan(raw);
            if in_string {
                out.lines.push(LogicalLine::new(raw, 0));
            } else if !stripped.is_empty() {
                out.lines.push(LogicalLine::new(stripped, (depth + 1) * unit_width));
            }
            continue;
        }

        if stripped.is_empty() {
            continue;
        }
        if stripped.starts_with('#') {
            out.lines.push(LogicalLine::new(stripped, depth * unit_width));
            continue;
        }

        let width = leading_width(raw);
        if first {
            // an indented snippet (e.g. a method body) sets its own base level
            stack = vec![width];
            first = false;
        }
        let top = stack.last().copied().unwrap_or(0);
        if width > top {
            stack.push(width);
        } else if width < top {
            while stack.last().is_some_and(|&w| w > width) {
                stack.pop();
            }
            if stack.last() != Some(&width) {
                out.notes.push(IndentNote::InconsistentDedent { line: idx + 1 });
                stack.push(width);
            }
        }
        depth = stack.len() - 1;

        out.lines.push(LogicalLine::new(stripped, depth * unit_width));
        scan.scan(raw);
    }
    out
}
