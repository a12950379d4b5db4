//! Template error types.
//!
//! Errors are split by when they happen:
//! - [`SyntaxError`] is raised while compiling. It is fatal to construction;
//!   there is no partially compiled template.
//! - [`RenderError`] is raised by a single `render` call, e.g. when the
//!   context lacks a referenced name. Nothing is defaulted or swallowed.
//!
//! Both carry the offending token or name, and can produce a multi-line,
//! user-facing report via `format_with_context`.

use std::fmt;

use strsim::levenshtein;
use thiserror::Error;

/// Maximum allowed Levenshtein distance as a percentage of target length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Kind of an open block on the compiler's block stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    If,
    For,
}

impl BlockKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            BlockKind::If => "if",
            BlockKind::For => "for",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong while compiling a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    /// `if` tag without exactly one expression.
    #[error("Don't understand if: {tag:?}")]
    MalformedIf { tag: String },

    /// `for` tag not shaped like `for <name> in <expr>`.
    #[error("Don't understand for: {tag:?}")]
    MalformedFor { tag: String },

    /// `end...` tag followed by more words.
    #[error("Don't understand end: {tag:?}")]
    MalformedEnd { tag: String },

    /// `end...` tag with no open block.
    #[error("Too many ends: {tag:?}")]
    TooManyEnds { tag: String },

    /// `end...` tag closing a different kind of block.
    #[error("Mismatched end tag: expected end{open}, found end{found}")]
    MismatchedEnd { open: BlockKind, found: String },

    /// Block still open when the template ends.
    #[error("Unmatched action tag: {kind}")]
    UnclosedBlock { kind: BlockKind },

    /// Tag whose leading word is not `if`, `for` or `end...`.
    #[error("Don't understand tag: {word:?}")]
    UnknownTag { word: String },

    /// Variable, filter or loop name that isn't an identifier.
    #[error("Not a valid name: {name:?}")]
    InvalidIdentifier { name: String },
}

/// A compile-time error, located at the 1-based line of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (line {line})")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub line: usize,
}

impl SyntaxError {
    pub(crate) fn new(kind: SyntaxErrorKind, line: usize) -> Self {
        Self {
            kind,
            line,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &SyntaxErrorKind {
        &self.kind
    }

    /// Generate a user-friendly report, quoting the template lines around the error.
    #[must_use]
    pub fn format_with_context(&self, source: &str) -> String {
        let mut msg = String::new();

        msg.push_str("ERROR: Template Syntax Error\n\n");
        msg.push_str(&format!("Error: {}\n", self.kind));
        msg.push_str(&format!("Line: {}\n", self.line));

        let lines = extract_context_lines(source, self.line, 2);
        if !lines.is_empty() {
            msg.push('\n');
            for (number, text) in lines {
                let marker = if number == self.line {
                    ">"
                } else {
                    " "
                };
                msg.push_str(&format!("{marker} {number:>4} | {text}\n"));
            }
        }

        msg.push_str("\nSUGGESTION: ");
        msg.push_str(match &self.kind {
            SyntaxErrorKind::MalformedIf {
                ..
            } => "Write conditions as {% if expr %}, with no spaces inside expr.",
            SyntaxErrorKind::MalformedFor {
                ..
            } => "Write loops as {% for name in expr %}.",
            SyntaxErrorKind::MalformedEnd {
                ..
            } => "End tags take no arguments: {% endif %} or {% endfor %}.",
            SyntaxErrorKind::TooManyEnds {
                ..
            } => "Remove the extra end tag, or add the block it should close.",
            SyntaxErrorKind::MismatchedEnd {
                ..
            } => "Close blocks in reverse order of opening.",
            SyntaxErrorKind::UnclosedBlock {
                ..
            } => "Add the missing {% endif %} or {% endfor %}.",
            SyntaxErrorKind::UnknownTag {
                ..
            } => "Only if, for, endif and endfor tags are supported.",
            SyntaxErrorKind::InvalidIdentifier {
                ..
            } => {
                "Names must start with a letter or underscore; \
                 filters are written without spaces, as in {{ name|upper }}."
            }
        });
        msg.push_str("\n\n");

        msg
    }
}

/// Error returned by a filter function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FilterError {
    pub message: String,
}

impl FilterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure building a [`Context`](super::Context) from external data.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Context must be an object/table at the top level, found {found}")]
    NotAMapping { found: &'static str },

    #[error("Failed to serialize context value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A failure while rendering a compiled template.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// A free variable of the template is absent from the merged context.
    #[error("Template variable not found: '{name}'")]
    MissingVariable {
        name: String,
        suggestions: Vec<String>,
        available: Vec<String>,
    },

    /// A loop-bound name read outside of its loop.
    #[error("Loop variable '{name}' used outside of its loop")]
    Unbound { name: String },

    /// A dotted step matched no field, key or index.
    #[error("Cannot resolve '.{name}' on a {kind} value")]
    LookupFailed { name: String, kind: &'static str },

    /// `{% for %}` over something that isn't a list, map or string.
    #[error("Cannot iterate over a {kind} value")]
    NotIterable { kind: &'static str },

    /// A pipeline stage whose name is bound to something other than a filter.
    #[error("'{name}' is a {kind}, not a filter")]
    NotAFilter { name: String, kind: &'static str },

    /// A filter function reported an error.
    #[error("Filter '{name}' failed: {source}")]
    FilterFailed {
        name: String,
        #[source]
        source: FilterError,
    },
}

impl RenderError {
    /// Build a [`RenderError::MissingVariable`] with close-match suggestions
    /// drawn from the names that are available.
    pub(crate) fn missing_variable<'a>(
        name: &str,
        available: impl IntoIterator<Item = &'a String>,
    ) -> Self {
        let mut available: Vec<String> = available.into_iter().cloned().collect();
        available.sort();
        available.dedup();
        let suggestions = find_similar(name, &available);
        RenderError::MissingVariable {
            name: name.to_string(),
            suggestions,
            available,
        }
    }

    /// Generate user-friendly error message with suggestions.
    #[must_use]
    pub fn format_with_context(&self) -> String {
        let mut msg = String::new();
        match self {
            RenderError::MissingVariable {
                name,
                suggestions,
                available,
            } => {
                msg.push_str("ERROR: Template Variable Not Found\n\n");
                msg.push_str(&format!("Variable: {}\n\n", name));

                if !suggestions.is_empty() {
                    msg.push_str("Did you mean one of these?\n");
                    for suggestion in suggestions {
                        msg.push_str(&format!("  - {}\n", suggestion));
                    }
                    msg.push('\n');
                }

                if !available.is_empty() {
                    msg.push_str("Available variables in this context:\n");
                    for var in available.iter().take(10) {
                        msg.push_str(&format!("  {}\n", var));
                    }
                    if available.len() > 10 {
                        msg.push_str(&format!("  ... and {} more\n", available.len() - 10));
                    }
                    msg.push('\n');
                }
            }
            other => {
                msg.push_str("ERROR: Template Render Error\n\n");
                msg.push_str(&format!("Error: {}\n\n", other));
            }
        }
        msg
    }
}

/// Up to three names within the similarity threshold, closest first.
fn find_similar(target: &str, candidates: &[String]) -> Vec<String> {
    let mut scored: Vec<(String, usize)> = candidates
        .iter()
        .map(|var| {
            let distance = levenshtein(target, var);
            (var.clone(), distance)
        })
        .collect();

    scored.sort_by_key(|(_, dist)| *dist);

    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(var, _)| var)
        .collect()
}

/// Lines around `error_line` (1-based), `context_size` on each side.
fn extract_context_lines(
    content: &str,
    error_line: usize,
    context_size: usize,
) -> Vec<(usize, String)> {
    let lines: Vec<&str> = content.lines().collect();
    let total_lines = lines.len();

    if error_line == 0 || error_line > total_lines {
        return Vec::new();
    }

    let start = error_line.saturating_sub(context_size + 1);
    let end = (error_line + context_size).min(total_lines);

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(offset, line)| (start + offset + 1, (*line).to_string()))
        .collect()
}
