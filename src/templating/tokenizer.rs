//! Splits template text into tokens.
//!
//! The four token shapes are mutually exclusive: `{{ expr }}`, `{% tag %}`,
//! `{# comment #}`, and the literal runs between them. Matching is
//! non-greedy inside each delimiter pair, and a pair may span lines. An
//! opening delimiter with no closing partner is left in the literal text;
//! there is no way to escape a delimiter.

use std::sync::LazyLock;

use regex::Regex;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}|\{#.*?#\}").expect("token regex is valid")
});

/// One lexical unit of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Plain text, emitted verbatim.
    Literal(&'a str),
    /// `{# ... #}`; the body between the delimiters.
    Comment(&'a str),
    /// `{{ ... }}`; the trimmed body between the delimiters.
    Expression(&'a str),
    /// `{% ... %}`; the full raw tag text, delimiters included.
    Tag(&'a str),
}

/// A token together with the 1-based line on which it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<'a> {
    pub token: Token<'a>,
    pub line: usize,
}

/// Every token in document order, comments included.
pub fn scan(text: &str) -> Vec<Spanned<'_>> {
    let mut tokens = Vec::new();
    let mut cursor = 0;
    let mut line = 1;

    for m in TOKEN_RE.find_iter(text) {
        if m.start() > cursor {
            let literal = &text[cursor..m.start()];
            tokens.push(Spanned {
                token: Token::Literal(literal),
                line,
            });
            line += newlines(literal);
        }
        let raw = m.as_str();
        let body = &raw[2..raw.len() - 2];
        let token = match &raw[..2] {
            "{#" => Token::Comment(body),
            "{{" => Token::Expression(body.trim()),
            _ => Token::Tag(raw),
        };
        tokens.push(Spanned {
            token,
            line,
        });
        line += newlines(raw);
        cursor = m.end();
    }

    if cursor < text.len() {
        tokens.push(Spanned {
            token: Token::Literal(&text[cursor..]),
            line,
        });
    }

    tokens
}

fn newlines(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}

/// Tokens the compiler consumes: [`scan`] with comments dropped.
pub fn tokenize(text: &str) -> Vec<Spanned<'_>> {
    let tokens: Vec<_> = scan(text)
        .into_iter()
        .filter(|spanned| !matches!(spanned.token, Token::Comment(_)))
        .collect();
    tracing::trace!("Tokenized template into {} token(s)", tokens.len());
    tokens
}

/// Body of a raw `{% ... %}` tag, split on whitespace.
pub(crate) fn tag_words(raw: &str) -> Vec<&str> {
    raw[2..raw.len() - 2].split_whitespace().collect()
}
