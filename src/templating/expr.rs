//! Compiles `{{ ... }}` bodies and tag arguments into [`Expr`] trees.
//!
//! The grammar has a fixed shape, checked outermost first:
//!
//! 1. `a|f|g` is a pipeline. The first segment is compiled recursively and
//!    each filter wraps the result, so `x|f|g` is `g(f(x))`.
//! 2. `a.b.c` is a dotted chain, only when no `|` is present. The names after
//!    the first segment are resolved at render time.
//! 3. `name` is a bare identifier.
//!
//! Because pipes are split before dots, `a.b|f` applies `f` to the fully
//! resolved `a.b`. Segments are not trimmed: `a | f` has the invalid name
//! `"a "`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::error::SyntaxErrorKind;
use super::program::Expr;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[_a-zA-Z][_a-zA-Z0-9]*$").expect("identifier regex is valid"));

/// Whether `name` can be used as a variable, filter or loop name.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// Validate `name` and record it in `vars`.
pub(crate) fn register(name: &str, vars: &mut BTreeSet<String>) -> Result<(), SyntaxErrorKind> {
    if !is_identifier(name) {
        return Err(SyntaxErrorKind::InvalidIdentifier {
            name: name.to_string(),
        });
    }
    vars.insert(name.to_string());
    Ok(())
}

/// Compile one expression, recording every identifier it references
/// (base names and filter names) in `all_vars`.
pub fn compile_expr(expr: &str, all_vars: &mut BTreeSet<String>) -> Result<Expr, SyntaxErrorKind> {
    if expr.contains('|') {
        let mut pipes = expr.split('|');
        let head = pipes.next().unwrap_or_default();
        let mut code = compile_expr(head, all_vars)?;
        for filter in pipes {
            register(filter, all_vars)?;
            code = Expr::Call {
                filter: filter.to_string(),
                arg: Box::new(code),
            };
        }
        Ok(code)
    } else if expr.contains('.') {
        let mut dots = expr.split('.');
        let head = dots.next().unwrap_or_default();
        let base = compile_expr(head, all_vars)?;
        Ok(Expr::Dots {
            base: Box::new(base),
            names: dots.map(str::to_string).collect(),
        })
    } else {
        register(expr, all_vars)?;
        Ok(Expr::Var(expr.to_string()))
    }
}
