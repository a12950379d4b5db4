//! Built-in filters.
//!
//! Filters are ordinary context entries holding a [`Value::Filter`]; a
//! template writes `{{ name|upper }}` and `upper` is looked up like any other
//! free variable. Nothing is registered implicitly. Pass [`builtins`] as a
//! compile-time context to make these available:
//!
//! ```
//! use templite::{Context, Templite, filters};
//!
//! let templite = Templite::with_contexts("{{ title|trim|upper }}", [filters::builtins()])?;
//! let context = Context::new().with("title", "  intro ");
//! assert_eq!(templite.render(Some(&context))?, "INTRO");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! | Filter       | Input               | Result                               |
//! |--------------|---------------------|--------------------------------------|
//! | `upper`      | any                 | string form, upper-cased             |
//! | `lower`      | any                 | string form, lower-cased             |
//! | `title`      | any                 | each word capitalized                |
//! | `capitalize` | any                 | first character upper-cased          |
//! | `trim`       | any                 | surrounding whitespace removed       |
//! | `string`     | any                 | string form                          |
//! | `length`     | string, list, map   | number of characters/items/entries   |
//! | `reverse`    | string, list        | reversed                             |
//! | `first`      | string, list        | first item, or none when empty       |
//! | `last`       | string, list        | last item, or none when empty        |

use super::context::Context;
use super::error::FilterError;
use super::value::Value;

/// Names of every built-in filter.
pub const BUILTIN_FILTERS: &[&str] = &[
    "capitalize",
    "first",
    "last",
    "length",
    "lower",
    "reverse",
    "string",
    "title",
    "trim",
    "upper",
];

/// A context holding every built-in filter under its name.
#[must_use]
pub fn builtins() -> Context {
    let mut context = Context::new();
    context.insert("upper", Value::filter(|v| Ok(Value::Str(v.to_string().to_uppercase()))));
    context.insert("lower", Value::filter(|v| Ok(Value::Str(v.to_string().to_lowercase()))));
    context.insert("title", Value::filter(|v| Ok(Value::Str(title(&v.to_string())))));
    context.insert("capitalize", Value::filter(|v| Ok(Value::Str(capitalize(&v.to_string())))));
    context.insert("trim", Value::filter(|v| Ok(Value::Str(v.to_string().trim().to_string()))));
    context.insert("string", Value::filter(|v| Ok(Value::Str(v.to_string()))));
    context.insert("length", Value::filter(length));
    context.insert("reverse", Value::filter(reverse));
    context.insert("first", Value::filter(|v| nth_end(v, "first", false)));
    context.insert("last", Value::filter(|v| nth_end(v, "last", true)));
    context
}

fn title(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }
    result
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn length(value: &Value) -> Result<Value, FilterError> {
    let len = match value {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        other => {
            return Err(FilterError::new(format!("length of a {} value is undefined", other.kind())));
        }
    };
    Ok(Value::from(len))
}

fn reverse(value: &Value) -> Result<Value, FilterError> {
    match value {
        Value::Str(s) => Ok(Value::Str(s.chars().rev().collect())),
        Value::List(items) => Ok(Value::List(items.iter().rev().cloned().collect())),
        other => Err(FilterError::new(format!("cannot reverse a {} value", other.kind()))),
    }
}

fn nth_end(value: &Value, filter: &str, from_end: bool) -> Result<Value, FilterError> {
    match value {
        Value::Str(s) => {
            let c = if from_end {
                s.chars().next_back()
            } else {
                s.chars().next()
            };
            Ok(c.map_or(Value::None, |c| Value::Str(c.to_string())))
        }
        Value::List(items) => {
            let item = if from_end {
                items.last()
            } else {
                items.first()
            };
            Ok(item.cloned().unwrap_or_default())
        }
        other => Err(FilterError::new(format!("{filter} of a {} value is undefined", other.kind()))),
    }
}
