//! Runtime values flowing through compiled templates.
//!
//! Lookup in templates is structural: a dotted step asks a value for a named
//! field, a key, or an index, and never checks a declared type. [`Value`] is
//! the closed set of shapes a template can see:
//!
//! - scalars (`None`, `Bool`, `Int`, `Float`, `Str`)
//! - containers (`List`, `Map`)
//! - record-like values exposing named fields ([`Object`], e.g. [`Record`])
//! - callables: one-argument [`Value::Filter`]s used in `a|f` pipelines, and
//!   zero-argument [`Value::Callable`]s that the dot-resolver invokes
//!   automatically
//!
//! Callables are stored behind `Arc<dyn Fn .. + Send + Sync>`, so a `Value`
//! (and every compiled template holding values) can be shared across threads.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use super::error::FilterError;

/// Signature of a one-argument template filter.
pub type FilterFn = dyn Fn(&Value) -> Result<Value, FilterError> + Send + Sync;

/// Signature of a zero-argument callable, invoked when reached by a dotted step.
pub type CallableFn = dyn Fn() -> Value + Send + Sync;

/// A record-like value exposing named fields to dotted access.
///
/// Dotted access on an object only consults [`Object::get_field`]; objects
/// have no keys or indices. Returning `None` makes the step fail with
/// [`RenderError::LookupFailed`](super::error::RenderError::LookupFailed).
pub trait Object: fmt::Debug + Send + Sync {
    /// Name shown in error messages and in the value's string form.
    fn type_name(&self) -> &str;

    /// Look up a field by name.
    fn get_field(&self, name: &str) -> Option<Value>;
}

/// A dynamically built [`Object`]: a type name plus named fields.
///
/// ```
/// use templite::{Record, Value};
///
/// let product = Record::new("Product").with_field("id", 7).with_field("name", "lamp");
/// let value = Value::object(product);
/// assert_eq!(value.kind(), "object");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record {
    type_name: String,
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }
}

impl Object for Record {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn get_field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}

/// A value visible to templates.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(Arc<dyn Object>),
    Filter(Arc<FilterFn>),
    Callable(Arc<CallableFn>),
}

impl Value {
    /// Wrap a one-argument function as a filter.
    pub fn filter<F>(func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, FilterError> + Send + Sync + 'static,
    {
        Value::Filter(Arc::new(func))
    }

    /// Wrap a zero-argument function; dotted access calls it on arrival.
    pub fn callable<F>(func: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Value::Callable(Arc::new(func))
    }

    pub fn object<O: Object + 'static>(object: O) -> Self {
        Value::Object(Arc::new(object))
    }

    /// Convert a JSON document. Integers that fit `i64` stay integers.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from_json(v))).collect())
            }
        }
    }

    /// Convert a TOML value. Datetimes become their string form.
    pub fn from_toml(toml: toml::Value) -> Self {
        match toml {
            toml::Value::String(s) => Value::Str(s),
            toml::Value::Integer(i) => Value::Int(i),
            toml::Value::Float(f) => Value::Float(f),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::Str(dt.to_string()),
            toml::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_toml).collect())
            }
            toml::Value::Table(table) => {
                Value::Map(table.into_iter().map(|(k, v)| (k, Value::from_toml(v))).collect())
            }
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Filter(_) => "filter",
            Value::Callable(_) => "callable",
        }
    }

    /// Truthiness used by `{% if %}`.
    ///
    /// `None`, `false`, zero, and empty strings, lists and maps are falsy.
    /// Objects and callables are always truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::Object(_) | Value::Filter(_) | Value::Callable(_) => true,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements a `{% for %}` loop visits: list items, map keys (in key
    /// order), or the characters of a string.
    pub(crate) fn iter_items(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.clone()),
            Value::Map(map) => Some(map.keys().cloned().map(Value::Str).collect()),
            Value::Str(s) => Some(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            _ => None,
        }
    }

    /// Representation used inside containers: strings are quoted.
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s:?}"),
            Value::None => f.write_str("none"),
            other => fmt::Display::fmt(other, f),
        }
    }
}

/// String conversion applied to every `{{ expr }}` result.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            // Integral floats keep a fractional digit so `1.0` stays distinct from `1`.
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: ")?;
                    value.fmt_nested(f)?;
                }
                f.write_str("}")
            }
            Value::Object(obj) => write!(f, "<{}>", obj.type_name()),
            Value::Filter(_) => f.write_str("<filter>"),
            Value::Callable(_) => f.write_str("<callable>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Value::Object(obj) => f.debug_tuple("Object").field(obj).finish(),
            Value::Filter(_) => f.write_str("Filter(..)"),
            Value::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

/// Structural equality; callables compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Filter(a), Value::Filter(b)) => Arc::ptr_eq(a, b),
            (Value::Callable(a), Value::Callable(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        i64::try_from(i).map_or(Value::Float(i as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(map: HashMap<String, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::object(record)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from_json(json)
    }
}
