//! Name-to-value mappings supplied to templates.
//!
//! A template sees the merge of every compile-time context passed to
//! [`Templite::with_contexts`](super::Templite::with_contexts), in order,
//! with the render-time context layered on top. On a key collision the later
//! mapping wins.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::ContextError;
use super::value::Value;

/// An ordered mapping from names to [`Value`]s.
///
/// ```
/// use templite::{Context, Value};
///
/// let mut context = Context::new();
/// context.insert("name", "Ned");
/// context.insert("topics", vec!["Python", "Geometry"]);
/// assert_eq!(context.get("name"), Some(&Value::from("Ned")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    vars: BTreeMap<String, Value>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.vars.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Layer `other` on top of `self`; entries of `other` win.
    pub fn extend(&mut self, other: &Context) {
        for (name, value) in &other.vars {
            self.vars.insert(name.clone(), value.clone());
        }
    }

    /// Merge several contexts left to right.
    pub fn merged<'a>(contexts: impl IntoIterator<Item = &'a Context>) -> Self {
        let mut merged = Context::new();
        for context in contexts {
            merged.extend(context);
        }
        merged
    }

    /// Build a context from a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ContextError> {
        match Value::from_json(json) {
            Value::Map(vars) => Ok(Self {
                vars,
            }),
            other => Err(ContextError::NotAMapping {
                found: other.kind(),
            }),
        }
    }

    /// Build a context from a TOML table.
    #[must_use]
    pub fn from_toml(table: toml::Table) -> Self {
        Self {
            vars: table.into_iter().map(|(k, v)| (k, Value::from_toml(v))).collect(),
        }
    }

    /// Build a context from any serializable struct or map.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self, ContextError> {
        Self::from_json(serde_json::to_value(data)?)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for Context {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}
