//! Runtime resolution of dotted chains such as `product.id` or `rows.0.name`.

use super::error::RenderError;
use super::value::Value;

/// Resolves the names of a dotted chain against a base value.
///
/// The compiled program calls this for every `a.b.c` expression, passing the
/// value of `a` and the names `["b", "c"]`. Implementations must be pure so
/// that one compiled template can render concurrently.
pub trait DotResolver: Send + Sync {
    fn resolve(&self, value: Value, names: &[String]) -> Result<Value, RenderError>;
}

/// The default resolver.
///
/// The current value's variant decides how a name is read: objects by field,
/// maps by key, lists by decimal index (such as `0`). A miss fails the whole
/// chain with [`RenderError::LookupFailed`]. If a step produces a zero-argument
/// [`Value::Callable`], it is invoked and its result becomes the current
/// value before the next step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralResolver;

impl DotResolver for StructuralResolver {
    fn resolve(&self, mut value: Value, names: &[String]) -> Result<Value, RenderError> {
        for name in names {
            value = lookup(&value, name).ok_or_else(|| RenderError::LookupFailed {
                name: name.clone(),
                kind: value.kind(),
            })?;
            if let Value::Callable(func) = &value {
                value = func();
            }
        }
        Ok(value)
    }
}

/// One step of resolution. Objects only expose fields, maps only keys, lists
/// only indices.
fn lookup(value: &Value, name: &str) -> Option<Value> {
    match value {
        Value::Object(object) => object.get_field(name),
        Value::Map(map) => map.get(name).cloned(),
        Value::List(items) => {
            name.parse::<usize>().ok().and_then(|index| items.get(index).cloned())
        }
        _ => None,
    }
}
