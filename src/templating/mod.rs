//! A small compiled template engine.
//!
//! Template text is compiled once into a [`Templite`]: a tree of instructions
//! that is interpreted on every render. The supported syntax is deliberately
//! small:
//!
//! | Construct                          | Meaning                                         |
//! |------------------------------------|-------------------------------------------------|
//! | `{{ name }}`                       | substitute a variable                           |
//! | `{{ obj.attr.key }}`               | field, map key or list index lookups            |
//! | `{{ value\|filter\|other }}`       | pipe through filter values from the context     |
//! | `{% if expr %}...{% endif %}`      | emit the body when `expr` is truthy             |
//! | `{% for x in expr %}...{% endfor %}` | emit the body once per item                   |
//! | `{# ... #}`                        | comment, produces nothing                       |
//!
//! There is no `else`, no operators, and no way to escape the delimiters.
//!
//! # Contexts
//!
//! Values come from [`Context`]s. Contexts passed to
//! [`Templite::with_contexts`] are merged at compile time; the context passed
//! to [`Templite::render`] is layered on top. Every free variable of the
//! template must be present when rendering starts, even if it is only used
//! inside a branch that is never taken.
//!
//! # Errors
//!
//! Compilation reports a [`SyntaxError`] with the 1-based line of the
//! offending token. Rendering reports a [`RenderError`]; a missing variable
//! comes with close-match suggestions from the names that were available.
//!
//! # Example
//!
//! ```
//! use templite::{Context, Templite, Value};
//!
//! let templite = Templite::new(
//!     "{% for user in users %}{% if user.admin %}{{ user.name }} {% endif %}{% endfor %}",
//! )?;
//!
//! let users = Value::from_json(serde_json::json!([
//!     {"name": "ada", "admin": true},
//!     {"name": "bob", "admin": false},
//! ]));
//! let context = Context::new().with("users", users);
//! assert_eq!(templite.render(Some(&context))?, "ada ");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod compiler;
pub mod context;
pub mod error;
pub mod expr;
pub mod filters;
pub mod program;
pub mod resolver;
pub mod tokenizer;
pub mod value;

pub use compiler::Templite;
pub use context::Context;
pub use error::{
    BlockKind, ContextError, FilterError, RenderError, SyntaxError, SyntaxErrorKind,
};
pub use program::{Expr, Node, Output, Program};
pub use resolver::{DotResolver, StructuralResolver};
pub use value::{Object, Record, Value};
