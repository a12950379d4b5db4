//! templite - a small compiled template engine
//!
//! Templates are compiled once into an instruction tree and rendered any
//! number of times against a [`Context`]:
//!
//! ```
//! use templite::{Context, Templite, filters};
//!
//! let templite = Templite::with_contexts(
//!     "Hello {{ name|title }}{% for t in topics %}, {{ t }}{% endfor %}",
//!     [filters::builtins()],
//! )?;
//! let context = Context::new().with("name", "ned").with("topics", vec!["a", "b"]);
//! assert_eq!(templite.render(Some(&context))?, "Hello Ned, a, b");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! - [`templating`] - Tokenizer, compiler, values and the render-time evaluator
//! - [`core`] - Crate-level error type and user-facing error formatting
//! - [`config`] - `templite.toml` loading for the command-line tool
//! - [`cli`] - The `templite` command-line interface

pub mod cli;
pub mod config;
pub mod core;
pub mod templating;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use templating::{
    Context, ContextError, DotResolver, FilterError, Object, Record, RenderError,
    StructuralResolver, SyntaxError, SyntaxErrorKind, Templite, Value, filters,
};
