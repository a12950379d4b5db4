//! Core types shared across templite.
//!
//! Currently this is the crate-level error type and user-facing error
//! formatting used by the command-line tool.

pub mod error;

pub use error::{ErrorContext, TempliteError, user_friendly_error};
