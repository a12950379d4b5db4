//! Error handling for templite
//!
//! The library surfaces two precise error types from the templating engine,
//! [`SyntaxError`] and [`RenderError`]. This module adds the crate-level
//! [`TempliteError`], which also covers the file, config and argument
//! failures of the command-line tool, and [`ErrorContext`], a user-facing
//! wrapper with details and a suggestion.
//!
//! Common library errors convert automatically:
//! - [`std::io::Error`] → [`TempliteError::Io`]
//! - [`toml::de::Error`] → [`TempliteError::Toml`]
//! - [`serde_json::Error`] → [`TempliteError::Json`]
//!
//! Use [`user_friendly_error`] to turn any `anyhow::Error` into an
//! [`ErrorContext`] for display.
//!
//! ```rust,no_run
//! use templite::core::{TempliteError, user_friendly_error};
//!
//! let err = anyhow::Error::from(TempliteError::InvalidVariable {
//!     spec: "novalue".to_string(),
//! });
//! let ctx = user_friendly_error(err);
//! ctx.display(); // colored error, details and suggestion on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::templating::{ContextError, RenderError, SyntaxError};

/// The main error type for templite operations.
#[derive(Error, Debug)]
pub enum TempliteError {
    /// A template failed to compile; `report` quotes the offending lines.
    #[error("Template syntax error in {template}: {source}")]
    TemplateSyntax {
        template: String,
        report: String,
        #[source]
        source: SyntaxError,
    },

    /// A compiled template failed to render.
    #[error("Failed to render {template}: {source}")]
    TemplateRender {
        template: String,
        #[source]
        source: RenderError,
    },

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Invalid context in {path}: {source}")]
    InvalidContext {
        path: String,
        #[source]
        source: ContextError,
    },

    /// A `--var` argument without `=`.
    #[error("Invalid variable '{spec}': expected KEY=VALUE")]
    InvalidVariable { spec: String },

    #[error("Unsupported context file format: {path}")]
    UnsupportedFormat { path: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An error with optional details and a suggestion, formatted for users.
#[derive(Debug)]
pub struct ErrorContext {
    pub message: String,
    pub details: Option<String>,
    pub suggestion: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            suggestion: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details.trim_end());
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {}", details.trim_end())?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with details and suggestions.
///
/// The error chain is searched for a known error type; the outermost
/// message is kept as the headline.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let headline = error.to_string();

    for cause in error.chain() {
        if let Some(err) = cause.downcast_ref::<TempliteError>() {
            return create_error_context(headline, err);
        }
        if let Some(err) = cause.downcast_ref::<SyntaxError>() {
            return ErrorContext::new(headline).with_details(err.format_with_context(""));
        }
        if let Some(err) = cause.downcast_ref::<RenderError>() {
            return ErrorContext::new(headline).with_details(err.format_with_context());
        }
        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            return io_error_context(headline, io_error);
        }
    }

    ErrorContext::new(headline)
}

fn create_error_context(headline: String, error: &TempliteError) -> ErrorContext {
    match error {
        TempliteError::TemplateSyntax {
            report,
            ..
        } => ErrorContext::new(headline).with_details(report.clone()),
        TempliteError::TemplateRender {
            source,
            ..
        }
        | TempliteError::Render(source) => {
            let ctx = ErrorContext::new(headline).with_details(source.format_with_context());
            match source {
                RenderError::MissingVariable {
                    ..
                } => ctx.with_suggestion(
                    "Pass the value with --var NAME=VALUE or add it to a --context file",
                ),
                _ => ctx,
            }
        }
        TempliteError::Syntax(source) => {
            ErrorContext::new(headline).with_details(source.format_with_context(""))
        }
        TempliteError::InvalidContext {
            ..
        } => ErrorContext::new(headline)
            .with_suggestion("Context files must hold a JSON object or a TOML table at the top level"),
        TempliteError::InvalidVariable {
            ..
        } => ErrorContext::new(headline).with_suggestion("Write variables as --var name=value"),
        TempliteError::UnsupportedFormat {
            ..
        } => ErrorContext::new(headline)
            .with_suggestion("Use a .json or .toml file for template context"),
        TempliteError::Io(io_error) => io_error_context(headline, io_error),
        TempliteError::Toml(_) | TempliteError::Json(_) => ErrorContext::new(headline)
            .with_suggestion("Check the file for syntax errors such as missing quotes or commas"),
        TempliteError::ConfigError {
            ..
        } => ErrorContext::new(headline)
            .with_suggestion("Check templite.toml, or pass --config to use another file"),
    }
}

fn io_error_context(headline: String, error: &std::io::Error) -> ErrorContext {
    match error.kind() {
        std::io::ErrorKind::NotFound => ErrorContext::new(headline)
            .with_suggestion("Check that the file exists and the path is correct"),
        std::io::ErrorKind::PermissionDenied => ErrorContext::new(headline)
            .with_suggestion("Check the file's permissions and ownership"),
        _ => ErrorContext::new(headline),
    }
}
