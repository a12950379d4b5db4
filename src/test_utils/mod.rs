//! Test utilities for templite
//!
//! Enabled for unit tests and, through the `test-utils` feature, for the
//! integration test target.

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::templating::{Context, Record, Value};

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging
/// stays off.
///
/// ```rust,no_run
/// templite::test_utils::init_test_logging(Some(tracing::Level::TRACE));
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_ansi(true)
            .try_init();
    });
}

/// A context with a user record, a nested map and a list, for exercising
/// dotted lookups and loops.
#[must_use]
pub fn sample_context() -> Context {
    let user = Record::new("User")
        .with_field("name", "Ada")
        .with_field("admin", true)
        .with_field("langs", vec!["rust", "python"]);

    Context::new()
        .with("user", user)
        .with(
            "site",
            Value::from_json(serde_json::json!({"title": "Notes", "pages": ["home", "about"]})),
        )
        .with("empty", Vec::<Value>::new())
}
