//! Input handling shared by the subcommands: template sources, context files
//! and `--var` arguments.

use std::io::Read;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::core::TempliteError;
use crate::templating::{Context, Templite, Value, expr::is_identifier};

/// Template argument meaning "read from stdin".
pub const STDIN_MARKER: &str = "-";

/// A template's display name and text.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    pub name: String,
    pub text: String,
}

impl TemplateSource {
    /// Read `spec` as a file path, or stdin when it is `-`.
    pub fn read(spec: &str) -> Result<Self> {
        if spec == STDIN_MARKER {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read template from stdin")?;
            return Ok(Self {
                name: "<stdin>".to_string(),
                text,
            });
        }

        let text = std::fs::read_to_string(spec)
            .map_err(TempliteError::from)
            .with_context(|| format!("Failed to read template {spec}"))?;
        Ok(Self {
            name: spec.to_string(),
            text,
        })
    }

    /// Compile with `contexts`, attaching a source excerpt to syntax errors.
    pub fn compile(&self, contexts: &[Context]) -> Result<Templite, TempliteError> {
        Templite::with_contexts(&self.text, contexts).map_err(|source| {
            TempliteError::TemplateSyntax {
                template: self.name.clone(),
                report: source.format_with_context(&self.text),
                source,
            }
        })
    }
}

/// Load a `.json` or `.toml` file whose top level is a mapping.
pub fn load_context_file(path: &Path) -> Result<Context> {
    let shown = path.display().to_string();
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);

    let content = std::fs::read_to_string(path)
        .map_err(TempliteError::from)
        .with_context(|| format!("Failed to read context file {shown}"))?;

    let context = match extension.as_deref() {
        Some("json") => {
            let json: serde_json::Value = serde_json::from_str(&content)
                .map_err(TempliteError::from)
                .with_context(|| format!("Failed to parse {shown}"))?;
            Context::from_json(json).map_err(|source| TempliteError::InvalidContext {
                path: shown.clone(),
                source,
            })?
        }
        Some("toml") => {
            let table: toml::Table = toml::from_str(&content)
                .map_err(TempliteError::from)
                .with_context(|| format!("Failed to parse {shown}"))?;
            Context::from_toml(table)
        }
        _ => {
            return Err(TempliteError::UnsupportedFormat {
                path: shown,
            }
            .into());
        }
    };

    tracing::debug!("Loaded {} value(s) from {}", context.len(), shown);
    Ok(context)
}

/// Parse one `KEY=VALUE` argument.
///
/// The value is read as JSON when it parses (`5`, `true`, `[1, 2]`,
/// `"quoted"`), and kept as a plain string otherwise.
pub fn parse_var(spec: &str) -> Result<(String, Value), TempliteError> {
    let Some((key, raw)) = spec.split_once('=') else {
        return Err(TempliteError::InvalidVariable {
            spec: spec.to_string(),
        });
    };
    if key.is_empty() {
        return Err(TempliteError::InvalidVariable {
            spec: spec.to_string(),
        });
    }
    if !is_identifier(key) {
        tracing::warn!("'{}' is not a valid template name and can never be referenced", key);
    }

    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from_json(json),
        Err(_) => Value::Str(raw.to_string()),
    };
    Ok((key.to_string(), value))
}

/// Collect `--var` arguments into a context; later entries win.
pub fn parse_vars<'a>(specs: impl IntoIterator<Item = &'a String>) -> Result<Context, TempliteError> {
    let mut context = Context::new();
    for spec in specs {
        let (key, value) = parse_var(spec)?;
        context.insert(key, value);
    }
    Ok(context)
}
