//! The `render` subcommand.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use super::common::{TemplateSource, load_context_file, parse_vars};
use crate::config::Config;
use crate::core::TempliteError;
use crate::templating::Value;

/// Render a template to stdout or a file.
///
/// The configuration's context and every `--context` file are compile-time
/// contexts, merged in order with later files winning. `--var` values form
/// the render-time context and override all of them.
///
/// ```bash
/// templite render page.html --context site.toml --var title=Home
/// echo 'Hi {{ name|upper }}' | templite render - --var name=ned
/// ```
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Template file, or `-` to read stdin
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// JSON or TOML file of compile-time values (repeatable)
    #[arg(long = "context", value_name = "FILE")]
    pub contexts: Vec<PathBuf>,

    /// Render-time value; parsed as JSON when possible (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Write the output here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let rendered = self.render(config)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, &rendered)
                    .map_err(TempliteError::from)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!("Rendered {} to {}", self.template, path.display());
            }
            None => print!("{rendered}"),
        }
        Ok(())
    }

    /// Produce the rendered text without writing it anywhere.
    pub fn render(&self, config: &Config) -> Result<String> {
        let source = TemplateSource::read(&self.template)?;

        let mut contexts = vec![config.context()];
        for path in &self.contexts {
            contexts.push(load_context_file(path)?);
        }
        let templite = source.compile(&contexts)?;
        let vars = parse_vars(&self.vars)?;

        let filters = templite.program().filter_names();
        for name in templite.free_vars().difference(&filters) {
            let shadowed = !vars.contains_key(name)
                && matches!(templite.context().get(name), Some(Value::Filter(_)));
            if shadowed {
                tracing::warn!("'{}' is used as a variable but is only defined as a filter", name);
            }
        }

        let rendered = templite.render(Some(&vars)).map_err(|source_err| {
            TempliteError::TemplateRender {
                template: source.name.clone(),
                source: source_err,
            }
        })?;
        tracing::debug!("Rendered {} ({} byte(s))", source.name, rendered.len());
        Ok(rendered)
    }
}
