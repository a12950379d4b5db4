//! Command-line interface for templite.
//!
//! # Commands
//!
//! - `render` - Render a template with context files and `--var` values
//! - `check` - Compile a template and list the names it references
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Debug logging on stderr
//! - `--quiet` / `-q` - No logging at all
//! - `--config` / `-c` - Use this configuration file instead of the
//!   lookup described in [`crate::config`]
//!
//! ```bash
//! templite render page.html --context site.json --var title=Home -o page.out
//! templite --verbose check page.html --format json
//! ```

pub mod check;
pub mod common;
pub mod render;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Runtime settings derived from the global flags.
///
/// Kept separate from [`Cli`] so tests and embedders can run commands with
/// explicit settings.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging.
    pub log_level: Option<String>,

    /// Configuration file that bypasses discovery.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the default level but not over
    /// `--verbose`. Calling this more than once is harmless.
    pub fn init_logging(&self, verbose: bool) {
        let Some(level) = &self.log_level else {
            return;
        };

        let filter = match std::env::var("RUST_LOG") {
            Ok(directive) if !verbose && !directive.is_empty() => EnvFilter::new(directive),
            _ => EnvFilter::new(level),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Top-level command-line parser.
#[derive(Parser, Debug)]
#[command(
    name = "templite",
    about = "Render small text templates",
    version,
    long_about = "templite compiles templates with {{ variables }}, {% if %} and {% for %} blocks \
                  and renders them with values from JSON/TOML files and the command line."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template
    Render(render::RenderCommand),

    /// Compile a template and report the names it uses
    Check(check::CheckCommand),
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging(self.verbose);
        self.execute_with_config(config)
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    pub fn execute_with_config(self, cli_config: CliConfig) -> Result<()> {
        let cwd = std::env::current_dir().context("Failed to determine the current directory")?;
        let config = Config::load(cli_config.config_path.as_deref(), &cwd)?;

        match self.command {
            Commands::Render(cmd) => cmd.execute(&config),
            Commands::Check(cmd) => cmd.execute(&config),
        }
    }
}
