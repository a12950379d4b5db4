//! Configuration for the `templite` command-line tool.
//!
//! Configuration is a single TOML file:
//!
//! ```toml
//! # Register the built-in filters (upper, lower, trim, ...). Defaults to true.
//! builtin_filters = true
//!
//! # Default compile-time values, available to every template.
//! [context]
//! site = "example.org"
//! authors = ["ada", "bob"]
//! ```
//!
//! # Lookup Order
//!
//! 1. The path given with `--config`
//! 2. `templite.toml` in the current directory
//! 3. `templite/config.toml` in the platform config directory
//!    (`~/.config` on Linux, `~/Library/Application Support` on macOS,
//!    `%APPDATA%` on Windows)
//!
//! The first file found is used; files are not merged. When no file exists
//! the defaults apply.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::core::TempliteError;
use crate::templating::{Context, filters};

/// File name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "templite.toml";

/// Settings loaded from `templite.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether [`filters::builtins`] are part of every compile-time context.
    pub builtin_filters: bool,

    /// Default compile-time values.
    pub context: toml::Table,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            builtin_filters: true,
            context: toml::Table::new(),
        }
    }
}

impl Config {
    /// Load from `explicit` if given, otherwise from the first file found in
    /// `cwd` or the user config directory.
    ///
    /// # Arguments
    ///
    /// * `explicit` - A `--config` path; it must exist and disables discovery
    /// * `cwd` - Directory searched for [`PROJECT_CONFIG_FILE`]
    ///
    /// # Errors
    ///
    /// Returns [`TempliteError::ConfigError`] when `explicit` does not exist,
    /// and an error when the chosen file cannot be read or is not valid
    /// configuration TOML. Finding no file at all is not an error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use templite::config::Config;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// // templite.toml in the working directory, the user config, or defaults
    /// let config = Config::load(None, Path::new("."))?;
    /// println!("builtin filters: {}", config.builtin_filters);
    ///
    /// // Exactly this file, as with `--config`
    /// let config = Config::load(Some(Path::new("site/templite.toml")), Path::new("."))?;
    /// let context = config.context();
    /// # let _ = context;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(TempliteError::ConfigError {
                    message: format!("config file not found: {}", path.display()),
                }
                .into());
            }
            return Self::load_from(path);
        }

        match Self::discover(cwd) {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse one configuration file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .map_err(TempliteError::from)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        tracing::debug!(
            "Loaded config from {} ({} context value(s), builtin filters {})",
            path.display(),
            config.context.len(),
            if config.builtin_filters {
                "on"
            } else {
                "off"
            }
        );
        Ok(config)
    }

    /// The first existing configuration file for `cwd`, if any.
    #[must_use]
    pub fn discover(cwd: &Path) -> Option<PathBuf> {
        let local = cwd.join(PROJECT_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        Self::default_path().filter(|path| path.is_file())
    }

    /// `templite/config.toml` under the platform config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        match dirs::config_dir() {
            Some(dir) => Some(dir.join("templite").join("config.toml")),
            None => {
                tracing::warn!("Unable to determine the user config directory");
                None
            }
        }
    }

    /// The compile-time context this configuration contributes: the builtin
    /// filters (when enabled) overlaid by the `[context]` table.
    #[must_use]
    pub fn context(&self) -> Context {
        let mut context = if self.builtin_filters {
            filters::builtins()
        } else {
            Context::new()
        };
        context.extend(&Context::from_toml(self.context.clone()));
        context
    }
}
