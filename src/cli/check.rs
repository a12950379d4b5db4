//! The `check` subcommand: compile a template and report what it needs.

use std::collections::BTreeSet;

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use super::common::TemplateSource;
use crate::config::Config;
use crate::templating::{Templite, Value};

/// Output format for the check report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Compile a template without rendering it.
///
/// Syntax errors are reported with the offending lines. On success, prints
/// the template's free variables, loop variables and filters, and which free
/// names the configuration does not provide.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Template file, or `-` to read stdin
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// What a compiled template references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub template: String,
    /// Free names that are not filters.
    pub variables: BTreeSet<String>,
    pub loop_variables: BTreeSet<String>,
    pub filters: BTreeSet<String>,
    /// Free names the compile-time context leaves unset, plus plain
    /// variables whose only value so far is a filter (such as `title` from
    /// the built-in filters), which would render as `<filter>`.
    pub unresolved: BTreeSet<String>,
}

impl CheckReport {
    #[must_use]
    pub fn new(template: impl Into<String>, templite: &Templite) -> Self {
        let filters = templite.program().filter_names();
        let free = templite.free_vars();
        let unresolved = free
            .iter()
            .filter(|name| match templite.context().get(name) {
                None => true,
                Some(Value::Filter(_)) => !filters.contains(*name),
                Some(_) => false,
            })
            .cloned()
            .collect();
        Self {
            template: template.into(),
            variables: free.difference(&filters).cloned().collect(),
            loop_variables: templite.loop_vars().clone(),
            filters,
            unresolved,
        }
    }

    fn print_text(&self) {
        println!("{} {}", "✓".green(), self.template);
        print_names("variables", &self.variables);
        print_names("loop variables", &self.loop_variables);
        print_names("filters", &self.filters);
        if !self.unresolved.is_empty() {
            print_names("unresolved", &self.unresolved);
        }
    }
}

fn print_names(label: &str, names: &BTreeSet<String>) {
    let joined = if names.is_empty() {
        "-".dimmed().to_string()
    } else {
        names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    };
    println!("  {:<15} {}", format!("{label}:"), joined);
}

impl CheckCommand {
    pub fn execute(self, config: &Config) -> Result<()> {
        let source = TemplateSource::read(&self.template)?;
        let templite = source.compile(&[config.context()])?;
        let report = CheckReport::new(source.name, &templite);

        match self.format {
            OutputFormat::Text => report.print_text(),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }
        Ok(())
    }
}
