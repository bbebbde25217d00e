//! Output formatting utilities

use crate::report::ReportOutput;
use anyhow::{Context, Result};
use colored::Colorize;
use reportcloud_diagnostics::ReportLog;
use serde_json::Value;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    JsonPretty,
    Table,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "table" => Self::Table,
            _ => Self::JsonPretty,
        }
    }
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(io::stdout().is_terminal()),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Print every diagnostic of a compiled definition to stderr
pub fn print_diagnostics(log: &ReportLog) {
    for diagnostic in log.diagnostics() {
        eprintln!("{}", diagnostic.to_colored_string());
    }
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Format JSON value for output
pub fn format_json(value: &Value, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}

/// Render a report run as one table per group
pub fn format_as_table(output: &ReportOutput) -> String {
    let mut sections = Vec::with_capacity(output.groups.len());
    for (index, group) in output.groups.iter().enumerate() {
        let mut builder = Builder::default();
        builder.push_record(group.columns.iter().map(|c| c.name.clone()));
        for row in &group.rows {
            builder.push_record(group.columns.iter().map(|c| format_value(row.get(&c.name))));
        }
        if !group.footer.is_empty() {
            builder.push_record(group.columns.iter().map(|c| format_value(group.footer.get(&c.name))));
        }
        let mut table = builder.build();
        table.with(Style::modern());
        sections.push(format!("{} {}\n{}", "Group".bold(), index + 1, table));
    }
    if sections.is_empty() {
        return "(no groups)".to_string();
    }
    sections.join("\n\n")
}

/// Format a simple value for display
fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Print a report run in the specified format
pub fn print_report(output: &ReportOutput, format: OutputFormat, output_file: Option<&Path>) -> Result<()> {
    let content = match format {
        OutputFormat::Table => format_as_table(output),
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let value = serde_json::to_value(output).context("Failed to serialize report output")?;
            format_json(&value, format == OutputFormat::JsonPretty)?
        }
    };
    write_output(&content, output_file)
}
