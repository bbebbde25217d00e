//! Check command implementation

use super::output;
use crate::definition::ReportDefinition;
use crate::report::Report;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// Configuration for check command
pub struct CheckConfig {
    pub files: Vec<PathBuf>,
    /// Warnings fail the check too
    pub strict: bool,
    /// Print each column's expressions after folding
    pub dump: bool,
    pub no_fold: bool,
}

/// Compile definitions and report their diagnostics
pub fn check(config: CheckConfig) -> Result<()> {
    if config.files.is_empty() {
        anyhow::bail!("No files specified for checking");
    }

    let mut failed = 0;
    for file in &config.files {
        let definition = ReportDefinition::from_path(file)
            .with_context(|| format!("Failed to load report definition: {}", file.display()))?;
        let mut options = definition.options;
        if config.no_fold {
            options = options.with_constant_folding(false);
        }
        let report = Report::compile_with(definition, options);

        output::print_diagnostics(report.log());
        if config.dump {
            let tree = report.engine().tree();
            for column in report.columns() {
                println!("{} {}", column.name().cyan(), tree.dump(column.value()));
                if let Some(footer) = column.footer() {
                    println!("  footer {}", tree.dump(footer));
                }
                if let Some(visibility) = column.visibility() {
                    println!("  hidden {}", tree.dump(visibility.hidden()));
                }
            }
        }

        let log = report.log();
        if log.has_errors() || (config.strict && !log.is_empty()) {
            failed += 1;
            eprintln!("{} {}", "Failed:".red().bold(), file.display());
        } else if log.is_empty() {
            eprintln!("{}", output::format_success(&file.display().to_string()));
        } else {
            eprintln!(
                "{}",
                output::format_warning(&format!("{} ({} diagnostics)", file.display(), log.len()))
            );
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} definitions failed", failed, config.files.len());
    }
    Ok(())
}
