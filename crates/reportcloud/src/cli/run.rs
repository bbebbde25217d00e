//! Run command implementation

use super::output::{self, OutputFormat};
use crate::definition::ReportDefinition;
use crate::report::Report;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Configuration for run command
pub struct RunConfig {
    pub file: PathBuf,
    /// Rows file (JSON array); the definition's own rows when absent
    pub data: Option<PathBuf>,
    pub no_fold: bool,
    pub no_cache: bool,
    pub strict: bool,
    pub verbose: bool,
    pub output_format: Option<String>,
    pub output_file: Option<PathBuf>,
}

/// Compile a definition and run it
pub fn run(config: RunConfig) -> Result<()> {
    let definition = ReportDefinition::from_path(&config.file)
        .with_context(|| format!("Failed to load report definition: {}", config.file.display()))?;

    let mut options = definition.options;
    if config.no_fold {
        options = options.with_constant_folding(false);
    }
    if config.no_cache {
        options = options.with_cache_aggregates(false);
    }
    if config.verbose {
        eprintln!(
            "Compiling '{}' (constant folding: {}, aggregate cache: {})",
            definition.name, options.constant_folding, options.cache_aggregates
        );
    }

    let report = Report::compile_with(definition, options);
    output::print_diagnostics(report.log());
    if config.strict && report.log().has_errors() {
        anyhow::bail!("Report definition has {} diagnostics", report.log().len());
    }

    let result = match &config.data {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read data file: {}", path.display()))?;
            let rows: Vec<Value> = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse data file: {}", path.display()))?;
            if config.verbose {
                eprintln!("Loaded {} rows from {}", rows.len(), path.display());
            }
            report.run_rows(&rows)?
        }
        None => report.run_embedded()?,
    };

    if config.verbose {
        let stats = result.stats;
        eprintln!(
            "Cache: {} hits, {} misses, {} stores, {} invalidations",
            stats.hits, stats.misses, stats.stores, stats.invalidations
        );
    }

    let format = config
        .output_format
        .as_deref()
        .map_or(OutputFormat::JsonPretty, OutputFormat::parse);
    output::print_report(&result, format, config.output_file.as_deref())
}
