//! rcloud command-line interface

use clap::{Parser, Subcommand};
use reportcloud::cli::{check, output, run};
use std::path::PathBuf;

/// Report expression tool
#[derive(Parser)]
#[command(name = "rcloud")]
#[command(author, version, about = "Run and check report definitions", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, table, pretty)
    #[arg(short = 'f', long, global = true)]
    format: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    /// Skip constant folding
    #[arg(long, global = true)]
    no_fold: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a report definition
    Run {
        /// Report definition (JSON)
        file: PathBuf,

        /// Rows to run over (JSON array); defaults to the definition's rows
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Evaluate every aggregate afresh instead of caching per group
        #[arg(long)]
        no_cache: bool,

        /// Refuse to run a definition with errors
        #[arg(short, long)]
        strict: bool,
    },

    /// Check report definitions
    Check {
        /// Report definitions to check
        files: Vec<PathBuf>,

        /// Strict mode (warnings as errors)
        #[arg(short, long)]
        strict: bool,

        /// Print each column's expressions
        #[arg(long)]
        dump: bool,
    },
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);

    let result = match cli.command {
        Commands::Run {
            file,
            data,
            no_cache,
            strict,
        } => run::run(run::RunConfig {
            file,
            data,
            no_fold: cli.no_fold,
            no_cache,
            strict,
            verbose: cli.verbose,
            output_format: cli.format.clone(),
            output_file: cli.output.clone(),
        }),

        Commands::Check {
            files,
            strict,
            dump,
        } => check::check(check::CheckConfig {
            files,
            strict,
            dump,
            no_fold: cli.no_fold,
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
