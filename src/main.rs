//! Bundle Treemap CLI
//!
//! Generates size reports and treemap chart data from bundler stats files.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use bundle_treemap::commands::{
    display_version, execute_analyze, validate_args, validate_report_file, AnalyzeArgs, ReportMode,
};

/// Bundle Treemap - what's inside your JavaScript bundles
#[derive(Parser, Debug)]
#[command(name = "bundle-treemap")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a stats file and write a report
    Analyze {
        /// Stats JSON file produced by the bundler
        stats_file: PathBuf,

        /// Directory containing the emitted bundles (defaults to the stats file's directory)
        bundle_dir: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = ReportMode::Json)]
        mode: ReportMode,

        /// Report output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Title of the static report
        #[arg(long)]
        title: Option<String>,

        /// Leave out emitted files matching this regex (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Print a per-bundle size summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a JSON report file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            stats_file,
            bundle_dir,
            mode,
            output,
            title,
            exclude,
            summary,
        } => {
            let args = AnalyzeArgs {
                stats_file,
                bundle_dir,
                mode,
                output,
                title,
                exclude,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(&file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
