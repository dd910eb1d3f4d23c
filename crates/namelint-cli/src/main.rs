//! namelint CLI tool.
//!
//! Usage:
//! ```bash
//! namelint check [OPTIONS] [PATH]
//! namelint check --apply-fixes
//! namelint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Identifier length linter with automated rename fixes
#[derive(Parser)]
#[command(name = "namelint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check identifier lengths
    Check {
        /// Path to analyze: a directory, a Cargo.toml, or a single .rs file
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Rename over-long identifiers in place
        #[arg(long)]
        apply_fixes: bool,

        /// Maximum length for type names
        #[arg(long)]
        max_type: Option<usize>,

        /// Maximum length for method names
        #[arg(long)]
        max_method: Option<usize>,

        /// Maximum length for property names
        #[arg(long)]
        max_property: Option<usize>,

        /// Maximum length for field names
        #[arg(long)]
        max_field: Option<usize>,

        /// Maximum length for local variable names
        #[arg(long)]
        max_variable: Option<usize>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-diagnostic compact format.
    Compact,
}

/// Per-kind limit overrides from the command line.
#[derive(Clone, Copy, Debug, Default)]
pub struct LimitOverrides {
    /// Type name limit.
    pub r#type: Option<usize>,
    /// Method name limit.
    pub method: Option<usize>,
    /// Property name limit.
    pub property: Option<usize>,
    /// Field name limit.
    pub field: Option<usize>,
    /// Local variable name limit.
    pub variable: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            apply_fixes,
            max_type,
            max_method,
            max_property,
            max_field,
            max_variable,
            exclude,
        } => {
            let overrides = LimitOverrides {
                r#type: max_type,
                method: max_method,
                property: max_property,
                field: max_field,
                variable: max_variable,
            };
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            commands::check::run(&path, format, apply_fixes, overrides, exclude, &source)
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
