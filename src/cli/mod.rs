//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod catalog;
mod render;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::config::loader::{load_config, merge_cli_overrides, CliOverrides};
use crate::config::QuestcardConfig;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Questcard - build item catalogs from game XML and draw quest infographics
#[derive(Parser)]
#[command(name = "questcard")]
#[command(about = "Questcard - build item catalogs from game XML and draw quest infographics")]
#[command(version)]
pub struct Cli {
    /// Path to questcard.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log decisions to stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse object XML into the master catalog
    Catalog {
        /// XML files or directories of XML files, merged in the order given
        /// (directory contents in file-name order). Defaults to paths.xml
        inputs: Vec<PathBuf>,

        /// Master catalog output (default: paths.catalog)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write one <stem>.json per document into this directory
        #[arg(long, value_name = "DIR")]
        per_document: Option<PathBuf>,

        /// Skip documents that fail to parse instead of aborting
        #[arg(long)]
        keep_going: bool,
    },

    /// List the sprite sheets the catalog needs, one per line
    Sheets {
        /// Catalog JSON (default: paths.catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Render a single item icon to PNG
    Icon {
        /// Item name as it appears in the catalog
        item: String,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Catalog JSON (default: paths.catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Sprite pixel scale factor (overrides render.upscale)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=64))]
        upscale: Option<u32>,
    },

    /// Render quest infographics from a JSON file of quest entries
    Render {
        /// JSON array of quests ({"Input", "Output", "Title", "Icon", "Chooseable"})
        input: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Catalog JSON (default: paths.catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Sprite pixel scale factor (overrides render.upscale)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=64))]
        upscale: Option<u32>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // a second initialization (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load questcard.toml and apply command-line overrides, reporting failures.
pub(crate) fn resolve_config(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<QuestcardConfig, ExitCode> {
    let config = load_config(path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })?;
    merge_cli_overrides(config, overrides).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Catalog {
            inputs,
            output,
            per_document,
            keep_going,
        } => catalog::run_catalog(
            config_path,
            &inputs,
            output.as_deref(),
            per_document.as_deref(),
            keep_going,
        ),
        Commands::Sheets { catalog } => catalog::run_sheets(config_path, catalog),
        Commands::Icon { item, output, catalog, upscale } => {
            render::run_icon(config_path, &item, &output, CliOverrides { upscale, catalog })
        }
        Commands::Render { input, output, catalog, upscale } => {
            render::run_render(config_path, &input, &output, CliOverrides { upscale, catalog })
        }
    }
}
