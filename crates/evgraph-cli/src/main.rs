//! Evgraph CLI - Command line interface for event files

use std::path::Path;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{check, completions, config as config_cmd, convert, stats, traverse};
use config::Config;
use evgraph_io::{GenEventFile, OpenMode, StreamIds};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "evgraph")]
#[command(author, version, about = "Inspect and convert particle-physics event files")]
pub struct Cli {
    /// Output format: table, json (defaults to the configured format)
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count events, vertices and particles
    Stats(stats::StatsArgs),
    /// Read every event and report the malformed ones
    Check(check::CheckArgs),
    /// Re-encode an event file in the current format
    Convert(convert::ConvertArgs),
    /// List the vertices or particles of a traversal range
    Traverse(traverse::TraverseArgs),
    /// Manage configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context shared by the commands
pub struct AppContext {
    pub config: Config,
    pub format: OutputFormat,
    pub quiet: bool,
    ids: StreamIds,
}

impl AppContext {
    pub fn new(cli: &Cli) -> Self {
        let config = Config::load();
        let format = cli
            .format
            .as_deref()
            .or(config.format.as_deref())
            .map(OutputFormat::from)
            .unwrap_or(OutputFormat::Table);

        Self {
            config,
            format,
            quiet: cli.quiet,
            ids: StreamIds::new(),
        }
    }

    /// Open an event file for reading, with the configured input units
    pub fn open_input(&mut self, path: &Path) -> anyhow::Result<GenEventFile> {
        let mut file = GenEventFile::open_read(path, &mut self.ids)
            .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.display(), e))?;
        let (momentum, length) = self.config.input_units();
        file.use_input_units(momentum, length);
        Ok(file)
    }

    /// Open an event file for writing
    pub fn open_output(&mut self, path: &Path, append: bool) -> anyhow::Result<GenEventFile> {
        let mode = if append {
            OpenMode::OUT | OpenMode::APP
        } else {
            OpenMode::OUT | OpenMode::TRUNC
        };
        GenEventFile::open(path, mode, &mut self.ids)
            .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.display(), e))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting evgraph CLI");

    let mut ctx = AppContext::new(&cli);

    match &cli.command {
        Commands::Stats(args) => stats::run(args, &mut ctx)?,
        Commands::Check(args) => check::run(args, &mut ctx)?,
        Commands::Convert(args) => convert::run(args, &mut ctx)?,
        Commands::Traverse(args) => traverse::run(args, &mut ctx)?,
        Commands::Config(args) => config_cmd::run(args, &ctx)?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
