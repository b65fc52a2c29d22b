//! Config command: inspect and edit the settings file

use clap::{Args, Subcommand};

use crate::config::{config_file_path, Config, Setting};
use crate::output::{print_output, TableRow};
use crate::AppContext;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the value in effect for a key
    Get {
        /// precision, momentum_unit, length_unit or format
        key: String,
    },
    /// Store a value
    Set {
        key: String,
        value: String,
    },
    /// Show every key with its effective value and where it comes from
    List,
    /// Show config file path
    Path,
    /// Write a config file holding every default
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

impl TableRow for Setting {
    fn header() -> &'static [&'static str] {
        &["KEY", "VALUE", "SOURCE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.key.clone(),
            self.value.clone(),
            self.source.to_string(),
        ]
    }
}

pub fn run(args: &ConfigArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => {
            let setting = ctx.config.effective(key).ok_or_else(|| unknown_key(key))?;
            println!("{}", setting.value);
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load();
            config.set(key, value)?;
            config.save()?;
            if !ctx.quiet {
                println!("{} = {}", key, value);
            }
        }
        ConfigCommands::List => {
            tracing::debug!("Listing settings from {}", config_file_path().display());
            print_output(&ctx.config.settings(), ctx.format);
        }
        ConfigCommands::Path => println!("{}", config_file_path().display()),
        ConfigCommands::Init { force } => init(*force, ctx)?,
    }
    Ok(())
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown config key: {} (available: {})",
        key,
        Config::keys().join(", ")
    )
}

fn init(force: bool, ctx: &AppContext) -> anyhow::Result<()> {
    let path = config_file_path();
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        );
    }
    Config::default().with_defaults().save()?;
    if !ctx.quiet {
        println!("Wrote defaults to {}", path.display());
    }
    Ok(())
}
