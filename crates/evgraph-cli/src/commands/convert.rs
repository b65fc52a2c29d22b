//! Convert command

use std::path::PathBuf;

use clap::Args;

use super::read_all;
use crate::AppContext;

#[derive(Args)]
pub struct ConvertArgs {
    /// Input event file (any supported listing format)
    pub input: PathBuf,

    /// Output file
    pub output: PathBuf,

    /// Decimals for real fields (defaults to the configured precision)
    #[arg(long)]
    pub precision: Option<usize>,

    /// Append to the output instead of replacing it
    #[arg(long)]
    pub append: bool,
}

pub fn run(args: &ConvertArgs, ctx: &mut AppContext) -> anyhow::Result<()> {
    if args.input == args.output {
        anyhow::bail!("Input and output must be different files");
    }

    let mut input = ctx.open_input(&args.input)?;
    let mut output = ctx.open_output(&args.output, args.append)?;
    if let Some(precision) = args.precision.or(ctx.config.precision) {
        output.set_precision(precision)?;
    }

    let mut written = 0;
    let mut skipped = 0;
    read_all(&mut input, |position, result| {
        match result {
            Ok(event) => {
                output.write_event(&event)?;
                written += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping event {}: {}", position, e);
                skipped += 1;
            }
        }
        Ok(())
    })?;
    output.finish()?;

    if !ctx.quiet {
        println!(
            "Converted {} events to {} ({} skipped)",
            written,
            args.output.display(),
            skipped
        );
    }
    Ok(())
}
