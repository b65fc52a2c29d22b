//! Check command

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::read_all;
use crate::output::{print_output, OutputFormat, TableRow};
use crate::AppContext;

#[derive(Args)]
pub struct CheckArgs {
    /// Event file to check
    pub file: PathBuf,
}

/// One rejected event
#[derive(Debug, Serialize)]
pub struct Issue {
    /// Position of the event in the file, counting from zero
    pub position: usize,
    pub reason: String,
}

impl TableRow for Issue {
    fn header() -> &'static [&'static str] {
        &["POSITION", "REASON"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.position.to_string(), self.reason.clone()]
    }
}

pub fn run(args: &CheckArgs, ctx: &mut AppContext) -> anyhow::Result<()> {
    let mut file = ctx.open_input(&args.file)?;
    let mut events = 0;
    let mut issues = Vec::new();

    read_all(&mut file, |position, result| {
        events += 1;
        if let Err(e) = result {
            issues.push(Issue {
                position,
                reason: e.to_string(),
            });
        }
        Ok(())
    })?;

    if ctx.format == OutputFormat::Json || !issues.is_empty() {
        print_output(&issues, ctx.format);
    }
    if !ctx.quiet && ctx.format == OutputFormat::Table {
        println!(
            "{}: {} events, {} malformed",
            args.file.display(),
            events,
            issues.len()
        );
    }

    if !issues.is_empty() {
        anyhow::bail!("{} of {} events are malformed", issues.len(), events);
    }
    Ok(())
}
