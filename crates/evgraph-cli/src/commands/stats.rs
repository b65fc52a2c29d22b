//! Stats command

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use super::read_all;
use crate::output::{print_output, TableRow};
use crate::AppContext;

#[derive(Args)]
pub struct StatsArgs {
    /// Event files to summarize
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Totals for one file
#[derive(Debug, Default, Serialize)]
pub struct FileStats {
    pub file: String,
    pub format: String,
    pub events: usize,
    pub failed: usize,
    pub vertices: usize,
    pub particles: usize,
}

impl TableRow for FileStats {
    fn header() -> &'static [&'static str] {
        &["FILE", "FORMAT", "EVENTS", "FAILED", "VERTICES", "PARTICLES"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.file.clone(),
            self.format.clone(),
            self.events.to_string(),
            self.failed.to_string(),
            self.vertices.to_string(),
            self.particles.to_string(),
        ]
    }
}

pub fn run(args: &StatsArgs, ctx: &mut AppContext) -> anyhow::Result<()> {
    let mut rows = Vec::with_capacity(args.files.len());

    for path in &args.files {
        let mut file = ctx.open_input(path)?;
        let mut stats = FileStats {
            file: path.display().to_string(),
            ..FileStats::default()
        };

        read_all(&mut file, |_, result| {
            match result {
                Ok(event) => {
                    stats.events += 1;
                    stats.vertices += event.vertices_size();
                    stats.particles += event.particles_size();
                }
                Err(_) => stats.failed += 1,
            }
            Ok(())
        })?;

        stats.format = file.stream_info().format().to_string();
        tracing::debug!("{}: {} events", stats.file, stats.events);
        rows.push(stats);
    }

    print_output(&rows, ctx.format);
    Ok(())
}
