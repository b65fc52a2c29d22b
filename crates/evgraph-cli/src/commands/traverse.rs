//! Traverse command

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::output::{print_output, TableRow};
use crate::AppContext;
use evgraph_core::{Event, IteratorRange, VertexId};

#[derive(Args)]
pub struct TraverseArgs {
    /// Event file
    pub file: PathBuf,

    /// Event number to look up
    #[arg(short, long, allow_hyphen_values = true)]
    pub event: i32,

    /// Barcode of the vertex the range starts from
    #[arg(long, allow_hyphen_values = true)]
    pub vertex: i32,

    /// Range: parents, children, family, ancestors, descendants, relatives
    #[arg(short, long, default_value_t = IteratorRange::default())]
    pub range: IteratorRange,

    /// List particles instead of vertices
    #[arg(long)]
    pub particles: bool,
}

#[derive(Debug, Serialize)]
pub struct VertexRow {
    pub barcode: i32,
    pub status: i32,
    pub incoming: usize,
    pub outgoing: usize,
}

impl TableRow for VertexRow {
    fn header() -> &'static [&'static str] {
        &["BARCODE", "STATUS", "IN", "OUT"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.barcode.to_string(),
            self.status.to_string(),
            self.incoming.to_string(),
            self.outgoing.to_string(),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct ParticleRow {
    pub barcode: i32,
    pub pdg_id: i32,
    pub status: i32,
    /// Production vertex barcode, 0 if none
    pub production: i32,
    /// End vertex barcode, 0 if none
    pub end: i32,
}

impl TableRow for ParticleRow {
    fn header() -> &'static [&'static str] {
        &["BARCODE", "PDG", "STATUS", "PRODUCTION", "END"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.barcode.to_string(),
            self.pdg_id.to_string(),
            self.status.to_string(),
            self.production.to_string(),
            self.end.to_string(),
        ]
    }
}

pub fn run(args: &TraverseArgs, ctx: &mut AppContext) -> anyhow::Result<()> {
    let event = find_event(args, ctx)?;
    let root = event.barcode_to_vertex(args.vertex).ok_or_else(|| {
        anyhow::anyhow!("Event {} has no vertex {}", args.event, args.vertex)
    })?;

    if args.particles {
        let rows = particle_rows(&event, root, args.range)?;
        print_output(&rows, ctx.format);
    } else {
        let rows = vertex_rows(&event, root, args.range)?;
        print_output(&rows, ctx.format);
    }
    Ok(())
}

fn find_event(args: &TraverseArgs, ctx: &mut AppContext) -> anyhow::Result<Event> {
    let mut file = ctx.open_input(&args.file)?;
    loop {
        match file.read_event() {
            Ok(Some(event)) if event.event_number() == args.event => return Ok(event),
            Ok(Some(_)) => {}
            Ok(None) => anyhow::bail!("No event {} in {}", args.event, args.file.display()),
            Err(e) if e.is_recoverable() => tracing::warn!("Skipping malformed event: {}", e),
            Err(e) => return Err(e.into()),
        }
    }
}

fn vertex_rows(
    event: &Event,
    root: VertexId,
    range: IteratorRange,
) -> anyhow::Result<Vec<VertexRow>> {
    event
        .vertex_range(root, range)?
        .map(|id| -> anyhow::Result<VertexRow> {
            let vertex = event.vertex(id)?;
            Ok(VertexRow {
                barcode: vertex.barcode(),
                status: vertex.status(),
                incoming: vertex.particles_in_size(),
                outgoing: vertex.particles_out_size(),
            })
        })
        .collect()
}

fn particle_rows(
    event: &Event,
    root: VertexId,
    range: IteratorRange,
) -> anyhow::Result<Vec<ParticleRow>> {
    let barcode = |id: Option<VertexId>| -> anyhow::Result<i32> {
        Ok(match id {
            Some(v) => event.vertex(v)?.barcode(),
            None => 0,
        })
    };

    event
        .particle_range(root, range)?
        .map(|id| -> anyhow::Result<ParticleRow> {
            let particle = event.particle(id)?;
            Ok(ParticleRow {
                barcode: particle.barcode(),
                pdg_id: particle.pdg_id(),
                status: particle.status(),
                production: barcode(particle.production_vertex())?,
                end: barcode(particle.end_vertex())?,
            })
        })
        .collect()
}
