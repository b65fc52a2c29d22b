//! Forward references collected while reading one event block
//!
//! A particle record names its end vertex by barcode, and that vertex may
//! only appear further down the block. Links are recorded here and made
//! once the whole block has been read.

use crate::error::{CodecError, CodecResult};
use evgraph_core::{Event, ParticleId};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
struct PendingLink {
    particle: ParticleId,
    end_vertex: i32,
}

/// End-vertex references waiting for their vertex, keyed by the particle's
/// barcode so links are made in barcode order
#[derive(Debug, Default)]
pub struct PendingLinks {
    links: BTreeMap<i32, PendingLink>,
}

impl PendingLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the particle with `barcode` ends at `end_vertex`
    pub fn add(&mut self, barcode: i32, particle: ParticleId, end_vertex: i32) {
        self.links.insert(
            barcode,
            PendingLink {
                particle,
                end_vertex,
            },
        );
    }

    /// End-vertex barcode recorded for `particle`, 0 if none
    pub fn end_vertex(&self, particle: ParticleId) -> i32 {
        self.links
            .values()
            .find(|link| link.particle == particle)
            .map_or(0, |link| link.end_vertex)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Link every recorded particle into its end vertex
    ///
    /// Fails on the first barcode that names no vertex of `event`.
    pub fn resolve(self, event: &mut Event) -> CodecResult<usize> {
        let count = self.links.len();
        for link in self.links.into_values() {
            let vertex = event.barcode_to_vertex(link.end_vertex).ok_or(
                CodecError::UnresolvedReference {
                    what: "end vertex",
                    barcode: link.end_vertex,
                },
            )?;
            event.add_particle_in(vertex, link.particle)?;
        }
        Ok(count)
    }
}
