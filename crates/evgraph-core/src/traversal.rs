//! Graph traversal ranges and iterators
//!
//! Every range is a depth-first walk that refuses to re-enter a vertex it
//! has already seen, so shared substructure and cycles are visited once.
//! Vertices come out in post-order: a vertex is yielded only after every
//! not-yet-visited neighbour in the requested direction, and the root is
//! always yielded last.

use crate::error::{Error, Result};
use crate::event::Event;
use crate::particle::ParticleId;
use crate::vertex::{Vertex, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::iter::FusedIterator;
use std::str::FromStr;

/// Which neighbours of a vertex a traversal follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IteratorRange {
    /// Incoming edges, one step
    Parents,
    /// Outgoing edges, one step
    Children,
    /// Parents then children
    Family,
    /// Incoming edges, recursively
    Ancestors,
    /// Outgoing edges, recursively
    Descendants,
    /// Either direction, recursively
    #[default]
    Relatives,
}

impl IteratorRange {
    pub const ALL: [IteratorRange; 6] = [
        Self::Parents,
        Self::Children,
        Self::Family,
        Self::Ancestors,
        Self::Descendants,
        Self::Relatives,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Parents => "parents",
            Self::Children => "children",
            Self::Family => "family",
            Self::Ancestors => "ancestors",
            Self::Descendants => "descendants",
            Self::Relatives => "relatives",
        }
    }

    pub fn is_recursive(self) -> bool {
        matches!(self, Self::Ancestors | Self::Descendants | Self::Relatives)
    }

    /// The single-step range followed at each vertex of this range
    pub fn one_step(self) -> Self {
        match self {
            Self::Ancestors => Self::Parents,
            Self::Descendants => Self::Children,
            Self::Relatives => Self::Family,
            other => other,
        }
    }
}

impl FromStr for IteratorRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidRange {
                context: "parse",
                range: s.to_string(),
            })
    }
}

impl std::fmt::Display for IteratorRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Edge iterator
// ─────────────────────────────────────────────────────────────────────────────

/// Particles attached to a single vertex: incoming, outgoing, or incoming
/// then outgoing
#[derive(Debug, Clone)]
pub struct EdgeIter<'e> {
    incoming: &'e [ParticleId],
    outgoing: &'e [ParticleId],
    pos: usize,
}

impl<'e> EdgeIter<'e> {
    fn new(vertex: &'e Vertex, range: IteratorRange) -> Self {
        let none: &[ParticleId] = &[];
        let (incoming, outgoing) = match range.one_step() {
            IteratorRange::Parents => (vertex.particles_in.as_slice(), none),
            IteratorRange::Children => (none, vertex.particles_out.as_slice()),
            _ => (
                vertex.particles_in.as_slice(),
                vertex.particles_out.as_slice(),
            ),
        };
        Self {
            incoming,
            outgoing,
            pos: 0,
        }
    }
}

impl Iterator for EdgeIter<'_> {
    type Item = ParticleId;

    fn next(&mut self) -> Option<ParticleId> {
        let item = if self.pos < self.incoming.len() {
            self.incoming.get(self.pos)
        } else {
            self.outgoing.get(self.pos - self.incoming.len())
        }
        .copied()?;
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.incoming.len() + self.outgoing.len()).saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EdgeIter<'_> {}
impl FusedIterator for EdgeIter<'_> {}

// ─────────────────────────────────────────────────────────────────────────────
// Vertex iterator
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Frame<'e> {
    vertex: u32,
    edges: EdgeIter<'e>,
}

/// Post-order walk over the vertices of a range
///
/// One visited set serves the whole walk, including every nested frame.
/// Cloning the iterator copies the set, so the clone continues
/// independently.
#[derive(Debug, Clone)]
pub struct VertexIter<'e> {
    event: &'e Event,
    range: IteratorRange,
    visited: HashSet<u32>,
    stack: Vec<Frame<'e>>,
    seeds: std::vec::IntoIter<u32>,
}

impl<'e> VertexIter<'e> {
    /// Walk starting from each seed in turn, skipping seeds already reached
    pub(crate) fn new(event: &'e Event, seeds: Vec<u32>, range: IteratorRange) -> Self {
        Self {
            event,
            range,
            visited: HashSet::new(),
            stack: Vec::new(),
            seeds: seeds.into_iter(),
        }
    }

    pub fn range(&self) -> IteratorRange {
        self.range
    }

    fn frame(&self, index: u32) -> Option<Frame<'e>> {
        self.event.vertex_at(index).map(|v| Frame {
            vertex: index,
            edges: EdgeIter::new(v, self.range),
        })
    }

    /// The vertex at the other end of `particle`, seen from `here`
    fn neighbor(&self, here: u32, particle: ParticleId) -> Option<u32> {
        let p = self.event.particle_at(particle.index)?;
        let other = if p.end_vertex.map(|v| v.index) == Some(here) {
            p.production_vertex
        } else {
            p.end_vertex
        };
        other.map(|v| v.index)
    }
}

impl Iterator for VertexIter<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        loop {
            let Some(top) = self.stack.last_mut() else {
                let visited = &self.visited;
                let seed = self.seeds.find(|s| !visited.contains(s))?;
                self.visited.insert(seed);
                if let Some(frame) = self.frame(seed) {
                    self.stack.push(frame);
                }
                continue;
            };

            let here = top.vertex;
            let Some(particle) = top.edges.next() else {
                self.stack.pop();
                return Some(self.event.vertex_handle(here));
            };

            let Some(next) = self.neighbor(here, particle) else {
                continue;
            };
            if !self.visited.insert(next) {
                continue;
            }

            if self.range.is_recursive() {
                if let Some(frame) = self.frame(next) {
                    self.stack.push(frame);
                }
            } else {
                return Some(self.event.vertex_handle(next));
            }
        }
    }
}

impl FusedIterator for VertexIter<'_> {}

// ─────────────────────────────────────────────────────────────────────────────
// Particle iterator
// ─────────────────────────────────────────────────────────────────────────────

/// Particles of every vertex in a vertex range
///
/// Each vertex contributes its incoming particles that have no production
/// vertex, then its outgoing particles, so every particle is reported by
/// exactly one vertex.
#[derive(Debug, Clone)]
pub struct ParticleIter<'e> {
    event: &'e Event,
    vertices: VertexIter<'e>,
    current: Option<(u32, EdgeIter<'e>)>,
}

impl<'e> ParticleIter<'e> {
    fn new(vertices: VertexIter<'e>) -> Self {
        Self {
            event: vertices.event,
            vertices,
            current: None,
        }
    }
}

impl Iterator for ParticleIter<'_> {
    type Item = ParticleId;

    fn next(&mut self) -> Option<ParticleId> {
        loop {
            if let Some((here, edges)) = &mut self.current {
                for id in edges.by_ref() {
                    let Some(p) = self.event.particle_at(id.index) else {
                        continue;
                    };
                    let incoming = p.end_vertex.map(|v| v.index) == Some(*here);
                    if !incoming || p.production_vertex.is_none() {
                        return Some(id);
                    }
                }
            }

            let vertex = self.vertices.next()?;
            self.current = self
                .event
                .vertex_at(vertex.index)
                .map(|v| (vertex.index, EdgeIter::new(v, IteratorRange::Family)));
        }
    }
}

impl FusedIterator for ParticleIter<'_> {}

// ─────────────────────────────────────────────────────────────────────────────
// Range constructors
// ─────────────────────────────────────────────────────────────────────────────

impl Event {
    /// Particles attached to one vertex; only the one-step ranges apply
    pub fn edges(&self, vertex: VertexId, range: IteratorRange) -> Result<EdgeIter<'_>> {
        if range.is_recursive() {
            return Err(Error::InvalidRange {
                context: "edge iterator",
                range: range.to_string(),
            });
        }
        Ok(EdgeIter::new(self.vertex(vertex)?, range))
    }

    /// Vertices of `range` around `root`, root last
    pub fn vertex_range(&self, root: VertexId, range: IteratorRange) -> Result<VertexIter<'_>> {
        self.vertex(root)?;
        Ok(VertexIter::new(self, vec![root.index], range))
    }

    /// Particles attached to the vertices of `range` around `root`
    pub fn particle_range(&self, root: VertexId, range: IteratorRange) -> Result<ParticleIter<'_>> {
        self.vertex_range(root, range).map(ParticleIter::new)
    }

    /// Particle range rooted at the particle's production vertex
    pub fn production_range(
        &self,
        particle: ParticleId,
        range: IteratorRange,
    ) -> Result<ParticleIter<'_>> {
        let root = self
            .particle(particle)?
            .production_vertex
            .ok_or_else(|| Error::NoProductionVertex(particle.to_string()))?;
        self.particle_range(root, range)
    }

    /// Particle range rooted at the particle's end vertex
    pub fn end_range(&self, particle: ParticleId, range: IteratorRange) -> Result<ParticleIter<'_>> {
        let root = self
            .particle(particle)?
            .end_vertex
            .ok_or_else(|| Error::NoEndVertex(particle.to_string()))?;
        self.particle_range(root, range)
    }

    /// Every owned vertex exactly once
    pub fn vertices(&self) -> VertexIter<'_> {
        VertexIter::new(self, self.root_indices(), IteratorRange::Relatives)
    }

    /// Every owned particle exactly once
    pub fn particles(&self) -> ParticleIter<'_> {
        ParticleIter::new(self.vertices())
    }
}
