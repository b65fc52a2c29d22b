//! Event container: owns every vertex and particle of one collision graph
//!
//! Vertices and particles live in slot tables owned by the event and refer
//! to each other through [`VertexId`] / [`ParticleId`] handles. All link
//! mutation goes through `Event` so that list membership and
//! back-references always change together.

use crate::error::{Error, Result};
use crate::particle::{Particle, ParticleId};
use crate::traversal::{IteratorRange, VertexIter};
use crate::units::{LengthUnit, MomentumUnit};
use crate::value::{CrossSection, HeavyIon, PdfInfo, WeightContainer};
use crate::vertex::{Vertex, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lowest barcode handed out automatically to a particle
pub const FIRST_AUTO_PARTICLE_BARCODE: i32 = 10001;

static NEXT_EVENT_KEY: AtomicU64 = AtomicU64::new(1);

/// Identity of the event that issued a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct EventKey(u64);

impl EventKey {
    fn fresh() -> Self {
        Self(NEXT_EVENT_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

/// Scalar event header data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInfo {
    pub event_number: i32,

    /// Number of multi-parton interactions, -1 if unknown
    pub mpi: i32,

    pub event_scale: f64,
    pub alpha_qcd: f64,
    pub alpha_qed: f64,
    pub signal_process_id: i32,

    /// Random generator state at the start of the event
    #[serde(default)]
    pub random_states: Vec<i64>,

    #[serde(default)]
    pub weights: WeightContainer,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_section: Option<CrossSection>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub heavy_ion: Option<HeavyIon>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_info: Option<PdfInfo>,
}

impl Default for EventInfo {
    fn default() -> Self {
        Self {
            event_number: 0,
            mpi: -1,
            event_scale: -1.0,
            alpha_qcd: -1.0,
            alpha_qed: -1.0,
            signal_process_id: 0,
            random_states: Vec::new(),
            weights: WeightContainer::default(),
            cross_section: None,
            heavy_ion: None,
            pdf_info: None,
        }
    }
}

/// One simulated collision: the owner of its vertex/particle graph
#[derive(Debug)]
pub struct Event {
    key: EventKey,
    info: EventInfo,
    momentum_unit: MomentumUnit,
    length_unit: LengthUnit,

    vertices: Vec<Option<Vertex>>,
    particles: Vec<Option<Particle>>,

    /// Vertices the event holds directly; whole-event ranges start here
    roots: Vec<u32>,
    root_set: HashSet<u32>,

    vertex_barcodes: BTreeMap<i32, u32>,
    particle_barcodes: BTreeMap<i32, u32>,

    signal_process_vertex: Option<VertexId>,
    beam_particles: Option<(ParticleId, ParticleId)>,
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

impl Event {
    /// Create an empty event in the default units
    pub fn new() -> Self {
        Self::with_units(MomentumUnit::default(), LengthUnit::default())
    }

    pub fn with_units(momentum_unit: MomentumUnit, length_unit: LengthUnit) -> Self {
        Self {
            key: EventKey::fresh(),
            info: EventInfo::default(),
            momentum_unit,
            length_unit,
            vertices: Vec::new(),
            particles: Vec::new(),
            roots: Vec::new(),
            root_set: HashSet::new(),
            vertex_barcodes: BTreeMap::new(),
            particle_barcodes: BTreeMap::new(),
            signal_process_vertex: None,
            beam_particles: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Header
    // ─────────────────────────────────────────────────────────────────────────

    pub fn info(&self) -> &EventInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut EventInfo {
        &mut self.info
    }

    pub fn event_number(&self) -> i32 {
        self.info.event_number
    }

    pub fn momentum_unit(&self) -> MomentumUnit {
        self.momentum_unit
    }

    pub fn length_unit(&self) -> LengthUnit {
        self.length_unit
    }

    /// Change units, rescaling every momentum, generated mass and position
    pub fn use_units(&mut self, momentum_unit: MomentumUnit, length_unit: LengthUnit) {
        let momentum_factor = self.momentum_unit.conversion_factor(momentum_unit);
        let length_factor = self.length_unit.conversion_factor(length_unit);

        if momentum_factor != 1.0 {
            for particle in self.particles.iter_mut().flatten() {
                particle.convert_momentum(momentum_factor);
            }
        }
        if length_factor != 1.0 {
            for vertex in self.vertices.iter_mut().flatten() {
                vertex.convert_position(length_factor);
            }
        }

        self.momentum_unit = momentum_unit;
        self.length_unit = length_unit;
    }

    pub fn signal_process_vertex(&self) -> Option<VertexId> {
        self.signal_process_vertex
    }

    pub fn set_signal_process_vertex(&mut self, vertex: Option<VertexId>) -> Result<()> {
        if let Some(id) = vertex {
            self.vertex(id)?;
        }
        self.signal_process_vertex = vertex;
        Ok(())
    }

    pub fn beam_particles(&self) -> Option<(ParticleId, ParticleId)> {
        self.beam_particles
    }

    pub fn set_beam_particles(&mut self, beams: Option<(ParticleId, ParticleId)>) -> Result<()> {
        if let Some((first, second)) = beams {
            self.particle(first)?;
            self.particle(second)?;
        }
        self.beam_particles = beams;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entity access
    // ─────────────────────────────────────────────────────────────────────────

    /// Place a standalone vertex into this event's arena
    ///
    /// The vertex is not owned by the event until it is passed to
    /// [`add_vertex`](Self::add_vertex) or linked to an owned particle. A
    /// negative barcode already set on the record is kept as a suggestion.
    pub fn create_vertex(&mut self, vertex: Vertex) -> VertexId {
        let mut vertex = vertex.unlinked();
        if vertex.barcode > 0 {
            vertex.barcode = 0;
        }
        self.vertices.push(Some(vertex));
        self.vertex_handle(self.vertices.len() as u32 - 1)
    }

    /// Place a standalone particle into this event's arena
    pub fn create_particle(&mut self, particle: Particle) -> ParticleId {
        let mut particle = particle.unlinked();
        if particle.barcode < 0 {
            particle.barcode = 0;
        }
        self.particles.push(Some(particle));
        self.particle_handle(self.particles.len() as u32 - 1)
    }

    pub fn vertex(&self, id: VertexId) -> Result<&Vertex> {
        if id.event != self.key {
            return Err(Error::ForeignHandle(id.to_string()));
        }
        self.vertex_at(id.index)
            .ok_or_else(|| Error::VertexNotFound(id.to_string()))
    }

    /// Mutable access to position, status and weights
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut Vertex> {
        self.vertex(id)?;
        self.vertices
            .get_mut(id.index as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::VertexNotFound(id.to_string()))
    }

    pub fn particle(&self, id: ParticleId) -> Result<&Particle> {
        if id.event != self.key {
            return Err(Error::ForeignHandle(id.to_string()));
        }
        self.particle_at(id.index)
            .ok_or_else(|| Error::ParticleNotFound(id.to_string()))
    }

    /// Mutable access to the particle's physics data
    pub fn particle_mut(&mut self, id: ParticleId) -> Result<&mut Particle> {
        self.particle(id)?;
        self.particles
            .get_mut(id.index as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::ParticleNotFound(id.to_string()))
    }

    pub fn barcode_to_vertex(&self, barcode: i32) -> Option<VertexId> {
        self.vertex_barcodes
            .get(&barcode)
            .map(|index| self.vertex_handle(*index))
    }

    pub fn barcode_to_particle(&self, barcode: i32) -> Option<ParticleId> {
        self.particle_barcodes
            .get(&barcode)
            .map(|index| self.particle_handle(*index))
    }

    /// Number of vertices owned by the event
    pub fn vertices_size(&self) -> usize {
        self.vertex_barcodes.len()
    }

    /// Number of particles owned by the event
    pub fn particles_size(&self) -> usize {
        self.particle_barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_barcodes.is_empty() && self.particle_barcodes.is_empty()
    }

    /// Immediate parents of a particle: the incoming particles of its
    /// production vertex (empty without one)
    pub fn particle_parents(&self, id: ParticleId) -> Result<Vec<ParticleId>> {
        match self.particle(id)?.production_vertex {
            Some(v) => Ok(self.vertex(v)?.particles_in.clone()),
            None => Ok(Vec::new()),
        }
    }

    /// Immediate children of a particle: the outgoing particles of its end
    /// vertex (empty without one)
    pub fn particle_children(&self, id: ParticleId) -> Result<Vec<ParticleId>> {
        match self.particle(id)?.end_vertex {
            Some(v) => Ok(self.vertex(v)?.particles_out.clone()),
            None => Ok(Vec::new()),
        }
    }

    /// Drop the whole graph and header, keeping the units
    ///
    /// Handles issued before the call no longer resolve.
    pub fn clear(&mut self) {
        *self = Self::with_units(self.momentum_unit, self.length_unit);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ownership
    // ─────────────────────────────────────────────────────────────────────────

    /// Take ownership of a vertex and everything reachable from it
    ///
    /// Entities without a usable barcode get one assigned. Adding a vertex
    /// the event already holds is a no-op.
    pub fn add_vertex(&mut self, id: VertexId) -> Result<()> {
        self.vertex(id)?;
        self.push_root(id.index);
        self.adopt_component(id.index);

        tracing::debug!(
            "Added {} (barcode {}), event now has {} vertices and {} particles",
            id,
            self.vertex_at(id.index).map_or(0, Vertex::barcode),
            self.vertices_size(),
            self.particles_size()
        );
        Ok(())
    }

    /// Remove a vertex from the event and destroy it
    ///
    /// Every link of the vertex is severed. Particles left with neither a
    /// production nor an end vertex are destroyed; the others stay owned
    /// through their remaining vertex. The vertex record is returned
    /// without links.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<Vertex> {
        let vertex = self.vertex(id)?;
        let incoming = vertex.particles_in.clone();
        let outgoing = vertex.particles_out.clone();

        for p in &incoming {
            self.unlink_in(id, *p);
        }
        for p in &outgoing {
            self.unlink_out(id, *p);
        }

        let mut destroyed = 0;
        for p in incoming.iter().chain(&outgoing) {
            let dangling = self
                .particle_at(p.index)
                .is_some_and(|pt| pt.production_vertex.is_none() && pt.end_vertex.is_none());
            if dangling {
                self.destroy_particle(*p);
                destroyed += 1;
            }
        }

        let mut vertex = self
            .vertices
            .get_mut(id.index as usize)
            .and_then(Option::take)
            .ok_or_else(|| Error::VertexNotFound(id.to_string()))?;

        if vertex.in_event && self.vertex_barcodes.get(&vertex.barcode) == Some(&id.index) {
            self.vertex_barcodes.remove(&vertex.barcode);
        }
        if self.root_set.remove(&id.index) {
            self.roots.retain(|r| *r != id.index);
        }
        if self.signal_process_vertex == Some(id) {
            self.signal_process_vertex = None;
        }
        vertex.in_event = false;

        tracing::debug!(
            "Removed {} (barcode {}), destroyed {} particles",
            id,
            vertex.barcode,
            destroyed
        );
        Ok(vertex)
    }

    /// Suggest a barcode for a vertex
    ///
    /// Fails without side effects if the barcode is not negative or is
    /// already used in this event. For a vertex not yet owned, the value is
    /// remembered and applied when the vertex joins the event.
    pub fn suggest_vertex_barcode(&mut self, id: VertexId, barcode: i32) -> Result<()> {
        if barcode >= 0 {
            return Err(Error::InvalidBarcode {
                barcode,
                reason: "vertex barcodes must be negative",
            });
        }
        let vertex = self.vertex(id)?;
        match self.vertex_barcodes.get(&barcode) {
            Some(owner) if *owner == id.index => return Ok(()),
            Some(_) => return Err(Error::BarcodeInUse(barcode)),
            None => {}
        }

        let (in_event, old) = (vertex.in_event, vertex.barcode);
        if in_event {
            self.vertex_barcodes.remove(&old);
            self.vertex_barcodes.insert(barcode, id.index);
        }
        if let Some(v) = self.vertex_slot(id.index) {
            v.barcode = barcode;
        }
        Ok(())
    }

    /// Suggest a barcode for a particle
    ///
    /// Fails without side effects if the barcode is not positive or is
    /// already used in this event.
    pub fn suggest_particle_barcode(&mut self, id: ParticleId, barcode: i32) -> Result<()> {
        if barcode <= 0 {
            return Err(Error::InvalidBarcode {
                barcode,
                reason: "particle barcodes must be positive",
            });
        }
        let particle = self.particle(id)?;
        match self.particle_barcodes.get(&barcode) {
            Some(owner) if *owner == id.index => return Ok(()),
            Some(_) => return Err(Error::BarcodeInUse(barcode)),
            None => {}
        }

        let (in_event, old) = (particle.in_event, particle.barcode);
        if in_event {
            self.particle_barcodes.remove(&old);
            self.particle_barcodes.insert(barcode, id.index);
        }
        if let Some(p) = self.particle_slot(id.index) {
            p.barcode = barcode;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edge maintenance
    // ─────────────────────────────────────────────────────────────────────────

    /// Make `particle` an incoming edge of `vertex`
    ///
    /// A particle already ending at another vertex is detached from it
    /// first.
    pub fn add_particle_in(&mut self, vertex: VertexId, particle: ParticleId) -> Result<()> {
        self.vertex(vertex)?;
        let p = self.particle(particle)?;
        let (production, end) = (p.production_vertex, p.end_vertex);
        if end == Some(vertex) {
            return Ok(());
        }
        if production == Some(vertex) {
            return Err(Error::SelfLoop {
                particle: particle.to_string(),
                vertex: vertex.to_string(),
            });
        }
        if let Some(old) = end {
            self.unlink_in(old, particle);
        }

        if let Some(v) = self.vertex_slot(vertex.index) {
            v.particles_in.push(particle);
        }
        if let Some(p) = self.particle_slot(particle.index) {
            p.end_vertex = Some(vertex);
        }
        self.after_link(vertex, particle);
        Ok(())
    }

    /// Make `particle` an outgoing edge of `vertex`
    ///
    /// A particle already produced at another vertex is detached from it
    /// first.
    pub fn add_particle_out(&mut self, vertex: VertexId, particle: ParticleId) -> Result<()> {
        self.vertex(vertex)?;
        let p = self.particle(particle)?;
        let (production, end) = (p.production_vertex, p.end_vertex);
        if production == Some(vertex) {
            return Ok(());
        }
        if end == Some(vertex) {
            return Err(Error::SelfLoop {
                particle: particle.to_string(),
                vertex: vertex.to_string(),
            });
        }
        if let Some(old) = production {
            self.unlink_out(old, particle);
        }

        if let Some(v) = self.vertex_slot(vertex.index) {
            v.particles_out.push(particle);
        }
        if let Some(p) = self.particle_slot(particle.index) {
            p.production_vertex = Some(vertex);
        }
        self.after_link(vertex, particle);
        Ok(())
    }

    /// Detach `particle` from whichever of `vertex`'s lists hold it
    ///
    /// The particle is never destroyed; its matching back-reference is
    /// cleared and it can be attached elsewhere. Returns false if the
    /// particle was not attached to the vertex.
    pub fn remove_particle(&mut self, vertex: VertexId, particle: ParticleId) -> Result<bool> {
        self.vertex(vertex)?;
        let p = self.particle(particle)?;
        let (is_in, is_out) = (
            p.end_vertex == Some(vertex),
            p.production_vertex == Some(vertex),
        );

        if is_in {
            self.unlink_in(vertex, particle);
        }
        if is_out {
            self.unlink_out(vertex, particle);
        }
        Ok(is_in || is_out)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) fn vertex_at(&self, index: u32) -> Option<&Vertex> {
        self.vertices.get(index as usize).and_then(Option::as_ref)
    }

    pub(crate) fn particle_at(&self, index: u32) -> Option<&Particle> {
        self.particles.get(index as usize).and_then(Option::as_ref)
    }

    pub(crate) fn vertex_handle(&self, index: u32) -> VertexId {
        VertexId {
            event: self.key,
            index,
        }
    }

    pub(crate) fn particle_handle(&self, index: u32) -> ParticleId {
        ParticleId {
            event: self.key,
            index,
        }
    }

    /// Owned vertices held directly, in the order they were added
    pub(crate) fn root_indices(&self) -> Vec<u32> {
        self.roots
            .iter()
            .copied()
            .filter(|r| self.vertex_at(*r).is_some_and(Vertex::is_in_event))
            .collect()
    }

    fn vertex_slot(&mut self, index: u32) -> Option<&mut Vertex> {
        self.vertices.get_mut(index as usize).and_then(Option::as_mut)
    }

    fn particle_slot(&mut self, index: u32) -> Option<&mut Particle> {
        self.particles.get_mut(index as usize).and_then(Option::as_mut)
    }

    fn push_root(&mut self, index: u32) {
        if self.root_set.insert(index) {
            self.roots.push(index);
        }
    }

    fn is_owned_vertex(&self, id: Option<VertexId>) -> bool {
        id.and_then(|v| self.vertex_at(v.index))
            .is_some_and(Vertex::is_in_event)
    }

    /// Bring everything reachable from `seed` under the event's ownership
    fn adopt_component(&mut self, seed: u32) {
        let reached: Vec<u32> = VertexIter::new(self, vec![seed], IteratorRange::Relatives)
            .map(|v| v.index)
            .collect();

        for index in reached {
            self.attach_vertex(index);
            let edges: Vec<ParticleId> = match self.vertex_at(index) {
                Some(v) => v.particles_in.iter().chain(&v.particles_out).copied().collect(),
                None => continue,
            };
            for p in edges {
                self.attach_particle(p.index);
            }
        }
    }

    /// Keep ownership consistent after `particle` was linked to `vertex`
    fn after_link(&mut self, vertex: VertexId, particle: ParticleId) {
        let vertex_owned = self.vertex_at(vertex.index).is_some_and(Vertex::is_in_event);
        let Some(p) = self.particle_at(particle.index) else {
            return;
        };

        if vertex_owned {
            let other = if p.production_vertex == Some(vertex) {
                p.end_vertex
            } else {
                p.production_vertex
            };
            let adopt_other = other.filter(|o| !self.is_owned_vertex(Some(*o)));
            if !p.in_event {
                self.attach_particle(particle.index);
            }
            if let Some(o) = adopt_other {
                self.adopt_component(o.index);
            }
        } else if p.in_event {
            self.adopt_component(vertex.index);
        }
    }

    fn unlink_in(&mut self, vertex: VertexId, particle: ParticleId) {
        if let Some(v) = self.vertex_slot(vertex.index) {
            v.particles_in.retain(|p| *p != particle);
        }
        let other = match self.particle_slot(particle.index) {
            Some(p) => {
                p.end_vertex = None;
                p.production_vertex
            }
            None => None,
        };
        self.after_unlink(vertex, other, particle);
    }

    fn unlink_out(&mut self, vertex: VertexId, particle: ParticleId) {
        if let Some(v) = self.vertex_slot(vertex.index) {
            v.particles_out.retain(|p| *p != particle);
        }
        let other = match self.particle_slot(particle.index) {
            Some(p) => {
                p.production_vertex = None;
                p.end_vertex
            }
            None => None,
        };
        self.after_unlink(vertex, other, particle);
    }

    /// Both sides of a severed edge become seeds so whole-event ranges keep
    /// reaching them; a particle with no owned vertex left leaves the event.
    fn after_unlink(&mut self, vertex: VertexId, other: Option<VertexId>, particle: ParticleId) {
        for side in [Some(vertex), other].into_iter().flatten() {
            if self.is_owned_vertex(Some(side)) {
                self.push_root(side.index);
            }
        }

        let orphaned = self.particle_at(particle.index).is_some_and(|p| {
            p.in_event
                && !self.is_owned_vertex(p.production_vertex)
                && !self.is_owned_vertex(p.end_vertex)
        });
        if orphaned {
            self.release_particle(particle);
        }
    }

    fn release_particle(&mut self, particle: ParticleId) {
        let Some(p) = self.particle_slot(particle.index) else {
            return;
        };
        p.in_event = false;
        let barcode = p.barcode;
        if self.particle_barcodes.get(&barcode) == Some(&particle.index) {
            self.particle_barcodes.remove(&barcode);
        }
        if let Some((a, b)) = self.beam_particles {
            if a == particle || b == particle {
                self.beam_particles = None;
            }
        }
    }

    fn destroy_particle(&mut self, particle: ParticleId) {
        self.release_particle(particle);
        if let Some(slot) = self.particles.get_mut(particle.index as usize) {
            *slot = None;
        }
    }

    fn attach_vertex(&mut self, index: u32) {
        let Some(vertex) = self.vertex_at(index) else {
            return;
        };
        if vertex.in_event {
            return;
        }

        let suggested = vertex.barcode;
        let barcode = if suggested < 0 && !self.vertex_barcodes.contains_key(&suggested) {
            suggested
        } else {
            let fresh = self.next_vertex_barcode();
            if suggested != 0 {
                tracing::warn!(
                    "Suggested vertex barcode {} is taken, assigning {}",
                    suggested,
                    fresh
                );
            }
            fresh
        };

        self.vertex_barcodes.insert(barcode, index);
        if let Some(v) = self.vertex_slot(index) {
            v.barcode = barcode;
            v.in_event = true;
        }
    }

    fn attach_particle(&mut self, index: u32) {
        let Some(particle) = self.particle_at(index) else {
            return;
        };
        if particle.in_event {
            return;
        }

        let suggested = particle.barcode;
        let barcode = if suggested > 0 && !self.particle_barcodes.contains_key(&suggested) {
            suggested
        } else {
            let fresh = self.next_particle_barcode();
            if suggested != 0 {
                tracing::warn!(
                    "Suggested particle barcode {} is taken, assigning {}",
                    suggested,
                    fresh
                );
            }
            fresh
        };

        self.particle_barcodes.insert(barcode, index);
        if let Some(p) = self.particle_slot(index) {
            p.barcode = barcode;
            p.in_event = true;
        }
    }

    /// One below the lowest vertex barcode; once that would overflow, the
    /// unused barcode closest to -1
    fn next_vertex_barcode(&self) -> i32 {
        match self.vertex_barcodes.keys().next() {
            None => -1,
            Some(lowest) => lowest.checked_sub(1).unwrap_or_else(|| {
                (1..=i32::MAX)
                    .map(|n| -n)
                    .find(|b| !self.vertex_barcodes.contains_key(b))
                    .unwrap_or(i32::MIN)
            }),
        }
    }

    /// One above the highest particle barcode (at least 10001); once that
    /// would overflow, the lowest unused barcode from 10001 up
    fn next_particle_barcode(&self) -> i32 {
        match self.particle_barcodes.keys().next_back() {
            None => FIRST_AUTO_PARTICLE_BARCODE,
            Some(highest) => match highest.checked_add(1) {
                Some(next) => next.max(FIRST_AUTO_PARTICLE_BARCODE),
                None => (FIRST_AUTO_PARTICLE_BARCODE..=i32::MAX)
                    .find(|b| !self.particle_barcodes.contains_key(b))
                    .unwrap_or(i32::MAX),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FourVector;

    fn particle(pdg_id: i32) -> Particle {
        Particle::new(FourVector::new(0.0, 0.0, 1.0, 1.0), pdg_id, 1)
    }

    fn vertex() -> Vertex {
        Vertex::new(FourVector::default(), 0)
    }

    #[test]
    fn test_single_vertex_barcodes() {
        let mut evt = Event::new();
        let v = evt.create_vertex(vertex());
        let e_minus = evt.create_particle(particle(11));
        let e_plus = evt.create_particle(particle(-11));
        evt.add_particle_in(v, e_minus).unwrap();
        evt.add_particle_out(v, e_plus).unwrap();

        assert_eq!(evt.vertices_size(), 0);
        evt.add_vertex(v).unwrap();

        assert_eq!(evt.vertex(v).unwrap().barcode(), -1);
        assert_eq!(evt.particle(e_minus).unwrap().barcode(), 10001);
        assert_eq!(evt.particle(e_plus).unwrap().barcode(), 10002);
        assert_eq!(evt.vertices_size(), 1);
        assert_eq!(evt.particles_size(), 2);
        assert_eq!(evt.barcode_to_vertex(-1), Some(v));
        assert_eq!(evt.barcode_to_particle(10002), Some(e_plus));
    }

    #[test]
    fn test_attach_to_owned_vertex_assigns_barcode() {
        let mut evt = Event::new();
        let v = evt.create_vertex(vertex());
        evt.add_vertex(v).unwrap();

        let p = evt.create_particle(particle(22));
        assert!(!evt.particle(p).unwrap().is_in_event());
        evt.add_particle_out(v, p).unwrap();
        assert!(evt.particle(p).unwrap().is_in_event());
        assert_eq!(evt.particle(p).unwrap().barcode(), 10001);
    }

    #[test]
    fn test_adopts_reachable_vertices() {
        let mut evt = Event::new();
        let v1 = evt.create_vertex(vertex());
        let v2 = evt.create_vertex(vertex());
        let p = evt.create_particle(particle(23));
        evt.add_particle_out(v1, p).unwrap();
        evt.add_particle_in(v2, p).unwrap();

        evt.add_vertex(v1).unwrap();
        assert!(evt.vertex(v2).unwrap().is_in_event());
        assert_eq!(evt.vertices_size(), 2);

        // A standalone vertex linked to an owned particle joins as well
        let v3 = evt.create_vertex(vertex());
        let q = evt.create_particle(particle(11));
        evt.add_particle_out(v2, q).unwrap();
        evt.add_particle_in(v3, q).unwrap();
        assert!(evt.vertex(v3).unwrap().is_in_event());
        assert_eq!(evt.vertices_size(), 3);
    }

    #[test]
    fn test_suggest_barcode() {
        let mut evt = Event::new();
        let v1 = evt.create_vertex(vertex());
        let v2 = evt.create_vertex(vertex());
        evt.add_vertex(v1).unwrap();
        evt.add_vertex(v2).unwrap();
        assert_eq!(evt.vertex(v1).unwrap().barcode(), -1);
        assert_eq!(evt.vertex(v2).unwrap().barcode(), -2);

        // Taken: rejected without side effects
        assert_eq!(
            evt.suggest_vertex_barcode(v2, -1),
            Err(Error::BarcodeInUse(-1))
        );
        assert_eq!(evt.vertex(v2).unwrap().barcode(), -2);
        assert_eq!(evt.barcode_to_vertex(-2), Some(v2));

        // Wrong sign
        assert!(matches!(
            evt.suggest_vertex_barcode(v2, 5),
            Err(Error::InvalidBarcode { .. })
        ));

        evt.suggest_vertex_barcode(v2, -10).unwrap();
        assert_eq!(evt.vertex(v2).unwrap().barcode(), -10);
        assert_eq!(evt.barcode_to_vertex(-10), Some(v2));
        assert_eq!(evt.barcode_to_vertex(-2), None);
    }

    #[test]
    fn test_suggested_barcode_applied_on_attach() {
        let mut evt = Event::new();
        let v = evt.create_vertex(vertex());
        let p = evt.create_particle(particle(2212));
        evt.suggest_vertex_barcode(v, -7).unwrap();
        evt.suggest_particle_barcode(p, 3).unwrap();
        evt.add_particle_in(v, p).unwrap();
        evt.add_vertex(v).unwrap();

        assert_eq!(evt.vertex(v).unwrap().barcode(), -7);
        assert_eq!(evt.particle(p).unwrap().barcode(), 3);

        // The next automatic barcodes continue from the ones in use
        let w = evt.create_vertex(vertex());
        evt.add_vertex(w).unwrap();
        assert_eq!(evt.vertex(w).unwrap().barcode(), -8);
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let mut first = Event::new();
        let mut second = Event::new();
        let v = first.create_vertex(vertex());
        let p = second.create_particle(particle(11));

        assert!(matches!(second.add_vertex(v), Err(Error::ForeignHandle(_))));
        assert!(matches!(first.add_particle_in(v, p), Err(Error::ForeignHandle(_))));
        assert_eq!(second.vertices_size(), 0);
    }

    #[test]
    fn test_add_particle_out_moves_production_vertex() {
        let mut evt = Event::new();
        let v1 = evt.create_vertex(vertex());
        let v2 = evt.create_vertex(vertex());
        evt.add_vertex(v1).unwrap();
        evt.add_vertex(v2).unwrap();

        let p = evt.create_particle(particle(211));
        evt.add_particle_out(v1, p).unwrap();
        evt.add_particle_out(v2, p).unwrap();

        assert!(evt.vertex(v1).unwrap().particles_out().is_empty());
        assert_eq!(evt.vertex(v2).unwrap().particles_out(), &[p]);
        assert_eq!(evt.particle(p).unwrap().production_vertex(), Some(v2));
        assert!(evt.particle(p).unwrap().is_in_event());
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut evt = Event::new();
        let v = evt.create_vertex(vertex());
        let p = evt.create_particle(particle(21));
        evt.add_particle_out(v, p).unwrap();

        assert!(matches!(evt.add_particle_in(v, p), Err(Error::SelfLoop { .. })));
        assert!(evt.vertex(v).unwrap().particles_in().is_empty());
        assert_eq!(evt.particle(p).unwrap().end_vertex(), None);
    }

    #[test]
    fn test_remove_particle_detaches_without_destroying() {
        let mut evt = Event::new();
        let v1 = evt.create_vertex(vertex());
        let v2 = evt.create_vertex(vertex());
        evt.add_vertex(v1).unwrap();
        evt.add_vertex(v2).unwrap();
        let p = evt.create_particle(particle(13));
        evt.add_particle_out(v1, p).unwrap();
        let barcode = evt.particle(p).unwrap().barcode();

        assert!(evt.remove_particle(v1, p).unwrap());
        assert!(evt.vertex(v1).unwrap().particles_out().is_empty());
        let detached = evt.particle(p).unwrap();
        assert_eq!(detached.production_vertex(), None);
        assert!(!detached.is_in_event());
        assert_eq!(evt.particles_size(), 0);

        // Not attached any more
        assert!(!evt.remove_particle(v1, p).unwrap());

        // Reattach elsewhere; the old barcode comes back
        evt.add_particle_out(v2, p).unwrap();
        assert_eq!(evt.particle(p).unwrap().production_vertex(), Some(v2));
        assert_eq!(evt.particle(p).unwrap().barcode(), barcode);
        assert_eq!(evt.particles_size(), 1);
    }

    #[test]
    fn test_remove_vertex_destroys_sole_particles() {
        let mut evt = Event::new();
        let v1 = evt.create_vertex(vertex());
        let v2 = evt.create_vertex(vertex());
        let beam = evt.create_particle(particle(2212));
        let link = evt.create_particle(particle(23));
        let out = evt.create_particle(particle(11));
        evt.add_particle_in(v1, beam).unwrap();
        evt.add_particle_out(v1, link).unwrap();
        evt.add_particle_in(v2, link).unwrap();
        evt.add_particle_out(v2, out).unwrap();
        evt.add_vertex(v1).unwrap();
        evt.set_signal_process_vertex(Some(v1)).unwrap();
        assert_eq!(evt.particles_size(), 3);

        let removed = evt.remove_vertex(v1).unwrap();
        assert!(!removed.is_in_event());
        assert!(removed.particles_in().is_empty());
        assert!(matches!(evt.vertex(v1), Err(Error::VertexNotFound(_))));
        assert!(matches!(evt.particle(beam), Err(Error::ParticleNotFound(_))));
        assert_eq!(evt.signal_process_vertex(), None);

        // The linking particle survives as an orphan incoming edge of v2
        let link_particle = evt.particle(link).unwrap();
        assert_eq!(link_particle.production_vertex(), None);
        assert_eq!(link_particle.end_vertex(), Some(v2));
        assert_eq!(evt.vertices_size(), 1);
        assert_eq!(evt.particles_size(), 2);
        assert_eq!(evt.vertices().collect::<Vec<_>>(), vec![v2]);
    }

    #[test]
    fn test_particle_parents_and_children() {
        let mut evt = Event::new();
        let v1 = evt.create_vertex(vertex());
        let v2 = evt.create_vertex(vertex());
        let a = evt.create_particle(particle(1));
        let b = evt.create_particle(particle(2));
        let c = evt.create_particle(particle(3));
        evt.add_particle_in(v1, a).unwrap();
        evt.add_particle_out(v1, b).unwrap();
        evt.add_particle_in(v2, b).unwrap();
        evt.add_particle_out(v2, c).unwrap();

        assert_eq!(evt.particle_parents(b).unwrap(), vec![a]);
        assert_eq!(evt.particle_children(b).unwrap(), vec![c]);
        assert!(evt.particle_parents(a).unwrap().is_empty());
        assert!(evt.particle_children(c).unwrap().is_empty());
    }

    #[test]
    fn test_use_units_rescales() {
        let mut evt = Event::with_units(MomentumUnit::GeV, LengthUnit::Cm);
        let v = evt.create_vertex(Vertex::new(FourVector::new(1.0, 0.0, 0.0, 2.0), 0));
        let p = evt.create_particle(particle(11).with_generated_mass(0.5));
        evt.add_particle_out(v, p).unwrap();
        evt.add_vertex(v).unwrap();

        evt.use_units(MomentumUnit::MeV, LengthUnit::Mm);
        assert_eq!(evt.momentum_unit(), MomentumUnit::MeV);
        assert_eq!(evt.particle(p).unwrap().momentum().e(), 1000.0);
        assert_eq!(evt.particle(p).unwrap().generated_mass(), 500.0);
        assert_eq!(evt.vertex(v).unwrap().position().x, 10.0);
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut evt = Event::new();
        let v = evt.create_vertex(vertex());
        evt.add_vertex(v).unwrap();
        evt.info_mut().event_number = 7;

        evt.clear();
        assert!(evt.is_empty());
        assert_eq!(evt.event_number(), 0);
        assert!(matches!(evt.vertex(v), Err(Error::ForeignHandle(_))));
    }

    #[test]
    fn test_auto_barcodes_after_extreme_suggestions() {
        let mut evt = Event::new();
        let a = evt.create_vertex(vertex());
        evt.suggest_vertex_barcode(a, i32::MIN).unwrap();
        evt.add_vertex(a).unwrap();
        let b = evt.create_vertex(vertex());
        evt.add_vertex(b).unwrap();
        let c = evt.create_vertex(vertex());
        evt.add_vertex(c).unwrap();

        assert_eq!(evt.vertex(a).unwrap().barcode(), i32::MIN);
        assert_eq!(evt.vertex(b).unwrap().barcode(), -1);
        assert_eq!(evt.vertex(c).unwrap().barcode(), -2);
        assert_eq!(evt.vertices_size(), 3);
        assert_eq!(evt.vertices().count(), 3);

        let p = evt.create_particle(particle(22));
        evt.suggest_particle_barcode(p, i32::MAX).unwrap();
        evt.add_particle_out(a, p).unwrap();
        let q = evt.create_particle(particle(22));
        evt.add_particle_out(a, q).unwrap();
        let r = evt.create_particle(particle(22));
        evt.add_particle_out(a, r).unwrap();

        assert_eq!(evt.particle(p).unwrap().barcode(), i32::MAX);
        assert_eq!(evt.particle(q).unwrap().barcode(), 10001);
        assert_eq!(evt.particle(r).unwrap().barcode(), 10002);
        assert_eq!(evt.particles_size(), 3);
        assert_eq!(evt.particles().count(), 3);
    }

    #[test]
    fn test_add_particle_in_moves_end_vertex() {
        // a -p-> b -q-> c, then q is re-pointed back into a
        let mut evt = Event::new();
        let a = evt.create_vertex(vertex());
        let b = evt.create_vertex(vertex());
        let c = evt.create_vertex(vertex());
        let p = evt.create_particle(particle(21));
        let q = evt.create_particle(particle(21));
        evt.add_particle_out(a, p).unwrap();
        evt.add_particle_in(b, p).unwrap();
        evt.add_particle_out(b, q).unwrap();
        evt.add_particle_in(c, q).unwrap();
        evt.add_vertex(a).unwrap();
        assert_eq!(evt.vertices_size(), 3);

        evt.add_particle_in(a, q).unwrap();
        assert!(evt.vertex(c).unwrap().particles_in().is_empty());
        assert_eq!(evt.vertex(a).unwrap().particles_in(), &[q]);
        assert_eq!(evt.particle(q).unwrap().end_vertex(), Some(a));
        assert_eq!(evt.particle(q).unwrap().production_vertex(), Some(b));

        for r in IteratorRange::ALL {
            let seen: Vec<VertexId> = evt.vertex_range(a, r).unwrap().collect();
            assert!(seen.len() <= 2, "range {r}");
            assert!(!seen.contains(&c), "range {r}");
        }
        assert_eq!(evt.vertices_size(), 3);
        assert_eq!(evt.vertices().count(), 3);
        assert_eq!(evt.particles().count(), 2);
    }
}
