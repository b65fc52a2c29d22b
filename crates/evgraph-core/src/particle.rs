//! Particle (edge) types

use crate::event::EventKey;
use crate::value::{Flow, FourVector, Polarization};
use crate::vertex::VertexId;

/// Handle to a particle stored in an [`Event`](crate::Event)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId {
    pub(crate) event: EventKey,
    pub(crate) index: u32,
}

impl ParticleId {
    /// Slot of this particle inside its event
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "particle#{}", self.index)
    }
}

/// A particle in the event graph (an edge)
///
/// A particle is produced at most once and decays at most once. The
/// production and end vertex links are maintained by the owning
/// [`Event`](crate::Event); they are read-only here.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Momentum four-vector (px, py, pz, e)
    momentum: FourVector,

    /// Particle type code
    pdg_id: i32,

    /// Generator status code
    status: i32,

    /// Colour flow
    flow: Flow,

    /// Polarization angles
    polarization: Polarization,

    /// Mass as set by the generator
    generated_mass: f64,

    /// Unique positive identifier within the event, 0 if never assigned
    pub(crate) barcode: i32,

    pub(crate) production_vertex: Option<VertexId>,
    pub(crate) end_vertex: Option<VertexId>,
    pub(crate) in_event: bool,
}

impl Particle {
    /// Create a new standalone particle
    pub fn new(momentum: FourVector, pdg_id: i32, status: i32) -> Self {
        Self {
            momentum,
            pdg_id,
            status,
            flow: Flow::default(),
            polarization: Polarization::default(),
            generated_mass: 0.0,
            barcode: 0,
            production_vertex: None,
            end_vertex: None,
            in_event: false,
        }
    }

    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_polarization(mut self, polarization: Polarization) -> Self {
        self.polarization = polarization;
        self
    }

    pub fn with_generated_mass(mut self, mass: f64) -> Self {
        self.generated_mass = mass;
        self
    }

    pub fn momentum(&self) -> &FourVector {
        &self.momentum
    }

    pub fn pdg_id(&self) -> i32 {
        self.pdg_id
    }

    pub fn abs_pdg_id(&self) -> u32 {
        self.pdg_id.unsigned_abs()
    }

    pub fn status(&self) -> i32 {
        self.status
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn polarization(&self) -> &Polarization {
        &self.polarization
    }

    pub fn generated_mass(&self) -> f64 {
        self.generated_mass
    }

    /// Barcode, or 0 if none was ever assigned or suggested
    pub fn barcode(&self) -> i32 {
        self.barcode
    }

    pub fn production_vertex(&self) -> Option<VertexId> {
        self.production_vertex
    }

    pub fn end_vertex(&self) -> Option<VertexId> {
        self.end_vertex
    }

    /// True once the particle is owned by its event
    pub fn is_in_event(&self) -> bool {
        self.in_event
    }

    /// Status 1: final-state particle
    pub fn is_undecayed(&self) -> bool {
        self.status == 1
    }

    /// Status 2: decayed particle
    pub fn has_decayed(&self) -> bool {
        self.status == 2
    }

    /// Status 4: beam particle
    pub fn is_beam(&self) -> bool {
        self.status == 4
    }

    pub fn set_momentum(&mut self, momentum: FourVector) {
        self.momentum = momentum;
    }

    pub fn set_pdg_id(&mut self, pdg_id: i32) {
        self.pdg_id = pdg_id;
    }

    pub fn set_status(&mut self, status: i32) {
        self.status = status;
    }

    pub fn set_flow(&mut self, flow: Flow) {
        self.flow = flow;
    }

    pub fn set_polarization(&mut self, polarization: Polarization) {
        self.polarization = polarization;
    }

    pub fn set_generated_mass(&mut self, mass: f64) {
        self.generated_mass = mass;
    }

    /// Drop every link so the record can enter an arena as a fresh entity
    pub(crate) fn unlinked(mut self) -> Self {
        self.production_vertex = None;
        self.end_vertex = None;
        self.in_event = false;
        self
    }

    pub(crate) fn convert_momentum(&mut self, factor: f64) {
        self.momentum = self.momentum.scaled(factor);
        self.generated_mass *= factor;
    }
}
