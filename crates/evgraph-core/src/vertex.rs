//! Vertex (node) types

use crate::event::EventKey;
use crate::particle::ParticleId;
use crate::value::{FourVector, WeightContainer};

/// Handle to a vertex stored in an [`Event`](crate::Event)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId {
    pub(crate) event: EventKey,
    pub(crate) index: u32,
}

impl VertexId {
    /// Slot of this vertex inside its event
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vertex#{}", self.index)
    }
}

/// An interaction or decay point in the event graph (a node)
///
/// Incoming and outgoing particle lists keep attachment order. They are
/// edited only through the owning [`Event`](crate::Event), which keeps the
/// particles' back-references in step.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Position and time
    position: FourVector,

    /// Generator status code
    status: i32,

    /// Optional vertex weights
    weights: WeightContainer,

    /// Unique negative identifier within the event, 0 if never assigned
    pub(crate) barcode: i32,

    pub(crate) particles_in: Vec<ParticleId>,
    pub(crate) particles_out: Vec<ParticleId>,
    pub(crate) in_event: bool,
}

impl Vertex {
    /// Create a new standalone vertex
    pub fn new(position: FourVector, status: i32) -> Self {
        Self {
            position,
            status,
            weights: WeightContainer::default(),
            barcode: 0,
            particles_in: Vec::new(),
            particles_out: Vec::new(),
            in_event: false,
        }
    }

    pub fn with_weights(mut self, weights: WeightContainer) -> Self {
        self.weights = weights;
        self
    }

    pub fn position(&self) -> &FourVector {
        &self.position
    }

    pub fn status(&self) -> i32 {
        self.status
    }

    pub fn weights(&self) -> &WeightContainer {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut WeightContainer {
        &mut self.weights
    }

    /// Barcode, or 0 if none was ever assigned or suggested
    pub fn barcode(&self) -> i32 {
        self.barcode
    }

    /// Immediate incoming particles
    pub fn particles_in(&self) -> &[ParticleId] {
        &self.particles_in
    }

    /// Immediate outgoing particles
    pub fn particles_out(&self) -> &[ParticleId] {
        &self.particles_out
    }

    pub fn particles_in_size(&self) -> usize {
        self.particles_in.len()
    }

    pub fn particles_out_size(&self) -> usize {
        self.particles_out.len()
    }

    /// True once the vertex is owned by its event
    pub fn is_in_event(&self) -> bool {
        self.in_event
    }

    pub fn set_position(&mut self, position: FourVector) {
        self.position = position;
    }

    pub fn set_status(&mut self, status: i32) {
        self.status = status;
    }

    pub(crate) fn unlinked(mut self) -> Self {
        self.particles_in.clear();
        self.particles_out.clear();
        self.in_event = false;
        self
    }

    pub(crate) fn convert_position(&mut self, factor: f64) {
        self.position = self.position.scaled(factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_creation() {
        let v = Vertex::new(FourVector::new(0.1, 0.2, 0.3, 0.0), 3)
            .with_weights(WeightContainer::from_values(vec![0.5]));

        assert_eq!(v.status(), 3);
        assert_eq!(v.position().y, 0.2);
        assert_eq!(v.weights().values(), &[0.5]);
        assert_eq!(v.barcode(), 0);
        assert_eq!(v.particles_in_size(), 0);
        assert_eq!(v.particles_out_size(), 0);
        assert!(!v.is_in_event());
    }
}
