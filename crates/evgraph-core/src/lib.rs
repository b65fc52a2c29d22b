//! Evgraph Core - Graph engine for particle-physics event records
//!
//! This crate provides the event graph (vertices as nodes, particles as
//! directed edges), barcode bookkeeping and the traversal ranges used to
//! walk it.

pub mod error;
pub mod event;
pub mod particle;
pub mod traversal;
pub mod units;
pub mod value;
pub mod vertex;

pub use error::{Error, Result};
pub use event::{Event, EventInfo, FIRST_AUTO_PARTICLE_BARCODE};
pub use particle::{Particle, ParticleId};
pub use traversal::{EdgeIter, IteratorRange, ParticleIter, VertexIter};
pub use units::{LengthUnit, MomentumUnit};
pub use value::{CrossSection, Flow, FourVector, HeavyIon, PdfInfo, Polarization, WeightContainer};
pub use vertex::{Vertex, VertexId};
