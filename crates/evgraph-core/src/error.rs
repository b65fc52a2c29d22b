//! Error types for Evgraph Core

use thiserror::Error;

/// Result type alias using Evgraph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Evgraph error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Vertex not found: {0}")]
    VertexNotFound(String),

    #[error("Particle not found: {0}")]
    ParticleNotFound(String),

    #[error("Handle {0} belongs to a different event")]
    ForeignHandle(String),

    #[error("Barcode already in use: {0}")]
    BarcodeInUse(i32),

    #[error("Invalid barcode {barcode}: {reason}")]
    InvalidBarcode { barcode: i32, reason: &'static str },

    #[error("Particle {particle} cannot be both incoming and outgoing at vertex {vertex}")]
    SelfLoop { particle: String, vertex: String },

    #[error("Particle {0} has no production vertex")]
    NoProductionVertex(String),

    #[error("Particle {0} has no end vertex")]
    NoEndVertex(String),

    #[error("Invalid iterator range for {context}: {range}")]
    InvalidRange { context: &'static str, range: String },

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),
}
