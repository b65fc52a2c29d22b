//! Codec error types

use crate::limits::LimitError;
use thiserror::Error;

/// Result type alias for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Codec-specific error types
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Unresolved {what} barcode {barcode}")]
    UnresolvedReference { what: &'static str, barcode: i32 },

    #[error("Duplicate barcode in event: {0}")]
    DuplicateBarcode(i32),

    #[error("Operation not allowed on this stream: {0}")]
    WrongMode(String),

    #[error("Comment contains reserved marker: {0}")]
    ReservedMarker(String),

    #[error("Limit exceeded: {0}")]
    Limit(#[from] LimitError),

    #[error(transparent)]
    Core(#[from] evgraph_core::Error),
}

impl CodecError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }

    /// True for errors caused by the content of one event; the stream can
    /// continue with the next event
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::WrongMode(_))
    }
}
