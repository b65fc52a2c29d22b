//! Event stream trait definitions

use crate::error::CodecResult;
use crate::stream::StreamState;
use evgraph_core::Event;

/// Condition flags shared by every stream
pub trait StreamStatus {
    /// Current condition flags
    fn rdstate(&self) -> StreamState;

    /// Reset all condition flags
    fn clear(&mut self);
}

/// A stream events are read from
pub trait EventSource: StreamStatus {
    /// Replace `event` with the next event of the stream
    ///
    /// Returns `Ok(false)` once the input is exhausted. On error `event` is
    /// left untouched and the stream is positioned at the following event.
    fn fill_next_event(&mut self, event: &mut Event) -> CodecResult<bool>;
}

/// A stream events are written to
pub trait EventSink: StreamStatus {
    /// Append one event to the current listing, opening it if needed
    fn write_event(&mut self, event: &Event) -> CodecResult<()>;

    /// Write free text between listings
    fn write_comment(&mut self, comment: &str) -> CodecResult<()>;

    /// Decimals used for real fields
    fn set_precision(&mut self, precision: usize) -> CodecResult<()>;

    /// Close the open listing and flush
    fn finish(&mut self) -> CodecResult<()>;
}
