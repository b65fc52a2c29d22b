//! Evgraph IO - Text codec for event records
//!
//! This crate reads and writes events as line-oriented `IO_GenEvent`
//! listings. Legacy `IO_Ascii` and `IO_ExtendedAscii` listings can be read.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod file;
pub mod format;
pub mod limits;
pub mod pending;
pub mod reader;
pub mod stream;
pub mod traits;
pub mod writer;

pub use error::{CodecError, CodecResult};
pub use file::GenEventFile;
pub use format::DEFAULT_PRECISION;
pub use limits::LimitError;
pub use reader::EventReader;
pub use stream::{Format, OpenMode, StreamIds, StreamInfo, StreamState};
pub use traits::{EventSink, EventSource, StreamStatus};
pub use writer::EventWriter;
