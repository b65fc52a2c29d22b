//! CLI command implementations

pub mod check;
pub mod completions;
pub mod config;
pub mod convert;
pub mod stats;
pub mod traverse;

use evgraph_core::Event;
use evgraph_io::{CodecError, GenEventFile};

/// Feed every event of `file` to `visit`, with its position in the file
///
/// Malformed events are passed on as errors; IO errors stop the scan.
pub fn read_all(
    file: &mut GenEventFile,
    mut visit: impl FnMut(usize, Result<Event, CodecError>) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut index = 0;
    loop {
        match file.read_event() {
            Ok(Some(event)) => visit(index, Ok(event))?,
            Ok(None) => return Ok(()),
            Err(e) if e.is_recoverable() => visit(index, Err(e))?,
            Err(e) => return Err(e.into()),
        }
        index += 1;
    }
}
