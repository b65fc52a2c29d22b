//! File-backed event stream

use crate::error::{CodecError, CodecResult};
use crate::reader::EventReader;
use crate::stream::{OpenMode, StreamIds, StreamInfo, StreamState};
use crate::traits::{EventSink, EventSource, StreamStatus};
use crate::writer::EventWriter;
use evgraph_core::{Event, LengthUnit, MomentumUnit};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

enum Direction {
    Input(EventReader<BufReader<File>>),
    Output(EventWriter<BufWriter<File>>),
}

/// An event file opened either for reading or for writing
///
/// Operations for the other direction fail with
/// [`CodecError::WrongMode`] and set the fail flag. An output file closes
/// its listing when dropped.
pub struct GenEventFile {
    path: PathBuf,
    mode: OpenMode,
    direction: Direction,
    wrong_mode: bool,
}

impl GenEventFile {
    pub fn open(path: impl AsRef<Path>, mode: OpenMode, ids: &mut StreamIds) -> CodecResult<Self> {
        mode.validate()?;
        let path = path.as_ref().to_path_buf();
        let info = ids.next_info();

        let direction = if mode.is_input() {
            Direction::Input(EventReader::new(BufReader::new(File::open(&path)?), info))
        } else {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .append(mode.append)
                .truncate(!mode.append)
                .open(&path)?;
            Direction::Output(EventWriter::new(BufWriter::new(file), info))
        };

        tracing::debug!(
            "Opened {} for {}",
            path.display(),
            if mode.is_input() { "reading" } else { "writing" }
        );
        Ok(Self {
            path,
            mode,
            direction,
            wrong_mode: false,
        })
    }

    /// Open for reading
    pub fn open_read(path: impl AsRef<Path>, ids: &mut StreamIds) -> CodecResult<Self> {
        Self::open(path, OpenMode::IN, ids)
    }

    /// Open for writing, truncating an existing file
    pub fn create(path: impl AsRef<Path>, ids: &mut StreamIds) -> CodecResult<Self> {
        Self::open(path, OpenMode::OUT | OpenMode::TRUNC, ids)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn stream_info(&self) -> &StreamInfo {
        match &self.direction {
            Direction::Input(reader) => reader.stream_info(),
            Direction::Output(writer) => writer.stream_info(),
        }
    }

    pub fn use_input_units(&mut self, momentum: MomentumUnit, length: LengthUnit) {
        if let Direction::Input(reader) = &mut self.direction {
            reader.use_input_units(momentum, length);
        }
    }

    pub fn read_event(&mut self) -> CodecResult<Option<Event>> {
        self.reader()?.read_event()
    }

    pub fn fill_next_event(&mut self, event: &mut Event) -> CodecResult<bool> {
        self.reader()?.fill_next_event(event)
    }

    pub fn write_event(&mut self, event: &Event) -> CodecResult<()> {
        self.writer()?.write_event(event)
    }

    pub fn write_comment(&mut self, comment: &str) -> CodecResult<()> {
        self.writer()?.write_comment(comment)
    }

    pub fn set_precision(&mut self, precision: usize) -> CodecResult<()> {
        self.writer()?.set_precision(precision)
    }

    /// Close the listing and flush; a no-op for input files
    pub fn finish(&mut self) -> CodecResult<()> {
        match &mut self.direction {
            Direction::Input(_) => Ok(()),
            Direction::Output(writer) => writer.finish(),
        }
    }

    pub fn rdstate(&self) -> StreamState {
        let mut state = match &self.direction {
            Direction::Input(reader) => reader.rdstate(),
            Direction::Output(writer) => writer.rdstate(),
        };
        state.fail |= self.wrong_mode;
        state
    }

    pub fn clear(&mut self) {
        self.wrong_mode = false;
        match &mut self.direction {
            Direction::Input(reader) => reader.clear(),
            Direction::Output(writer) => writer.clear(),
        }
    }

    fn reader(&mut self) -> CodecResult<&mut EventReader<BufReader<File>>> {
        match &mut self.direction {
            Direction::Input(reader) => Ok(reader),
            Direction::Output(_) => {
                self.wrong_mode = true;
                Err(CodecError::WrongMode(format!(
                    "{} is open for writing",
                    self.path.display()
                )))
            }
        }
    }

    fn writer(&mut self) -> CodecResult<&mut EventWriter<BufWriter<File>>> {
        match &mut self.direction {
            Direction::Output(writer) => Ok(writer),
            Direction::Input(_) => {
                self.wrong_mode = true;
                Err(CodecError::WrongMode(format!(
                    "{} is open for reading",
                    self.path.display()
                )))
            }
        }
    }
}

impl Drop for GenEventFile {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::warn!("Failed to close {}: {}", self.path.display(), e);
        }
    }
}

impl StreamStatus for GenEventFile {
    fn rdstate(&self) -> StreamState {
        GenEventFile::rdstate(self)
    }

    fn clear(&mut self) {
        GenEventFile::clear(self)
    }
}

impl EventSource for GenEventFile {
    fn fill_next_event(&mut self, event: &mut Event) -> CodecResult<bool> {
        GenEventFile::fill_next_event(self, event)
    }
}

impl EventSink for GenEventFile {
    fn write_event(&mut self, event: &Event) -> CodecResult<()> {
        GenEventFile::write_event(self, event)
    }

    fn write_comment(&mut self, comment: &str) -> CodecResult<()> {
        GenEventFile::write_comment(self, comment)
    }

    fn set_precision(&mut self, precision: usize) -> CodecResult<()> {
        GenEventFile::set_precision(self, precision)
    }

    fn finish(&mut self) -> CodecResult<()> {
        GenEventFile::finish(self)
    }
}
