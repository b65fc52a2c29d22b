//! Listing markers, open modes and per-stream bookkeeping

use crate::error::{CodecError, CodecResult};
use evgraph_core::{LengthUnit, MomentumUnit};
use serde::{Deserialize, Serialize};

pub const GENEVENT_START: &str = "HepMC::IO_GenEvent-START_EVENT_LISTING";
pub const GENEVENT_END: &str = "HepMC::IO_GenEvent-END_EVENT_LISTING";
pub const ASCII_START: &str = "HepMC::IO_Ascii-START_EVENT_LISTING";
pub const ASCII_END: &str = "HepMC::IO_Ascii-END_EVENT_LISTING";
pub const ASCII_PDT_START: &str = "HepMC::IO_Ascii-START_PARTICLE_DATA";
pub const ASCII_PDT_END: &str = "HepMC::IO_Ascii-END_PARTICLE_DATA";
pub const EXTENDED_ASCII_START: &str = "HepMC::IO_ExtendedAscii-START_EVENT_LISTING";
pub const EXTENDED_ASCII_END: &str = "HepMC::IO_ExtendedAscii-END_EVENT_LISTING";
pub const EXTENDED_ASCII_PDT_START: &str = "HepMC::IO_ExtendedAscii-START_PARTICLE_DATA";
pub const EXTENDED_ASCII_PDT_END: &str = "HepMC::IO_ExtendedAscii-END_PARTICLE_DATA";

/// Precedes every comment written through a writer
pub const COMMENT_KEY: &str = "HepMC::IO_GenEvent-COMMENT";

/// Strings a comment may never contain
pub const RESERVED_MARKERS: [&str; 11] = [
    GENEVENT_START,
    GENEVENT_END,
    ASCII_START,
    ASCII_END,
    ASCII_PDT_START,
    ASCII_PDT_END,
    EXTENDED_ASCII_START,
    EXTENDED_ASCII_END,
    EXTENDED_ASCII_PDT_START,
    EXTENDED_ASCII_PDT_END,
    COMMENT_KEY,
];

/// Record layout generation of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Current layout; the only one written
    #[default]
    GenEvent,
    /// Oldest layout: no MPI or beams on E, no generated mass on P
    Ascii,
    /// Current E/P layout without the N, U and C records
    ExtendedAscii,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Self::GenEvent => "IO_GenEvent",
            Self::Ascii => "IO_Ascii",
            Self::ExtendedAscii => "IO_ExtendedAscii",
        }
    }

    pub fn start_marker(self) -> &'static str {
        match self {
            Self::GenEvent => GENEVENT_START,
            Self::Ascii => ASCII_START,
            Self::ExtendedAscii => EXTENDED_ASCII_START,
        }
    }

    pub fn end_marker(self) -> &'static str {
        match self {
            Self::GenEvent => GENEVENT_END,
            Self::Ascii => ASCII_END,
            Self::ExtendedAscii => EXTENDED_ASCII_END,
        }
    }

    /// E records carry the MPI count and beam barcodes
    pub fn has_mpi_and_beams(self) -> bool {
        !matches!(self, Self::Ascii)
    }

    /// P records carry the generated mass
    pub fn has_generated_mass(self) -> bool {
        !matches!(self, Self::Ascii)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A reserved line recognised by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Start(Format),
    End(Format),
    ParticleDataStart,
    ParticleDataEnd,
    Comment,
}

impl Marker {
    /// Classify a line; markers must stand alone on their line
    pub fn parse(line: &str) -> Option<Self> {
        let marker = match line.trim() {
            GENEVENT_START => Self::Start(Format::GenEvent),
            GENEVENT_END => Self::End(Format::GenEvent),
            ASCII_START => Self::Start(Format::Ascii),
            ASCII_END => Self::End(Format::Ascii),
            EXTENDED_ASCII_START => Self::Start(Format::ExtendedAscii),
            EXTENDED_ASCII_END => Self::End(Format::ExtendedAscii),
            ASCII_PDT_START | EXTENDED_ASCII_PDT_START => Self::ParticleDataStart,
            ASCII_PDT_END | EXTENDED_ASCII_PDT_END => Self::ParticleDataEnd,
            COMMENT_KEY => Self::Comment,
            _ => return None,
        };
        Some(marker)
    }
}

/// Reserved marker contained in `text`, if any
pub fn find_reserved_marker(text: &str) -> Option<&'static str> {
    RESERVED_MARKERS
        .into_iter()
        .find(|marker| text.contains(*marker))
}

/// How a file stream is opened
///
/// Flags combine with `|`. Input cannot be combined with any output flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpenMode {
    pub input: bool,
    pub output: bool,
    pub truncate: bool,
    pub append: bool,
}

impl OpenMode {
    pub const IN: Self = Self {
        input: true,
        output: false,
        truncate: false,
        append: false,
    };
    pub const OUT: Self = Self {
        input: false,
        output: true,
        truncate: false,
        append: false,
    };
    pub const TRUNC: Self = Self {
        input: false,
        output: false,
        truncate: true,
        append: false,
    };
    pub const APP: Self = Self {
        input: false,
        output: false,
        truncate: false,
        append: true,
    };

    pub fn is_input(self) -> bool {
        self.input
    }

    /// Any of the writing flags is set
    pub fn is_output(self) -> bool {
        self.output || self.truncate || self.append
    }

    /// Reject empty modes and simultaneous input and output
    pub fn validate(self) -> CodecResult<()> {
        match (self.is_input(), self.is_output()) {
            (true, true) => Err(CodecError::WrongMode(
                "simultaneous input and output is not allowed".to_string(),
            )),
            (false, false) => Err(CodecError::WrongMode(
                "open mode must include input or output".to_string(),
            )),
            _ if self.truncate && self.append => Err(CodecError::WrongMode(
                "truncate and append are exclusive".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl std::ops::BitOr for OpenMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            input: self.input || rhs.input,
            output: self.output || rhs.output,
            truncate: self.truncate || rhs.truncate,
            append: self.append || rhs.append,
        }
    }
}

/// Stream condition flags
///
/// Malformed events do not set any flag; they are reported per read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StreamState {
    /// Input is exhausted
    pub eof: bool,
    /// An operation could not be carried out
    pub fail: bool,
    /// The underlying reader or writer reported an error
    pub bad: bool,
}

impl StreamState {
    pub fn good(&self) -> bool {
        !(self.eof || self.fail || self.bad)
    }
}

/// Per-stream bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    stream_id: u32,
    format: Format,
    finished_first_event: bool,
    io_momentum_unit: MomentumUnit,
    io_length_unit: LengthUnit,
}

impl StreamInfo {
    pub fn new(stream_id: u32) -> Self {
        Self {
            stream_id,
            format: Format::GenEvent,
            finished_first_event: false,
            io_momentum_unit: MomentumUnit::default(),
            io_length_unit: LengthUnit::default(),
        }
    }

    pub fn stream_id(&self) -> u32 {
        self.stream_id
    }

    /// Layout of the listing currently being read or written
    pub fn format(&self) -> Format {
        self.format
    }

    pub(crate) fn set_format(&mut self, format: Format) {
        self.format = format;
    }

    /// True once one event went through this stream
    pub fn finished_first_event(&self) -> bool {
        self.finished_first_event
    }

    pub(crate) fn set_finished_first_event(&mut self, finished: bool) {
        self.finished_first_event = finished;
    }

    /// Units assumed for events that carry no unit record
    pub fn io_units(&self) -> (MomentumUnit, LengthUnit) {
        (self.io_momentum_unit, self.io_length_unit)
    }

    pub fn use_input_units(&mut self, momentum: MomentumUnit, length: LengthUnit) {
        self.io_momentum_unit = momentum;
        self.io_length_unit = length;
    }
}

/// Hands out stream ids; owned by whoever opens streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamIds {
    next: u32,
}

impl Default for StreamIds {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Start counting at `first`
    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    pub fn next_info(&mut self) -> StreamInfo {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        StreamInfo::new(id)
    }
}
