//! Record tags and field encoding shared by the reader and writer

use crate::error::{CodecError, CodecResult};
use std::fmt::Write as _;
use std::str::SplitWhitespace;

/// Output precision used unless the stream is told otherwise
pub const DEFAULT_PRECISION: usize = 16;

/// Leading token of a record line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    Event,
    WeightNames,
    Units,
    CrossSection,
    HeavyIon,
    PdfInfo,
    Vertex,
    Particle,
}

impl RecordTag {
    /// Tag of `line`, or `None` if the line is free text
    pub fn of(line: &str) -> Option<Self> {
        let tag = match line.split_whitespace().next()? {
            "E" => Self::Event,
            "N" => Self::WeightNames,
            "U" => Self::Units,
            "C" => Self::CrossSection,
            "H" => Self::HeavyIon,
            "F" => Self::PdfInfo,
            "V" => Self::Vertex,
            "P" => Self::Particle,
            _ => return None,
        };
        Some(tag)
    }

    pub fn letter(self) -> char {
        match self {
            Self::Event => 'E',
            Self::WeightNames => 'N',
            Self::Units => 'U',
            Self::CrossSection => 'C',
            Self::HeavyIon => 'H',
            Self::PdfInfo => 'F',
            Self::Vertex => 'V',
            Self::Particle => 'P',
        }
    }

    /// Records that belong to the event header
    pub fn is_header(self) -> bool {
        matches!(
            self,
            Self::WeightNames | Self::Units | Self::CrossSection | Self::HeavyIon | Self::PdfInfo
        )
    }
}

/// Append a real field
///
/// Exact zero is written as `0`; anything else in scientific notation with
/// `precision` decimals and a signed, at least two digit exponent.
pub fn push_real(out: &mut String, value: f64, precision: usize) {
    out.push(' ');
    if value == 0.0 {
        out.push('0');
        return;
    }

    let formatted = format!("{:.*e}", precision, value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            let _ = write!(out, "{}e{}{:0>2}", mantissa, sign, digits);
        }
        // inf and NaN carry no exponent
        None => out.push_str(&formatted),
    }
}

/// Append an integer field
pub fn push_int(out: &mut String, value: i64) {
    let _ = write!(out, " {}", value);
}

/// Append a quoted string field
pub fn push_quoted(out: &mut String, value: &str) {
    out.push_str(" \"");
    out.push_str(value);
    out.push('"');
}

/// Whitespace-separated fields of one record, after its tag
pub struct Fields<'a> {
    tokens: SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Fields<'a> {
    /// Split `text`, skipping the leading record tag
    pub fn new(text: &'a str, line: usize) -> Self {
        let mut tokens = text.split_whitespace();
        tokens.next();
        Self { tokens, line }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn has_more(&self) -> bool {
        self.tokens.clone().next().is_some()
    }

    pub fn token(&mut self, what: &str) -> CodecResult<&'a str> {
        self.tokens
            .next()
            .ok_or_else(|| CodecError::malformed(self.line, format!("missing {}", what)))
    }

    pub fn i32(&mut self, what: &str) -> CodecResult<i32> {
        let token = self.token(what)?;
        token.parse().map_err(|_| self.invalid(what, token))
    }

    pub fn i64(&mut self, what: &str) -> CodecResult<i64> {
        let token = self.token(what)?;
        token.parse().map_err(|_| self.invalid(what, token))
    }

    pub fn f64(&mut self, what: &str) -> CodecResult<f64> {
        let token = self.token(what)?;
        token.parse().map_err(|_| self.invalid(what, token))
    }

    /// A non-negative count
    pub fn count(&mut self, what: &str) -> CodecResult<usize> {
        let token = self.token(what)?;
        token
            .parse::<usize>()
            .map_err(|_| self.invalid(what, token))
    }

    fn invalid(&self, what: &str, token: &str) -> CodecError {
        CodecError::malformed(self.line, format!("invalid {} '{}'", what, token))
    }
}

/// Parse the names of an `N` record: `N count "name" "name" ...`
pub fn parse_weight_names(text: &str, line: usize) -> CodecResult<Vec<String>> {
    let mut fields = Fields::new(text, line);
    let count = fields.count("weight name count")?;
    crate::limits::validate_weight_count(count)?;

    let rest = text
        .split_once('"')
        .map(|(_, rest)| rest)
        .unwrap_or_default();
    let mut names = Vec::with_capacity(count);
    let mut pieces = rest.split('"');
    while names.len() < count {
        let name = pieces
            .next()
            .ok_or_else(|| CodecError::malformed(line, "unterminated weight name"))?;
        names.push(name.to_string());
        // Separator between closing and opening quotes
        pieces.next();
    }

    if count > 0 && rest.matches('"').count() < 2 * count - 1 {
        return Err(CodecError::malformed(line, "unterminated weight name"));
    }
    Ok(names)
}
