//! Event reader: parses listings back into events

use crate::error::{CodecError, CodecResult};
use crate::format::{parse_weight_names, Fields, RecordTag};
use crate::limits;
use crate::pending::PendingLinks;
use crate::stream::{Format, Marker, StreamInfo, StreamState};
use crate::traits::{EventSource, StreamStatus};
use evgraph_core::{
    CrossSection, Event, EventInfo, Flow, FourVector, HeavyIon, LengthUnit, MomentumUnit, Particle,
    PdfInfo, Polarization, Vertex, WeightContainer,
};
use std::io::BufRead;

/// Fields of an `E` record that refer to other records
struct EventLine {
    info: EventInfo,
    signal_vertex: i32,
    vertex_count: usize,
    beams: (i32, i32),
}

/// Reads events from any buffered input
///
/// Lines outside a listing are ignored, as are lines inside a listing whose
/// leading token is not a record tag. A malformed event is reported as an
/// error after the reader has skipped to the start of the next event, so
/// reading can simply continue.
pub struct EventReader<R> {
    input: R,
    info: StreamInfo,
    state: StreamState,
    line_number: usize,
    peeked: Option<(usize, String)>,
    in_listing: bool,
    events_read: usize,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(input: R, info: StreamInfo) -> Self {
        Self {
            input,
            info,
            state: StreamState::default(),
            line_number: 0,
            peeked: None,
            in_listing: false,
            events_read: 0,
        }
    }

    pub fn stream_info(&self) -> &StreamInfo {
        &self.info
    }

    /// Units for events that carry no `U` record
    pub fn use_input_units(&mut self, momentum: MomentumUnit, length: LengthUnit) {
        self.info.use_input_units(momentum, length);
    }

    /// Events successfully read so far
    pub fn events_read(&self) -> usize {
        self.events_read
    }

    pub fn rdstate(&self) -> StreamState {
        self.state
    }

    pub fn clear(&mut self) {
        self.state = StreamState::default();
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    /// Read the next event
    ///
    /// Returns `Ok(None)` at end of input.
    pub fn read_event(&mut self) -> CodecResult<Option<Event>> {
        while let Some((number, line)) = self.next_line()? {
            if let Some(marker) = Marker::parse(&line) {
                self.enter_marker(marker, number)?;
                continue;
            }
            if !self.in_listing || RecordTag::of(&line) != Some(RecordTag::Event) {
                tracing::trace!("Skipping line {}", number);
                continue;
            }

            return match self.read_block(number, &line) {
                Ok(event) => {
                    self.events_read += 1;
                    self.info.set_finished_first_event(true);
                    Ok(Some(event))
                }
                Err(err) if err.is_recoverable() => {
                    let skipped = self.recover()?;
                    tracing::warn!(
                        "Discarded malformed event starting at line {}: {} ({} lines skipped)",
                        number,
                        err,
                        skipped
                    );
                    Err(err)
                }
                Err(err) => Err(err),
            };
        }

        self.state.eof = true;
        Ok(None)
    }

    /// Replace `event` with the next event; `Ok(false)` at end of input
    ///
    /// `event` is only touched when a complete event was read.
    pub fn fill_next_event(&mut self, event: &mut Event) -> CodecResult<bool> {
        match self.read_event()? {
            Some(next) => {
                *event = next;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Line plumbing
    // ─────────────────────────────────────────────────────────────────────────

    fn read_raw(&mut self) -> CodecResult<Option<(usize, String)>> {
        let mut buf = String::new();
        match self.input.read_line(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => {
                self.line_number += 1;
                let len = buf.trim_end().len();
                buf.truncate(len);
                Ok(Some((self.line_number, buf)))
            }
            Err(e) => {
                self.state.fail = true;
                self.state.bad = true;
                Err(CodecError::Io(e))
            }
        }
    }

    fn next_line(&mut self) -> CodecResult<Option<(usize, String)>> {
        match self.peeked.take() {
            Some(line) => Ok(Some(line)),
            None => self.read_raw(),
        }
    }

    fn peek_line(&mut self) -> CodecResult<Option<&str>> {
        if self.peeked.is_none() {
            self.peeked = self.read_raw()?;
        }
        Ok(self.peeked.as_ref().map(|(_, line)| line.as_str()))
    }

    fn take_line(&mut self) -> CodecResult<(usize, String)> {
        let line_number = self.line_number;
        self.next_line()?
            .ok_or_else(|| CodecError::malformed(line_number, "unexpected end of input"))
    }

    /// Tag of the next record of the current event block
    ///
    /// Free text is consumed on the way. Returns `None` at the end of the
    /// block: another `E` record, a marker or end of input.
    fn peek_record(&mut self) -> CodecResult<Option<RecordTag>> {
        loop {
            let Some(line) = self.peek_line()? else {
                return Ok(None);
            };
            if Marker::parse(line).is_some() {
                return Ok(None);
            }
            match RecordTag::of(line) {
                Some(RecordTag::Event) => return Ok(None),
                Some(tag) => return Ok(Some(tag)),
                None => {
                    self.next_line()?;
                    tracing::trace!("Skipping comment line {}", self.line_number);
                }
            }
        }
    }

    fn expect_record(&mut self, tag: RecordTag) -> CodecResult<(usize, String)> {
        match self.peek_record()? {
            Some(found) if found == tag => self.take_line(),
            Some(found) => Err(CodecError::malformed(
                self.line_number,
                format!("expected {} record, found {}", tag.letter(), found.letter()),
            )),
            None => Err(CodecError::malformed(
                self.line_number,
                format!("expected {} record before the end of the event", tag.letter()),
            )),
        }
    }

    fn enter_marker(&mut self, marker: Marker, line: usize) -> CodecResult<()> {
        match marker {
            Marker::Start(format) => {
                self.in_listing = true;
                self.info.set_format(format);
                tracing::debug!("Entering {} listing at line {}", format, line);
            }
            Marker::End(_) => self.in_listing = false,
            Marker::ParticleDataStart => {
                let mut skipped = 0;
                while let Some((_, text)) = self.next_line()? {
                    if Marker::parse(&text) == Some(Marker::ParticleDataEnd) {
                        break;
                    }
                    skipped += 1;
                }
                tracing::debug!("Skipped particle data block of {} lines", skipped);
            }
            Marker::ParticleDataEnd | Marker::Comment => {}
        }
        Ok(())
    }

    /// Skip what is left of a broken event block
    fn recover(&mut self) -> CodecResult<usize> {
        let mut skipped = 0;
        while let Some(line) = self.peek_line()? {
            if Marker::parse(line).is_some() || RecordTag::of(line) == Some(RecordTag::Event) {
                break;
            }
            self.next_line()?;
            skipped += 1;
        }
        Ok(skipped)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Records
    // ─────────────────────────────────────────────────────────────────────────

    /// Build one event from its `E` record and the records after it
    fn read_block(&mut self, number: usize, header: &str) -> CodecResult<Event> {
        let format = self.info.format();
        let mut line = parse_event_line(header, number, format)?;
        let (mut momentum_unit, mut length_unit) = self.info.io_units();
        let mut weight_names = None;

        while let Some(tag) = self.peek_record()? {
            if !tag.is_header() {
                break;
            }
            let (n, text) = self.take_line()?;
            let mut fields = Fields::new(&text, n);
            match tag {
                RecordTag::WeightNames => weight_names = Some(parse_weight_names(&text, n)?),
                RecordTag::Units => {
                    momentum_unit = fields
                        .token("momentum unit")?
                        .parse()
                        .map_err(|e: evgraph_core::Error| CodecError::malformed(n, e.to_string()))?;
                    length_unit = fields
                        .token("length unit")?
                        .parse()
                        .map_err(|e: evgraph_core::Error| CodecError::malformed(n, e.to_string()))?;
                }
                RecordTag::CrossSection => {
                    line.info.cross_section = Some(CrossSection {
                        value: fields.f64("cross section")?,
                        error: fields.f64("cross section error")?,
                    });
                }
                RecordTag::HeavyIon => line.info.heavy_ion = Some(parse_heavy_ion(&mut fields)?),
                RecordTag::PdfInfo => line.info.pdf_info = Some(parse_pdf_info(&mut fields)?),
                _ => {}
            }
        }

        if let Some(names) = weight_names {
            if !line.info.weights.set_names(names) {
                return Err(CodecError::malformed(
                    number,
                    "weight names do not match the weight count",
                ));
            }
        }

        let mut event = Event::with_units(momentum_unit, length_unit);
        *event.info_mut() = line.info;
        let mut pending = PendingLinks::new();

        for _ in 0..line.vertex_count {
            let (n, text) = self.expect_record(RecordTag::Vertex)?;
            self.read_vertex(&mut event, &mut pending, n, &text, format)?;
        }
        if let Some(tag) = self.peek_record()? {
            return Err(CodecError::malformed(
                self.line_number,
                format!(
                    "unexpected {} record after {} vertices",
                    tag.letter(),
                    line.vertex_count
                ),
            ));
        }

        let linked = pending.resolve(&mut event)?;

        if line.signal_vertex != 0 {
            let vertex = event.barcode_to_vertex(line.signal_vertex).ok_or(
                CodecError::UnresolvedReference {
                    what: "signal process vertex",
                    barcode: line.signal_vertex,
                },
            )?;
            event.set_signal_process_vertex(Some(vertex))?;
        }

        let (first, second) = line.beams;
        if first != 0 && second != 0 {
            let lookup = |barcode: i32| {
                event
                    .barcode_to_particle(barcode)
                    .ok_or(CodecError::UnresolvedReference {
                        what: "beam particle",
                        barcode,
                    })
            };
            let beams = (lookup(first)?, lookup(second)?);
            event.set_beam_particles(Some(beams))?;
        }

        tracing::debug!(
            "Read event {}: {} vertices, {} particles, {} forward links",
            event.event_number(),
            event.vertices_size(),
            event.particles_size(),
            linked
        );
        Ok(event)
    }

    /// A `V` record and the particle records listed under it
    fn read_vertex(
        &mut self,
        event: &mut Event,
        pending: &mut PendingLinks,
        number: usize,
        text: &str,
        format: Format,
    ) -> CodecResult<()> {
        let mut fields = Fields::new(text, number);
        let barcode = fields.i32("vertex barcode")?;
        let status = fields.i32("vertex status")?;
        let position = FourVector::new(
            fields.f64("x")?,
            fields.f64("y")?,
            fields.f64("z")?,
            fields.f64("t")?,
        );
        let orphans = fields.count("orphan particle count")?;
        let outgoing = fields.count("outgoing particle count")?;
        limits::validate_particle_count(orphans.saturating_add(outgoing))?;
        let weights = read_weights(&mut fields)?;

        let vertex = event.create_vertex(Vertex::new(position, status).with_weights(weights));
        claim_barcode(event.suggest_vertex_barcode(vertex, barcode), barcode, number)?;
        event.add_vertex(vertex)?;

        for i in 0..orphans + outgoing {
            let (n, text) = self.expect_record(RecordTag::Particle)?;
            let (particle_barcode, record, end_vertex) = parse_particle(&text, n, format)?;
            let particle = event.create_particle(record);
            claim_barcode(
                event.suggest_particle_barcode(particle, particle_barcode),
                particle_barcode,
                n,
            )?;

            if i < orphans {
                if end_vertex != 0 && end_vertex != barcode {
                    return Err(CodecError::malformed(
                        n,
                        format!(
                            "incoming particle {} ends at vertex {} instead of {}",
                            particle_barcode, end_vertex, barcode
                        ),
                    ));
                }
                event.add_particle_in(vertex, particle)?;
            } else {
                event.add_particle_out(vertex, particle)?;
                if end_vertex != 0 {
                    pending.add(particle_barcode, particle, end_vertex);
                }
            }
        }
        Ok(())
    }
}

impl<R: BufRead> StreamStatus for EventReader<R> {
    fn rdstate(&self) -> StreamState {
        self.state
    }

    fn clear(&mut self) {
        self.state = StreamState::default();
    }
}

impl<R: BufRead> EventSource for EventReader<R> {
    fn fill_next_event(&mut self, event: &mut Event) -> CodecResult<bool> {
        EventReader::fill_next_event(self, event)
    }
}

/// Successive events; malformed ones come out as errors and reading
/// carries on with the next event
impl<R: BufRead> Iterator for EventReader<R> {
    type Item = CodecResult<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.eof || self.state.bad {
            return None;
        }
        self.read_event().transpose()
    }
}

fn claim_barcode(result: evgraph_core::Result<()>, barcode: i32, line: usize) -> CodecResult<()> {
    match result {
        Ok(()) => Ok(()),
        Err(evgraph_core::Error::BarcodeInUse(taken)) => Err(CodecError::DuplicateBarcode(taken)),
        Err(evgraph_core::Error::InvalidBarcode { reason, .. }) => Err(CodecError::malformed(
            line,
            format!("barcode {}: {}", barcode, reason),
        )),
        Err(e) => Err(e.into()),
    }
}

fn read_weights(fields: &mut Fields<'_>) -> CodecResult<WeightContainer> {
    let count = fields.count("weight count")?;
    limits::validate_weight_count(count)?;
    let values = (0..count)
        .map(|_| fields.f64("weight"))
        .collect::<CodecResult<Vec<f64>>>()?;
    Ok(WeightContainer::from_values(values))
}

fn parse_event_line(text: &str, number: usize, format: Format) -> CodecResult<EventLine> {
    let mut fields = Fields::new(text, number);
    let mut info = EventInfo {
        event_number: fields.i32("event number")?,
        ..EventInfo::default()
    };
    if format.has_mpi_and_beams() {
        info.mpi = fields.i32("mpi")?;
    }
    info.event_scale = fields.f64("event scale")?;
    info.alpha_qcd = fields.f64("alpha_qcd")?;
    info.alpha_qed = fields.f64("alpha_qed")?;
    info.signal_process_id = fields.i32("signal process id")?;
    let signal_vertex = fields.i32("signal process vertex")?;

    let vertex_count = fields.count("vertex count")?;
    limits::validate_vertex_count(vertex_count)?;

    let beams = if format.has_mpi_and_beams() {
        (fields.i32("beam particle")?, fields.i32("beam particle")?)
    } else {
        (0, 0)
    };

    let random_count = fields.count("random state count")?;
    limits::validate_random_state_count(random_count)?;
    info.random_states = (0..random_count)
        .map(|_| fields.i64("random state"))
        .collect::<CodecResult<Vec<i64>>>()?;
    info.weights = read_weights(&mut fields)?;

    Ok(EventLine {
        info,
        signal_vertex,
        vertex_count,
        beams,
    })
}

/// Barcode, record and end-vertex barcode of a `P` record
fn parse_particle(text: &str, number: usize, format: Format) -> CodecResult<(i32, Particle, i32)> {
    let mut fields = Fields::new(text, number);
    let barcode = fields.i32("particle barcode")?;
    let pdg_id = fields.i32("particle type")?;
    let momentum = FourVector::new(
        fields.f64("px")?,
        fields.f64("py")?,
        fields.f64("pz")?,
        fields.f64("e")?,
    );
    let generated_mass = if format.has_generated_mass() {
        fields.f64("generated mass")?
    } else {
        momentum.m()
    };
    let status = fields.i32("particle status")?;
    let theta = fields.f64("theta")?;
    let phi = fields.f64("phi")?;
    let end_vertex = fields.i32("end vertex barcode")?;

    let flow_count = fields.count("flow count")?;
    limits::validate_flow_count(flow_count)?;
    let mut flow = Flow::new();
    for _ in 0..flow_count {
        let index = fields.i32("flow index")?;
        let code = fields.i32("flow code")?;
        flow.set_icode(index, code);
    }

    let polarization = if theta != 0.0 || phi != 0.0 {
        Polarization::new(theta, phi)
    } else {
        Polarization::undefined()
    };

    let particle = Particle::new(momentum, pdg_id, status)
        .with_generated_mass(generated_mass)
        .with_polarization(polarization)
        .with_flow(flow);
    Ok((barcode, particle, end_vertex))
}

fn parse_heavy_ion(fields: &mut Fields<'_>) -> CodecResult<HeavyIon> {
    Ok(HeavyIon {
        ncoll_hard: fields.i32("hard collisions")?,
        npart_proj: fields.i32("projectile participants")?,
        npart_targ: fields.i32("target participants")?,
        ncoll: fields.i32("collisions")?,
        spectator_neutrons: fields.i32("spectator neutrons")?,
        spectator_protons: fields.i32("spectator protons")?,
        n_nwounded_collisions: fields.i32("N-Nwounded collisions")?,
        nwounded_n_collisions: fields.i32("Nwounded-N collisions")?,
        nwounded_nwounded_collisions: fields.i32("Nwounded-Nwounded collisions")?,
        impact_parameter: fields.f64("impact parameter")?,
        event_plane_angle: fields.f64("event plane angle")?,
        eccentricity: fields.f64("eccentricity")?,
        sigma_inel_nn: fields.f64("inelastic cross section")?,
    })
}

/// Seven fields, optionally followed by the two PDF set ids
fn parse_pdf_info(fields: &mut Fields<'_>) -> CodecResult<PdfInfo> {
    let mut pdf = PdfInfo {
        id1: fields.i32("parton id")?,
        id2: fields.i32("parton id")?,
        x1: fields.f64("x1")?,
        x2: fields.f64("x2")?,
        scale: fields.f64("pdf scale")?,
        pdf1: fields.f64("pdf1")?,
        pdf2: fields.f64("pdf2")?,
        ..PdfInfo::default()
    };
    if fields.has_more() {
        pdf.pdf_id1 = fields.i32("pdf set id")?;
        pdf.pdf_id2 = fields.i32("pdf set id")?;
    }
    Ok(pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamIds;
    use evgraph_core::IteratorRange;

    fn reader(text: &str) -> EventReader<&[u8]> {
        EventReader::new(text.as_bytes(), StreamIds::new().next_info())
    }

    const SINGLE_VERTEX: &str = "\
HepMC::IO_GenEvent-START_EVENT_LISTING
E 0 -1 -1 -1 -1 0 0 1 0 0 0 0
U GEV MM
V -1 0 0 0 0 0 1 1 0
P 10001 11 0 0 1 1 0 1 0 0 -1 0
P 10002 -11 0 0 -1 1 0 1 0 0 0 0
HepMC::IO_GenEvent-END_EVENT_LISTING
";

    #[test]
    fn test_single_vertex_event() {
        let mut r = reader(SINGLE_VERTEX);
        let event = r.read_event().unwrap().unwrap();

        assert_eq!(event.vertices_size(), 1);
        assert_eq!(event.particles_size(), 2);
        let v = event.barcode_to_vertex(-1).unwrap();
        let e_minus = event.barcode_to_particle(10001).unwrap();
        let e_plus = event.barcode_to_particle(10002).unwrap();
        assert_eq!(event.vertex(v).unwrap().particles_in(), &[e_minus]);
        assert_eq!(event.vertex(v).unwrap().particles_out(), &[e_plus]);
        assert_eq!(event.particle(e_minus).unwrap().pdg_id(), 11);
        assert_eq!(event.particle(e_plus).unwrap().momentum().pz(), -1.0);

        assert!(r.read_event().unwrap().is_none());
        assert!(r.rdstate().eof);
        assert_eq!(r.events_read(), 1);
    }

    #[test]
    fn test_forward_reference_resolved() {
        let text = "\
HepMC::IO_GenEvent-START_EVENT_LISTING
E 1 -1 0 0 0 0 0 2 0 0 0 0
V -1 0 0 0 0 0 1 1 0
P 1 2212 0 0 7000 7000 0 4 0 0 -1 0
P 3 23 0 0 0 91.2 91.2 2 0 0 -2 0
V -2 0 0 0 0 0 0 2 0
P 4 11 0 0 45 45 0 1 0 0 0 0
P 5 -11 0 0 -45 45 0 1 0 0 0 0
HepMC::IO_GenEvent-END_EVENT_LISTING
";
        let event = reader(text).read_event().unwrap().unwrap();
        let z = event.barcode_to_particle(3).unwrap();
        let decay = event.barcode_to_vertex(-2).unwrap();
        assert_eq!(event.particle(z).unwrap().end_vertex(), Some(decay));
        assert_eq!(event.vertex(decay).unwrap().particles_in(), &[z]);

        let descendants: Vec<_> = event
            .vertex_range(event.barcode_to_vertex(-1).unwrap(), IteratorRange::Descendants)
            .unwrap()
            .collect();
        assert_eq!(descendants.len(), 2);
        assert_eq!(event.particles().count(), 4);
    }

    #[test]
    fn test_header_records() {
        let text = "\
HepMC::IO_GenEvent-START_EVENT_LISTING
E 3 2 9.1e+01 1.2e-01 7.8e-03 11 -1 1 10001 10002 2 12345 67890 2 1.0 0.5
N 2 \"nominal\" \"scale up\"
U MEV CM
C 1.5e+03 2.0e+01
H 1 2 3 4 5 6 7 8 9 1.5 0.2 0.3 70
F 21 -2 0.1 0.2 91.2 1.5 0.8
V -1 0 1 2 3 4 2 1 1 0.7
P 10001 2212 0 0 7000 7000 0.938 4 0 0 -1 0
P 10002 2212 0 0 -7000 7000 0.938 4 0 0 -1 0
P 10003 23 0 0 0 91.2 91.2 2 0.5 0.25 0 2 1 501 2 502
";
        let event = reader(text).read_event().unwrap().unwrap();
        let info = event.info();

        assert_eq!(info.event_number, 3);
        assert_eq!(info.mpi, 2);
        assert_eq!(info.event_scale, 91.0);
        assert_eq!(info.signal_process_id, 11);
        assert_eq!(info.random_states, vec![12345, 67890]);
        assert_eq!(info.weights.by_name("scale up"), Some(0.5));
        assert_eq!(event.momentum_unit(), MomentumUnit::MeV);
        assert_eq!(event.length_unit(), LengthUnit::Cm);
        assert_eq!(info.cross_section.unwrap().value, 1500.0);
        assert_eq!(info.heavy_ion.unwrap().ncoll, 4);
        assert_eq!(info.heavy_ion.unwrap().sigma_inel_nn, 70.0);
        let pdf = info.pdf_info.unwrap();
        assert_eq!((pdf.id1, pdf.id2, pdf.pdf_id1), (21, -2, 0));

        let v = event.barcode_to_vertex(-1).unwrap();
        assert_eq!(event.signal_process_vertex(), Some(v));
        assert_eq!(event.vertex(v).unwrap().position().t, 4.0);
        assert_eq!(event.vertex(v).unwrap().weights().values(), &[0.7]);

        let beams = event.beam_particles().unwrap();
        assert_eq!(beams.0, event.barcode_to_particle(10001).unwrap());

        let z = event.particle(event.barcode_to_particle(10003).unwrap()).unwrap();
        assert_eq!(z.flow().icode(2), 502);
        assert!(z.polarization().is_defined());
        assert_eq!(z.polarization().phi(), 0.25);
        assert_eq!(z.generated_mass(), 91.2);
    }

    #[test]
    fn test_malformed_event_recovers() {
        let text = "\
HepMC::IO_GenEvent-START_EVENT_LISTING
E 1 -1 0 0 0 0 0 1 0 0 0 0
V -1 0 0 0 0 0 1 1 0
P 1 11 garbage
P 2 -11 0 0 -1 1 0 1 0 0 0 0
E 2 -1 0 0 0 0 0 1 0 0 0 0
V -1 0 0 0 0 0 1 1 0
P 1 11 0 0 1 1 0 1 0 0 -1 0
P 2 -11 0 0 -1 1 0 1 0 0 0 0
HepMC::IO_GenEvent-END_EVENT_LISTING
";
        let mut r = reader(text);
        let mut event = Event::new();
        event.info_mut().event_number = 99;

        let err = r.fill_next_event(&mut event).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { line: 4, .. }));
        // The caller's event is left alone
        assert_eq!(event.event_number(), 99);
        assert!(r.rdstate().good());

        assert!(r.fill_next_event(&mut event).unwrap());
        assert_eq!(event.event_number(), 2);
        assert_eq!(event.particles_size(), 2);
        assert!(!r.fill_next_event(&mut event).unwrap());
    }

    #[test]
    fn test_unresolved_reference_rejects_event() {
        let text = "\
HepMC::IO_GenEvent-START_EVENT_LISTING
E 1 -1 0 0 0 0 0 1 0 0 0 0
V -1 0 0 0 0 0 0 1 0
P 1 23 0 0 0 91 91 2 0 0 -5 0
E 2 -1 0 0 0 0 0 1 0 0 0 0
V -1 0 0 0 0 0 0 1 0
P 1 22 0 0 1 1 0 1 0 0 0 0
";
        let results: Vec<_> = reader(text).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0],
            Err(CodecError::UnresolvedReference { barcode: -5, .. })
        ));
        assert_eq!(results[1].as_ref().unwrap().event_number(), 2);
    }

    #[test]
    fn test_duplicate_barcode_rejected() {
        let text = "\
HepMC::IO_GenEvent-START_EVENT_LISTING
E 1 -1 0 0 0 0 0 1 0 0 0 0
V -1 0 0 0 0 0 0 2 0
P 7 22 0 0 1 1 0 1 0 0 0 0
P 7 22 0 0 2 2 0 1 0 0 0 0
";
        let err = reader(text).read_event().unwrap_err();
        assert!(matches!(err, CodecError::DuplicateBarcode(7)));
    }

    #[test]
    fn test_vertex_count_must_match() {
        let missing = "\
HepMC::IO_GenEvent-START_EVENT_LISTING
E 1 -1 0 0 0 0 0 2 0 0 0 0
V -1 0 0 0 0 0 0 1 0
P 1 22 0 0 1 1 0 1 0 0 0 0
HepMC::IO_GenEvent-END_EVENT_LISTING
";
        assert!(matches!(
            reader(missing).read_event(),
            Err(CodecError::Malformed { .. })
        ));

        let extra = "\
HepMC::IO_GenEvent-START_EVENT_LISTING
E 1 -1 0 0 0 0 0 1 0 0 0 0
V -1 0 0 0 0 0 0 1 0
P 1 22 0 0 1 1 0 1 0 0 0 0
P 2 22 0 0 1 1 0 1 0 0 0 0
";
        assert!(matches!(
            reader(extra).read_event(),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn test_legacy_ascii_listing() {
        let text = "\
HepMC::IO_Ascii-START_PARTICLE_DATA
D 11 electron 0.000511
HepMC::IO_Ascii-END_PARTICLE_DATA
HepMC::IO_Ascii-START_EVENT_LISTING
E 7 91.2 0.118 0.0078 1 -1 1 0 0
V -1 0 0 0 0 0 1 1 0
P 1 11 0 0 3 5 1 0 0 -1 0
P 2 -11 0 0 -3 5 1 0 0 0 0
HepMC::IO_Ascii-END_EVENT_LISTING
";
        let mut r = reader(text);
        let event = r.read_event().unwrap().unwrap();
        assert_eq!(r.stream_info().format(), Format::Ascii);
        assert_eq!(event.event_number(), 7);
        assert_eq!(event.info().mpi, -1);
        assert_eq!(event.info().event_scale, 91.2);
        assert!(event.signal_process_vertex().is_some());
        assert!(event.beam_particles().is_none());

        let electron = event.particle(event.barcode_to_particle(1).unwrap()).unwrap();
        assert_eq!(electron.generated_mass(), 4.0);
    }

    #[test]
    fn test_comments_and_stray_text_ignored() {
        let text = "\
some preamble that is not part of any listing
V -1 0 0 0 0 0 0 0 0
HepMC::IO_GenEvent-START_EVENT_LISTING
E 1 -1 0 0 0 0 0 1 0 0 0 0
this line is free text
V -1 0 0 0 0 0 0 1 0
P 1 22 0 0 1 1 0 1 0 0 0 0
HepMC::IO_GenEvent-END_EVENT_LISTING
HepMC::IO_GenEvent-COMMENT
E is for electron
";
        let mut r = reader(text);
        let event = r.read_event().unwrap().unwrap();
        assert_eq!(event.particles_size(), 1);
        assert!(r.read_event().unwrap().is_none());
    }

    #[test]
    fn test_input_units_apply_without_unit_record() {
        let text = "\
HepMC::IO_GenEvent-START_EVENT_LISTING
E 1 -1 0 0 0 0 0 1 0 0 0 0
V -1 0 0 0 0 0 0 1 0
P 1 22 0 0 1 1 0 1 0 0 0 0
";
        let mut r = reader(text);
        r.use_input_units(MomentumUnit::MeV, LengthUnit::Cm);
        let event = r.read_event().unwrap().unwrap();
        assert_eq!(event.momentum_unit(), MomentumUnit::MeV);
        assert_eq!(event.length_unit(), LengthUnit::Cm);
    }

    #[test]
    fn test_orphan_must_end_at_its_vertex() {
        let text = "\
HepMC::IO_GenEvent-START_EVENT_LISTING
E 1 -1 0 0 0 0 0 1 0 0 0 0
V -1 0 0 0 0 0 1 0 0
P 1 22 0 0 1 1 0 1 0 0 -3 0
";
        assert!(matches!(
            reader(text).read_event(),
            Err(CodecError::Malformed { line: 4, .. })
        ));
    }
}
