//! Event writer: encodes events as `IO_GenEvent` listings

use crate::error::{CodecError, CodecResult};
use crate::format::{push_int, push_quoted, push_real, DEFAULT_PRECISION};
use crate::limits;
use crate::stream::{find_reserved_marker, Format, StreamInfo, StreamState, COMMENT_KEY};
use crate::traits::{EventSink, StreamStatus};
use evgraph_core::{Event, Particle, Vertex, VertexId, WeightContainer};
use std::io::Write;

/// Writes events to any output
///
/// The start marker goes out with the first event of a listing and the end
/// marker with [`finish`](Self::finish) or the next comment. Dropping the
/// writer does not close the listing.
pub struct EventWriter<W: Write> {
    output: W,
    info: StreamInfo,
    state: StreamState,
    precision: usize,
    listing_open: bool,
    events_written: usize,
}

impl<W: Write> EventWriter<W> {
    pub fn new(output: W, info: StreamInfo) -> Self {
        Self {
            output,
            info,
            state: StreamState::default(),
            precision: DEFAULT_PRECISION,
            listing_open: false,
            events_written: 0,
        }
    }

    pub fn stream_info(&self) -> &StreamInfo {
        &self.info
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn set_precision(&mut self, precision: usize) -> CodecResult<()> {
        limits::validate_precision(precision)?;
        self.precision = precision;
        Ok(())
    }

    pub fn events_written(&self) -> usize {
        self.events_written
    }

    pub fn rdstate(&self) -> StreamState {
        self.state
    }

    pub fn clear(&mut self) {
        self.state = StreamState::default();
    }

    /// Append `event` to the current listing
    pub fn write_event(&mut self, event: &Event) -> CodecResult<()> {
        let mut out = String::new();
        if !self.listing_open {
            out.push_str(Format::GenEvent.start_marker());
            out.push('\n');
        }
        self.encode_event(&mut out, event)?;
        self.emit(out.as_bytes())?;

        self.listing_open = true;
        self.events_written += 1;
        self.info.set_finished_first_event(true);
        tracing::debug!(
            "Wrote event {} to stream {}",
            event.event_number(),
            self.info.stream_id()
        );
        Ok(())
    }

    /// Write free text outside any listing
    pub fn write_comment(&mut self, comment: &str) -> CodecResult<()> {
        if let Some(marker) = find_reserved_marker(comment) {
            self.state.fail = true;
            return Err(CodecError::ReservedMarker(marker.to_string()));
        }

        let mut out = String::new();
        if self.listing_open {
            out.push_str(Format::GenEvent.end_marker());
            out.push('\n');
        }
        out.push_str(COMMENT_KEY);
        out.push('\n');
        out.push_str(comment);
        out.push('\n');
        self.emit(out.as_bytes())?;
        self.listing_open = false;
        Ok(())
    }

    /// Close the open listing, if any, and flush
    pub fn finish(&mut self) -> CodecResult<()> {
        if self.listing_open {
            let mut out = String::from(Format::GenEvent.end_marker());
            out.push('\n');
            self.emit(out.as_bytes())?;
            self.listing_open = false;
        }
        self.output.flush().map_err(|e| self.io_failure(e))
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn emit(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.output.write_all(bytes).map_err(|e| self.io_failure(e))
    }

    fn io_failure(&mut self, err: std::io::Error) -> CodecError {
        self.state.fail = true;
        self.state.bad = true;
        CodecError::Io(err)
    }

    fn encode_event(&self, out: &mut String, event: &Event) -> CodecResult<()> {
        let precision = self.precision;
        let info = event.info();
        let vertices: Vec<VertexId> = event.vertices().collect();

        let signal_vertex = match event.signal_process_vertex() {
            Some(v) => event.vertex(v)?.barcode(),
            None => 0,
        };
        let beams = match event.beam_particles() {
            Some((first, second)) => (
                event.particle(first)?.barcode(),
                event.particle(second)?.barcode(),
            ),
            None => (0, 0),
        };

        out.push('E');
        push_int(out, info.event_number.into());
        push_int(out, info.mpi.into());
        push_real(out, info.event_scale, precision);
        push_real(out, info.alpha_qcd, precision);
        push_real(out, info.alpha_qed, precision);
        push_int(out, info.signal_process_id.into());
        push_int(out, signal_vertex.into());
        push_int(out, vertices.len() as i64);
        push_int(out, beams.0.into());
        push_int(out, beams.1.into());
        push_int(out, info.random_states.len() as i64);
        for state in &info.random_states {
            push_int(out, *state);
        }
        push_weights(out, &info.weights, precision);
        out.push('\n');

        if !info.weights.is_empty() {
            out.push('N');
            push_int(out, info.weights.len() as i64);
            for name in info.weights.names() {
                push_quoted(out, &name);
            }
            out.push('\n');
        }

        out.push('U');
        out.push(' ');
        out.push_str(event.momentum_unit().name());
        out.push(' ');
        out.push_str(event.length_unit().name());
        out.push('\n');

        if let Some(xs) = &info.cross_section {
            out.push('C');
            push_real(out, xs.value, precision);
            push_real(out, xs.error, precision);
            out.push('\n');
        }

        if let Some(hi) = &info.heavy_ion {
            out.push('H');
            for value in [
                hi.ncoll_hard,
                hi.npart_proj,
                hi.npart_targ,
                hi.ncoll,
                hi.spectator_neutrons,
                hi.spectator_protons,
                hi.n_nwounded_collisions,
                hi.nwounded_n_collisions,
                hi.nwounded_nwounded_collisions,
            ] {
                push_int(out, value.into());
            }
            for value in [
                hi.impact_parameter,
                hi.event_plane_angle,
                hi.eccentricity,
                hi.sigma_inel_nn,
            ] {
                push_real(out, value, precision);
            }
            out.push('\n');
        }

        if let Some(pdf) = &info.pdf_info {
            out.push('F');
            push_int(out, pdf.id1.into());
            push_int(out, pdf.id2.into());
            for value in [pdf.x1, pdf.x2, pdf.scale, pdf.pdf1, pdf.pdf2] {
                push_real(out, value, precision);
            }
            push_int(out, pdf.pdf_id1.into());
            push_int(out, pdf.pdf_id2.into());
            out.push('\n');
        }

        for id in vertices {
            self.encode_vertex(out, event, event.vertex(id)?)?;
        }
        Ok(())
    }

    /// A `V` record, its orphan incoming particles, then its outgoing ones
    fn encode_vertex(&self, out: &mut String, event: &Event, vertex: &Vertex) -> CodecResult<()> {
        let precision = self.precision;
        let mut orphans = Vec::new();
        for &id in vertex.particles_in() {
            let particle = event.particle(id)?;
            if particle.production_vertex().is_none() {
                orphans.push(particle);
            }
        }

        let position = vertex.position();
        out.push('V');
        push_int(out, vertex.barcode().into());
        push_int(out, vertex.status().into());
        for value in [position.x, position.y, position.z, position.t] {
            push_real(out, value, precision);
        }
        push_int(out, orphans.len() as i64);
        push_int(out, vertex.particles_out_size() as i64);
        push_weights(out, vertex.weights(), precision);
        out.push('\n');

        for particle in orphans {
            self.encode_particle(out, event, particle)?;
        }
        for &id in vertex.particles_out() {
            self.encode_particle(out, event, event.particle(id)?)?;
        }
        Ok(())
    }

    fn encode_particle(
        &self,
        out: &mut String,
        event: &Event,
        particle: &Particle,
    ) -> CodecResult<()> {
        let precision = self.precision;
        let momentum = particle.momentum();
        let polarization = particle.polarization();
        let end_vertex = match particle.end_vertex() {
            Some(v) => event.vertex(v)?.barcode(),
            None => 0,
        };

        out.push('P');
        push_int(out, particle.barcode().into());
        push_int(out, particle.pdg_id().into());
        for value in [momentum.x, momentum.y, momentum.z, momentum.t] {
            push_real(out, value, precision);
        }
        push_real(out, particle.generated_mass(), precision);
        push_int(out, particle.status().into());
        push_real(out, polarization.theta(), precision);
        push_real(out, polarization.phi(), precision);
        push_int(out, end_vertex.into());
        push_int(out, particle.flow().len() as i64);
        for (index, code) in particle.flow().iter() {
            push_int(out, index.into());
            push_int(out, code.into());
        }
        out.push('\n');
        Ok(())
    }
}

fn push_weights(out: &mut String, weights: &WeightContainer, precision: usize) {
    push_int(out, weights.len() as i64);
    for &value in weights.values() {
        push_real(out, value, precision);
    }
}

impl<W: Write> StreamStatus for EventWriter<W> {
    fn rdstate(&self) -> StreamState {
        self.state
    }

    fn clear(&mut self) {
        self.state = StreamState::default();
    }
}

impl<W: Write> EventSink for EventWriter<W> {
    fn write_event(&mut self, event: &Event) -> CodecResult<()> {
        EventWriter::write_event(self, event)
    }

    fn write_comment(&mut self, comment: &str) -> CodecResult<()> {
        EventWriter::write_comment(self, comment)
    }

    fn set_precision(&mut self, precision: usize) -> CodecResult<()> {
        EventWriter::set_precision(self, precision)
    }

    fn finish(&mut self) -> CodecResult<()> {
        EventWriter::finish(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{StreamIds, GENEVENT_END, GENEVENT_START};
    use evgraph_core::{CrossSection, Flow, FourVector};

    fn writer() -> EventWriter<Vec<u8>> {
        EventWriter::new(Vec::new(), StreamIds::new().next_info())
    }

    fn text(writer: EventWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    fn electron_pair() -> Event {
        let mut event = Event::new();
        let v = event.create_vertex(Vertex::new(FourVector::default(), 0));
        event.add_vertex(v).unwrap();
        let incoming =
            event.create_particle(Particle::new(FourVector::new(0.0, 0.0, 1.0, 1.0), 11, 1));
        let outgoing =
            event.create_particle(Particle::new(FourVector::new(0.0, 0.0, -1.0, 1.0), -11, 1));
        event.add_particle_in(v, incoming).unwrap();
        event.add_particle_out(v, outgoing).unwrap();
        event
    }

    #[test]
    fn test_single_vertex_listing() {
        let mut w = writer();
        w.write_event(&electron_pair()).unwrap();
        w.finish().unwrap();

        let expected = "\
HepMC::IO_GenEvent-START_EVENT_LISTING
E 0 -1 -1.0000000000000000e+00 -1.0000000000000000e+00 -1.0000000000000000e+00 0 0 1 0 0 0 0
U GEV MM
V -1 0 0 0 0 0 1 1 0
P 10001 11 0 0 1.0000000000000000e+00 1.0000000000000000e+00 0 1 0 0 -1 0
P 10002 -11 0 0 -1.0000000000000000e+00 1.0000000000000000e+00 0 1 0 0 0 0
HepMC::IO_GenEvent-END_EVENT_LISTING
";
        assert_eq!(text(w), expected);
    }

    #[test]
    fn test_listing_opened_once() {
        let mut w = writer();
        w.write_event(&electron_pair()).unwrap();
        w.write_event(&electron_pair()).unwrap();
        w.finish().unwrap();
        assert_eq!(w.events_written(), 2);

        let out = text(w);
        assert_eq!(out.matches(GENEVENT_START).count(), 1);
        assert_eq!(out.matches(GENEVENT_END).count(), 1);
    }

    #[test]
    fn test_comment_closes_listing() {
        let mut w = writer();
        w.write_comment("before").unwrap();
        w.write_event(&electron_pair()).unwrap();
        w.write_comment("between").unwrap();
        w.write_event(&electron_pair()).unwrap();
        w.finish().unwrap();

        let out = text(w);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], COMMENT_KEY);
        assert_eq!(lines[1], "before");
        assert_eq!(lines[2], GENEVENT_START);
        assert_eq!(out.matches(GENEVENT_START).count(), 2);
        assert_eq!(out.matches(GENEVENT_END).count(), 2);

        let between = lines.iter().position(|l| *l == "between").unwrap();
        assert_eq!(lines[between - 2], GENEVENT_END);
        assert_eq!(lines[between + 1], GENEVENT_START);
        assert_eq!(*lines.last().unwrap(), GENEVENT_END);
    }

    #[test]
    fn test_reserved_marker_rejected() {
        let mut w = writer();
        let err = w
            .write_comment("oops HepMC::IO_GenEvent-END_EVENT_LISTING")
            .unwrap_err();
        assert!(matches!(err, CodecError::ReservedMarker(_)));
        assert!(w.rdstate().fail);
        assert!(text(w).is_empty());
    }

    #[test]
    fn test_precision() {
        let mut w = writer();
        assert!(w.set_precision(limits::MAX_PRECISION + 1).is_err());
        w.set_precision(3).unwrap();

        let mut event = electron_pair();
        event.info_mut().cross_section = Some(CrossSection {
            value: 1500.0,
            error: 0.0,
        });
        w.write_event(&event).unwrap();

        let out = text(w);
        assert!(out.contains("\nE 0 -1 -1.000e+00 -1.000e+00 -1.000e+00 0 0 1 0 0 0 0\n"));
        assert!(out.contains("\nC 1.500e+03 0\n"));
    }

    #[test]
    fn test_references_and_flow() {
        let mut event = Event::new();
        let production = event.create_vertex(Vertex::new(FourVector::default(), 1));
        let decay = event.create_vertex(Vertex::new(FourVector::new(0.0, 0.0, 0.0, 2.0), 2));
        event.add_vertex(production).unwrap();
        let z = event.create_particle(
            Particle::new(FourVector::new(0.0, 0.0, 0.0, 91.0), 23, 2)
                .with_flow(Flow::new().with_icode(1, 501)),
        );
        event.add_particle_out(production, z).unwrap();
        event.add_particle_in(decay, z).unwrap();
        event.set_signal_process_vertex(Some(decay)).unwrap();
        event.info_mut().weights.push_named("nominal", 1.0);

        let mut w = writer();
        w.write_event(&event).unwrap();
        let out = text(w);

        assert!(out.contains("\nE 0 -1 "));
        assert!(out.contains(" 0 -2 2 0 0 0 1 1.0000000000000000e+00\n"));
        assert!(out.contains("\nN 1 \"nominal\"\n"));
        assert!(out.contains("\nV -2 2 0 0 0 2.0000000000000000e+00 0 0 0\n"));
        assert!(out.contains(" 2 0 0 -2 1 1 501\n"));
    }
}
