use evgraph_core::{
    CrossSection, Event, Flow, FourVector, HeavyIon, LengthUnit, MomentumUnit, Particle, PdfInfo,
    Polarization, Vertex, VertexId,
};
use evgraph_io::{EventReader, EventWriter, StreamIds};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn encode(events: &[Event]) -> String {
    let mut writer = EventWriter::new(Vec::new(), StreamIds::new().next_info());
    for event in events {
        writer.write_event(event).unwrap();
    }
    writer.finish().unwrap();
    String::from_utf8(writer.into_inner()).unwrap()
}

fn decode(text: &str) -> Vec<Event> {
    EventReader::new(text.as_bytes(), StreamIds::new().next_info())
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// Particle barcode -> (pdg id, momentum, production barcode, end barcode)
type Shape = BTreeMap<i32, (i32, FourVector, i32, i32)>;

fn shape(event: &Event) -> (Vec<i32>, Shape) {
    let barcode = |v: Option<VertexId>| v.map_or(0, |v| event.vertex(v).unwrap().barcode());
    let mut vertices: Vec<i32> = event
        .vertices()
        .map(|v| event.vertex(v).unwrap().barcode())
        .collect();
    vertices.sort_unstable();

    let particles = event
        .particles()
        .map(|p| {
            let p = event.particle(p).unwrap();
            (
                p.barcode(),
                (
                    p.pdg_id(),
                    *p.momentum(),
                    barcode(p.production_vertex()),
                    barcode(p.end_vertex()),
                ),
            )
        })
        .collect();
    (vertices, particles)
}

#[test]
fn single_vertex_event_round_trips() {
    let mut event = Event::new();
    let v = event.create_vertex(Vertex::new(FourVector::default(), 0));
    event.add_vertex(v).unwrap();
    let incoming = event.create_particle(Particle::new(FourVector::new(0.0, 0.0, 1.0, 1.0), 11, 1));
    let outgoing =
        event.create_particle(Particle::new(FourVector::new(0.0, 0.0, -1.0, 1.0), -11, 1));
    event.add_particle_in(v, incoming).unwrap();
    event.add_particle_out(v, outgoing).unwrap();

    let text = encode(std::slice::from_ref(&event));
    let decoded = decode(&text);
    assert_eq!(decoded.len(), 1);

    let read = &decoded[0];
    assert_eq!(read.vertices_size(), 1);
    assert_eq!(read.particles_size(), 2);
    assert_eq!(shape(read), shape(&event));
    assert_eq!(encode(&decoded), text);
}

#[test]
fn event_header_round_trips() {
    let mut event = Event::with_units(MomentumUnit::MeV, LengthUnit::Cm);
    let info = event.info_mut();
    info.event_number = 42;
    info.mpi = 3;
    info.event_scale = 91.1876;
    info.alpha_qcd = 0.118;
    info.alpha_qed = 1.0 / 137.0;
    info.signal_process_id = 20;
    info.random_states = vec![1, -2, 3_000_000_000];
    info.weights.push_named("nominal", 1.0);
    info.weights.push_named("alt pdf", 0.95);
    info.cross_section = Some(CrossSection {
        value: 1.2e3,
        error: 3.4,
    });
    info.heavy_ion = Some(HeavyIon {
        ncoll_hard: 1,
        ncoll: 12,
        impact_parameter: 4.5,
        sigma_inel_nn: 70.0,
        ..HeavyIon::default()
    });
    info.pdf_info = Some(PdfInfo {
        id1: 21,
        id2: 2,
        x1: 0.01,
        x2: 0.02,
        scale: 91.0,
        pdf1: 0.5,
        pdf2: 0.6,
        pdf_id1: 10042,
        pdf_id2: 10042,
    });

    let hard = event.create_vertex(Vertex::new(FourVector::new(0.1, 0.2, 0.3, 0.4), 3));
    event.add_vertex(hard).unwrap();
    let beam_a = event.create_particle(Particle::new(
        FourVector::new(0.0, 0.0, 6500.0, 6500.0),
        2212,
        4,
    ));
    let beam_b = event.create_particle(Particle::new(
        FourVector::new(0.0, 0.0, -6500.0, 6500.0),
        2212,
        4,
    ));
    let gluon = event.create_particle(
        Particle::new(FourVector::new(1.0, 2.0, 3.0, 10.0), 21, 2)
            .with_flow(Flow::new().with_icode(1, 501).with_icode(2, 502))
            .with_polarization(Polarization::new(0.3, 1.2))
            .with_generated_mass(0.0),
    );
    event.add_particle_in(hard, beam_a).unwrap();
    event.add_particle_in(hard, beam_b).unwrap();
    event.add_particle_out(hard, gluon).unwrap();
    event.set_signal_process_vertex(Some(hard)).unwrap();
    event.set_beam_particles(Some((beam_a, beam_b))).unwrap();

    let decoded = decode(&encode(std::slice::from_ref(&event)));
    let read = &decoded[0];

    assert_eq!(read.info(), event.info());
    assert_eq!(read.momentum_unit(), MomentumUnit::MeV);
    assert_eq!(read.length_unit(), LengthUnit::Cm);

    let hard_read = read.barcode_to_vertex(event.vertex(hard).unwrap().barcode()).unwrap();
    assert_eq!(read.signal_process_vertex(), Some(hard_read));
    assert_eq!(read.vertex(hard_read).unwrap().status(), 3);
    assert_eq!(read.vertex(hard_read).unwrap().position().z, 0.3);

    let (a, b) = read.beam_particles().unwrap();
    assert_eq!(read.particle(a).unwrap().barcode(), event.particle(beam_a).unwrap().barcode());
    assert_eq!(read.particle(b).unwrap().barcode(), event.particle(beam_b).unwrap().barcode());

    let gluon_read = read
        .particle(read.barcode_to_particle(event.particle(gluon).unwrap().barcode()).unwrap())
        .unwrap();
    assert_eq!(gluon_read.flow(), event.particle(gluon).unwrap().flow());
    assert_eq!(gluon_read.polarization().theta(), 0.3);
    assert_eq!(gluon_read.polarization().phi(), 1.2);
}

#[test]
fn legacy_listing_upgrades_on_rewrite() {
    let legacy = "\
HepMC::IO_Ascii-START_EVENT_LISTING
E 5 10 0.1 0.01 1 0 1 0 0
V -1 0 0 0 0 0 1 1 0
P 1 11 0 0 3 5 1 0 0 -1 0
P 2 22 0 0 3 5 1 0 0 0 0
HepMC::IO_Ascii-END_EVENT_LISTING
";
    let events = decode(legacy);
    let text = encode(&events);
    assert!(text.starts_with("HepMC::IO_GenEvent-START_EVENT_LISTING\n"));
    assert!(text.contains("\nU GEV MM\n"));

    let again = decode(&text);
    assert_eq!(shape(&again[0]), shape(&events[0]));
    let photon = again[0].particle(again[0].barcode_to_particle(2).unwrap()).unwrap();
    assert_eq!(photon.generated_mass(), 4.0);
}

#[test]
fn comments_between_events_are_skipped() {
    let mut writer = EventWriter::new(Vec::new(), StreamIds::new().next_info());
    let mut event = Event::new();
    let v = event.create_vertex(Vertex::new(FourVector::default(), 0));
    event.add_vertex(v).unwrap();

    writer.write_comment("generated by a test").unwrap();
    writer.write_event(&event).unwrap();
    writer.write_comment("E 99 looks like a record").unwrap();
    writer.write_event(&event).unwrap();
    writer.finish().unwrap();

    let text = String::from_utf8(writer.into_inner()).unwrap();
    let events = decode(&text);
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.vertices_size() == 1));
}

type Edge = (Option<usize>, Option<usize>, i32, (f64, f64, f64, f64));

fn arb_event() -> impl Strategy<Value = (usize, Vec<Edge>)> {
    (1usize..6).prop_flat_map(|n| {
        let component = -1.0e6..1.0e6f64;
        let edge = (
            proptest::option::of(0..n),
            proptest::option::of(0..n),
            -30i32..30,
            (
                component.clone(),
                component.clone(),
                component.clone(),
                component,
            ),
        );
        (Just(n), proptest::collection::vec(edge, 0..12))
    })
}

fn build(n: usize, edges: &[Edge]) -> Event {
    let mut event = Event::new();
    let vertices: Vec<VertexId> = (0..n)
        .map(|i| event.create_vertex(Vertex::new(FourVector::default(), i as i32)))
        .collect();
    for v in &vertices {
        event.add_vertex(*v).unwrap();
    }

    for (from, to, pdg_id, (x, y, z, t)) in edges {
        if from.is_some() && from == to {
            continue;
        }
        let p = event.create_particle(Particle::new(FourVector::new(*x, *y, *z, *t), *pdg_id, 1));
        if let Some(f) = from {
            event.add_particle_out(vertices[*f], p).unwrap();
        }
        if let Some(t) = to {
            event.add_particle_in(vertices[*t], p).unwrap();
        }
    }
    event
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn written_events_read_back_identically((n, edges) in arb_event()) {
        let event = build(n, &edges);
        let decoded = decode(&encode(std::slice::from_ref(&event)));

        prop_assert_eq!(decoded.len(), 1);
        prop_assert_eq!(shape(&decoded[0]), shape(&event));
    }
}
