use std::collections::BTreeSet;
use std::path::PathBuf;

use pear::net::io;
use pear::record::DEFAULT_NULL_MARKER;
use pear::{CascadeReport, Net, build, cascade_remove, loader};

fn demo_net() -> Net {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/network.csv");
    let records = loader::load_records(path, DEFAULT_NULL_MARKER).unwrap();
    build(&records).unwrap()
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn demo_net_shape() {
    let net = demo_net();

    assert_eq!(net.places_len(), 9);
    assert_eq!(net.transitions_len(), 5);
    assert_eq!(net.arcs().len(), 13);
}

#[test]
fn removing_h_and_g_takes_i_down() {
    let mut net = demo_net();
    let report = cascade_remove(&mut net, ["H", "G"]);

    assert_eq!(report.removed, set(&["G", "H", "I"]));
    assert_eq!(report.remaining, set(&["A", "B", "C", "D", "E", "F"]));
}

#[test]
fn or_gate_never_carries_removal() {
    let mut net = demo_net();
    let report = cascade_remove(&mut net, ["A"]);
    assert_eq!(report.removed, set(&["A", "C", "D"]));

    let report = cascade_remove(&mut net, ["E"]);
    assert_eq!(report.removed, set(&["E"]));
    assert_eq!(report.remaining, set(&["B", "F", "G", "H", "I"]));
    assert!(report.orphaned_transitions.contains(&"T3".to_string()));
}

#[test]
fn removing_every_root_spares_the_or_branch() {
    let mut net = demo_net();
    let report = cascade_remove(&mut net, ["A", "B", "E", "H"]);

    assert_eq!(report.removed, set(&["A", "B", "C", "D", "E", "H", "I"]));
    assert_eq!(report.remaining, set(&["F", "G"]));
    assert!(!report.is_total_collapse());
}

#[test]
fn removing_every_place_collapses_the_net() {
    let mut net = demo_net();
    let report = cascade_remove(&mut net, ["A", "B", "E", "F", "H"]);

    assert!(report.is_total_collapse());
    assert_eq!(report.removed.len(), 9);
    assert_eq!(net.live_places().count(), 0);
}

#[test]
fn report_and_damaged_drawing_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut net = demo_net();
    let report = cascade_remove(&mut net, ["H"]);

    let report_path = dir.path().join("report.json");
    io::write_json(&report_path, &report).unwrap();
    let back: CascadeReport = io::read_json(&report_path).unwrap();
    assert_eq!(back, report);

    let dot_path = dir.path().join("dot/damaged_PN.dot");
    net.write_dot(&dot_path).unwrap();
    let dot = std::fs::read_to_string(dot_path).unwrap();
    assert!(dot.contains("style=dashed"));
}
