//! Graph builder: records in, dependency net out.
//!
//! Construction runs in the order of the input rows, in three passes (places,
//! transitions, arcs) followed by gate normalisation. Any error aborts the
//! whole build; no partial net is ever returned.
use log::debug;
use thiserror::Error;

use crate::net::{GateKind, Net, Place, Transition};
use crate::record::{Record, RecordError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("malformed record #{index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: RecordError,
    },
    #[error("component `{component}` depends on unknown place `{parent}`")]
    DanglingReference { component: String, parent: String },
    #[error("transition `{transition}` is used both as an OR gate and as an AND/SINGLE gate")]
    ConflictingGate { transition: String },
}

/// Builds the dependency net described by `records`.
pub fn build(records: &[Record]) -> Result<Net, BuildError> {
    for (index, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|source| BuildError::Record { index, source })?;
    }

    let mut net = Net::empty();
    add_places(&mut net, records);
    add_transitions(&mut net, records)?;
    add_arcs(&mut net, records)?;
    normalize_gates(&mut net);

    log::info!(
        "built net: {} places, {} transitions, {} arcs from {} records",
        net.places_len(),
        net.transitions_len(),
        net.arcs().len(),
        records.len()
    );
    net.log_diagnostics();
    Ok(net)
}

fn add_places(net: &mut Net, records: &[Record]) {
    for record in records {
        let place = net.add_place(Place::new(record.component_id.as_str()));
        if record.is_orphan() {
            if let Some(p) = net.get_place_mut(place) {
                if !p.root {
                    debug!("root place {} ({})", p.name, place);
                }
                p.root = true;
                p.tokens = 1;
            }
        }
    }
}

fn add_transitions(net: &mut Net, records: &[Record]) -> Result<(), BuildError> {
    for record in records {
        let Some(kind) = record.relationship.gate() else {
            continue;
        };
        let transition = net.add_transition(Transition::new(record.transition_name.as_str(), kind));
        if let Some(existing) = net.get_transition_mut(transition) {
            match merge_gates(existing.kind, kind) {
                Some(merged) => existing.kind = merged,
                None => {
                    return Err(BuildError::ConflictingGate {
                        transition: existing.name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn add_arcs(net: &mut Net, records: &[Record]) -> Result<(), BuildError> {
    for record in records {
        let Some(parent) = record.parent_id.as_deref() else {
            continue;
        };
        let source = net
            .place_id(parent)
            .ok_or_else(|| BuildError::DanglingReference {
                component: record.component_id.clone(),
                parent: parent.to_string(),
            })?;
        let (Some(transition), Some(target)) = (
            net.transition_id(&record.transition_name),
            net.place_id(&record.component_id),
        ) else {
            continue;
        };
        if net.add_input_arc(source, transition) {
            debug!("input arc {} -> {}", parent, record.transition_name);
        }
        if net.add_output_arc(target, transition) {
            debug!("output arc {} -> {}", record.transition_name, record.component_id);
        }
    }
    Ok(())
}

/// SINGLE and AND only differ by fan-in, OR never mixes with either.
fn merge_gates(current: GateKind, declared: GateKind) -> Option<GateKind> {
    match (current, declared) {
        (GateKind::Or, GateKind::Or) => Some(GateKind::Or),
        (GateKind::Or, _) | (_, GateKind::Or) => None,
        (GateKind::Single, GateKind::Single) => Some(GateKind::Single),
        _ => Some(GateKind::And),
    }
}

fn normalize_gates(net: &mut Net) {
    let fan_in = net
        .transitions
        .indices()
        .map(|t| (t, net.preset(t).count()))
        .collect::<Vec<_>>();
    for (transition, predecessors) in fan_in {
        let Some(t) = net.get_transition_mut(transition) else {
            continue;
        };
        if t.kind == GateKind::Or {
            continue;
        }
        let kind = if predecessors == 1 {
            GateKind::Single
        } else {
            GateKind::And
        };
        if kind != t.kind {
            debug!("gate {} is {} with {} predecessors", t.name, kind, predecessors);
            t.kind = kind;
        }
    }
}
