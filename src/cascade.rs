//! Cascade propagation: which components go down with a set of failed ones.
//!
//! The traversal is an explicit depth-first worklist. `doomed` accumulates
//! across the whole call, `visited` is reset for every seed and stops
//! revisits on cyclic input.
//!
//! Only AND/SINGLE transitions carry damage: one is *broken* as soon as any
//! predecessor is doomed or removed, and its successors are doomed with it.
//! An OR producer never removes anything. It holds its successor up while
//! one of its predecessors is live and not itself fed by that successor.
//! Broken AND/SINGLE transitions are fired on the [`MarkingEngine`] first, so
//! the final marking shows the predecessors they assumed present.
use std::collections::{BTreeSet, HashSet};

use indexmap::IndexSet;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::marking::MarkingEngine;
use crate::net::{Net, PlaceId, TransitionId};

/// Outcome of one [`cascade_remove`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    /// Places removed by this call.
    pub removed: BTreeSet<String>,
    /// Places still live afterwards.
    pub remaining: BTreeSet<String>,
    /// Seeds that were unknown or already removed.
    pub skipped: Vec<String>,
    /// AND/SINGLE transitions fired while simulating the damage.
    pub fired: Vec<String>,
    /// Transitions left without any live predecessor.
    pub orphaned_transitions: Vec<String>,
}

impl CascadeReport {
    pub fn is_total_collapse(&self) -> bool {
        self.remaining.is_empty()
    }
}

/// Removes `seeds` from `net` together with everything that depends on them.
///
/// Unknown or already removed seeds are skipped, so repeating a call is a
/// no-op that reports an empty `removed` set.
pub fn cascade_remove<I, S>(net: &mut Net, seeds: I) -> CascadeReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cascade = Cascade::new(net);
    for seed in seeds {
        cascade.seed(seed.as_ref());
    }
    let Cascade {
        engine,
        doomed,
        skipped,
        ..
    } = cascade;
    let fired: Vec<String> = engine
        .fired()
        .iter()
        .map(|t| net.transitions[*t].name.clone())
        .collect();
    let marking = engine.into_marking();

    let mut removed = BTreeSet::new();
    for place in doomed {
        if net.remove_place(place) {
            removed.insert(net.place_name(place).to_string());
        }
    }
    net.apply_marking(&marking);

    let remaining: BTreeSet<String> = net
        .live_places()
        .map(|place| net.place_name(place).to_string())
        .collect();
    let orphaned_transitions = net
        .transitions
        .iter_enumerated()
        .filter(|(t, _)| net.is_orphaned(*t))
        .map(|(_, t)| t.name.clone())
        .collect();

    if remaining.is_empty() {
        info!("cascade removed {} places: all places were deleted", removed.len());
    } else {
        info!(
            "cascade removed {} places, {} remaining",
            removed.len(),
            remaining.len()
        );
    }

    CascadeReport {
        removed,
        remaining,
        skipped,
        fired,
        orphaned_transitions,
    }
}

struct Cascade<'net> {
    net: &'net Net,
    engine: MarkingEngine<'net>,
    doomed: IndexSet<PlaceId>,
    skipped: Vec<String>,
}

impl<'net> Cascade<'net> {
    fn new(net: &'net Net) -> Self {
        Self {
            net,
            engine: MarkingEngine::new(net),
            doomed: IndexSet::new(),
            skipped: Vec::new(),
        }
    }

    fn seed(&mut self, name: &str) {
        let Some(place) = self.net.place_id(name) else {
            warn!("unknown place `{}` skipped", name);
            self.skipped.push(name.to_string());
            return;
        };
        if self.net.is_removed(place) {
            debug!("place `{}` already removed, skipped", name);
            self.skipped.push(name.to_string());
            return;
        }
        debug!("remove {}", name);
        self.doomed.insert(place);
        self.spread(place);
    }

    fn spread(&mut self, seed: PlaceId) {
        let net = self.net;
        let mut visited = HashSet::new();
        let mut stack = vec![seed];

        while let Some(place) = stack.pop() {
            if !visited.insert(place) {
                trace!("{} already visited", net.place_name(place));
                continue;
            }
            for transition in net.consumers(place) {
                if net.transitions[transition].kind.requires_all() {
                    if let Err(err) = self.engine.try_fire(transition) {
                        debug!("could not fire {}: {}", net.transitions[transition].name, err);
                    }
                }
                for successor in net.postset(transition) {
                    if visited.contains(&successor)
                        || self.doomed.contains(&successor)
                        || net.is_removed(successor)
                    {
                        continue;
                    }
                    if let Some(cause) = self.breaking_producer(successor) {
                        trace!(
                            "{} lost through {}",
                            net.place_name(successor),
                            net.transitions[cause].name
                        );
                        self.doomed.insert(successor);
                        stack.push(successor);
                    }
                }
            }
        }
    }

    fn is_lost(&self, place: PlaceId) -> bool {
        self.doomed.contains(&place) || self.net.is_removed(place)
    }

    /// The broken AND/SINGLE producer that takes `place` down, unless an OR
    /// producer still holds it.
    fn breaking_producer(&self, place: PlaceId) -> Option<TransitionId> {
        let net = self.net;
        let cause = net.producers(place).find(|&t| {
            net.transitions[t].kind.requires_all() && net.preset(t).any(|p| self.is_lost(p))
        })?;
        let held = net
            .producers(place)
            .filter(|&t| !net.transitions[t].kind.requires_all())
            .any(|t| {
                net.preset(t)
                    .any(|p| !self.is_lost(p) && !self.reaches(place, p))
            });
        (!held).then_some(cause)
    }

    /// Whether `to` lies downstream of `from` through live places.
    fn reaches(&self, from: PlaceId, to: PlaceId) -> bool {
        let net = self.net;
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(place) = stack.pop() {
            if place == to {
                return true;
            }
            if !seen.insert(place) {
                continue;
            }
            for transition in net.consumers(place) {
                stack.extend(net.postset(transition).filter(|&s| !self.is_lost(s)));
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::record::{Record, Relationship};

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn chain() -> Net {
        build(&[
            Record::orphan("A"),
            Record::child("B", "A", Relationship::Single, "T1"),
            Record::child("C", "B", Relationship::Single, "T2"),
        ])
        .unwrap()
    }

    /// `{A, B}` feed AND gate T1 and `D` feeds OR gate T2, both produce C.
    fn mixed() -> Net {
        build(&[
            Record::orphan("A"),
            Record::orphan("B"),
            Record::orphan("D"),
            Record::child("C", "A", Relationship::And, "T1"),
            Record::child("C", "B", Relationship::And, "T1"),
            Record::child("C", "D", Relationship::Or, "T2"),
        ])
        .unwrap()
    }

    #[test]
    fn linear_chain_collapses_entirely() {
        let mut net = chain();
        let report = cascade_remove(&mut net, ["A"]);

        assert_eq!(report.removed, set(&["A", "B", "C"]));
        assert!(report.remaining.is_empty());
        assert!(report.is_total_collapse());
        assert_eq!(report.fired, vec!["T1".to_string(), "T2".to_string()]);
    }

    #[test]
    fn middle_of_chain_spares_upstream() {
        let mut net = chain();
        let report = cascade_remove(&mut net, ["B"]);

        assert_eq!(report.removed, set(&["B", "C"]));
        assert_eq!(report.remaining, set(&["A"]));
        assert_eq!(report.orphaned_transitions, vec!["T2".to_string()]);
    }

    #[test]
    fn leaf_removal_touches_nothing_else() {
        let mut net = chain();
        let report = cascade_remove(&mut net, ["C"]);

        assert_eq!(report.removed, set(&["C"]));
        assert_eq!(report.remaining, set(&["A", "B"]));
        assert!(report.fired.is_empty());
    }

    #[test]
    fn or_path_keeps_shared_successor_alive() {
        let mut net = mixed();
        let report = cascade_remove(&mut net, ["A", "B"]);

        assert_eq!(report.removed, set(&["A", "B"]));
        assert_eq!(report.remaining, set(&["C", "D"]));
    }

    #[test]
    fn losing_every_path_removes_shared_successor() {
        for seeds in [["A", "B", "D"], ["D", "B", "A"], ["B", "D", "A"]] {
            let mut net = mixed();
            let report = cascade_remove(&mut net, seeds);

            assert_eq!(report.removed, set(&["A", "B", "C", "D"]), "{seeds:?}");
            assert!(report.is_total_collapse());
        }
    }

    #[test]
    fn or_gate_survives_on_one_predecessor() {
        let mut net = build(&[
            Record::orphan("A"),
            Record::orphan("B"),
            Record::child("C", "A", Relationship::Or, "T1"),
            Record::child("C", "B", Relationship::Or, "T1"),
        ])
        .unwrap();

        let report = cascade_remove(&mut net, ["A"]);
        assert_eq!(report.removed, set(&["A"]));
        assert!(report.remaining.contains("C"));
        assert!(report.fired.is_empty());

        let report = cascade_remove(&mut net, ["B"]);
        assert_eq!(report.removed, set(&["B"]));
        assert_eq!(report.remaining, set(&["C"]));
        assert_eq!(report.orphaned_transitions, vec!["T1".to_string()]);
    }

    #[test]
    fn and_gate_collapses_on_one_predecessor() {
        let mut net = build(&[
            Record::orphan("A"),
            Record::orphan("B"),
            Record::child("C", "A", Relationship::And, "T1"),
            Record::child("C", "B", Relationship::And, "T1"),
            Record::child("E", "C", Relationship::Single, "T2"),
        ])
        .unwrap();

        let report = cascade_remove(&mut net, ["A"]);
        assert_eq!(report.removed, set(&["A", "C", "E"]));
        assert_eq!(report.remaining, set(&["B"]));
    }

    #[test]
    fn fired_and_gate_marks_surviving_predecessors_active() {
        let mut net = build(&[
            Record::orphan("A"),
            Record::child("B", "A", Relationship::Single, "T0"),
            Record::orphan("R"),
            Record::child("X", "R", Relationship::Single, "T5"),
            Record::child("C", "B", Relationship::And, "T1"),
            Record::child("C", "X", Relationship::And, "T1"),
        ])
        .unwrap();

        let x = net.place_id("X").unwrap();
        let b = net.place_id("B").unwrap();
        assert!(!net.places[x].is_active());

        let report = cascade_remove(&mut net, ["A"]);
        assert_eq!(report.removed, set(&["A", "B", "C"]));
        assert!(net.places[x].is_active());
        assert!(net.is_removed(b));
        assert_eq!(net.places[b].tokens, 0);
    }

    #[test]
    fn second_call_is_an_empty_delta() {
        let mut net = chain();
        let first = cascade_remove(&mut net, ["B"]);
        let second = cascade_remove(&mut net, ["B"]);

        assert!(!first.removed.is_empty());
        assert!(second.removed.is_empty());
        assert_eq!(second.skipped, vec!["B".to_string()]);
        assert_eq!(second.remaining, first.remaining);
    }

    #[test]
    fn unknown_seeds_are_skipped() {
        let mut net = chain();
        let report = cascade_remove(&mut net, ["nope", "C"]);

        assert_eq!(report.skipped, vec!["nope".to_string()]);
        assert_eq!(report.removed, set(&["C"]));
    }

    #[test]
    fn removing_all_roots_collapses_and_only_net() {
        let mut net = build(&[
            Record::orphan("R1"),
            Record::orphan("R2"),
            Record::child("M", "R1", Relationship::And, "T1"),
            Record::child("M", "R2", Relationship::And, "T1"),
            Record::child("N", "R2", Relationship::Single, "T2"),
            Record::child("L", "M", Relationship::And, "T3"),
            Record::child("L", "N", Relationship::And, "T3"),
        ])
        .unwrap();

        let report = cascade_remove(&mut net, ["R1", "R2"]);
        assert!(report.is_total_collapse());
        assert_eq!(report.removed.len(), 5);
    }

    #[test]
    fn cycles_terminate() {
        let mut net = build(&[
            Record::orphan("A"),
            Record::child("B", "A", Relationship::Single, "T1"),
            Record::child("C", "B", Relationship::Single, "T2"),
            Record::child("B", "C", Relationship::Single, "T3"),
        ])
        .unwrap();

        let report = cascade_remove(&mut net, ["A"]);
        assert_eq!(report.removed, set(&["A", "B", "C"]));
        assert!(report.is_total_collapse());
    }

    #[test]
    fn or_back_edge_does_not_hold_its_own_source() {
        let records = [
            Record::orphan("A"),
            Record::child("B", "A", Relationship::Single, "T1"),
            Record::child("C", "B", Relationship::Single, "T2"),
            Record::child("B", "C", Relationship::Or, "T3"),
        ];
        let mut net = build(&records).unwrap();
        let report = cascade_remove(&mut net, ["A"]);
        assert_eq!(report.removed, set(&["A", "B", "C"]));

        let mut records = records.to_vec();
        records.push(Record::orphan("D"));
        records.push(Record::child("B", "D", Relationship::Or, "T3"));
        let mut net = build(&records).unwrap();
        let report = cascade_remove(&mut net, ["A"]);
        assert_eq!(report.removed, set(&["A"]));
        assert_eq!(report.remaining, set(&["B", "C", "D"]));
    }

    /// Places reachable from `seeds` through AND/SINGLE transitions only.
    fn and_single_reach(net: &Net, seeds: &[&str]) -> BTreeSet<String> {
        let mut stack: Vec<PlaceId> = seeds.iter().filter_map(|s| net.place_id(s)).collect();
        let mut reached = HashSet::new();
        while let Some(place) = stack.pop() {
            if !reached.insert(place) {
                continue;
            }
            for t in net.consumers(place) {
                if net.transitions[t].kind.requires_all() {
                    stack.extend(net.postset(t));
                }
            }
        }
        reached
            .into_iter()
            .map(|place| net.place_name(place).to_string())
            .collect()
    }

    #[test]
    fn removal_stays_within_and_single_reach() {
        let records = [
            Record::orphan("A"),
            Record::orphan("B"),
            Record::orphan("D"),
            Record::child("C", "A", Relationship::Or, "T1"),
            Record::child("C", "B", Relationship::Or, "T1"),
            Record::child("E", "C", Relationship::Single, "T2"),
            Record::child("F", "A", Relationship::And, "T3"),
            Record::child("F", "D", Relationship::And, "T3"),
            Record::child("G", "F", Relationship::Single, "T4"),
        ];
        let seed_sets: [&[&str]; 4] = [&["A"], &["A", "B"], &["D"], &["A", "B", "D"]];
        for seeds in seed_sets {
            let mut net = build(&records).unwrap();
            let reach = and_single_reach(&net, seeds);
            let report = cascade_remove(&mut net, seeds.iter().copied());

            assert!(report.removed.is_subset(&reach), "{seeds:?}");
            assert!(seeds.iter().all(|s| report.removed.contains(*s)), "{seeds:?}");
            assert!(report.remaining.contains("C"), "{seeds:?}");
            assert!(report.remaining.contains("E"), "{seeds:?}");
        }
    }

    #[test]
    fn seeds_are_removed_and_removal_stays_downstream() {
        let mut net = mixed();
        let report = cascade_remove(&mut net, ["A"]);

        assert!(report.removed.contains("A"));
        assert!(!report.removed.contains("B"));
        assert!(!report.removed.contains("D"));
    }
}
