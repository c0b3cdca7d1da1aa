//! 依赖网容器：库所/迁移的名字索引、去重的输入输出弧、墓碑式删除与 DOT 渲染。
use std::fmt::{self, Write as FmtWrite};
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::incidence::IncidenceBool;
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::structure::{Arc, ArcDirection, Marking, Place, Transition};

/// Connectivity findings for a freshly built net.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReport {
    /// Non-root places with no arc at all.
    pub isolated_places: Vec<(PlaceId, String)>,
    /// Transitions with no arc at all.
    pub isolated_transitions: Vec<(TransitionId, String)>,
    pub warnings: Vec<String>,
    pub total_places: usize,
    pub total_transitions: usize,
}

impl DiagnosticReport {
    pub fn has_issues(&self) -> bool {
        !self.isolated_places.is_empty()
            || !self.isolated_transitions.is_empty()
            || !self.warnings.is_empty()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Net {
    pub places: IndexVec<PlaceId, Place>,
    pub transitions: IndexVec<TransitionId, Transition>,
    /// Input arcs, place -> transition.
    pub pre: IncidenceBool,
    /// Output arcs, transition -> place.
    pub post: IncidenceBool,
    place_index: IndexMap<String, PlaceId>,
    transition_index: IndexMap<String, TransitionId>,
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .field("arcs", &self.arcs())
            .finish()
    }
}

impl Net {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds `place` unless a place with the same name exists; either way the
    /// id registered under that name is returned.
    pub fn add_place(&mut self, place: Place) -> PlaceId {
        if let Some(&existing) = self.place_index.get(&place.name) {
            return existing;
        }
        let name = place.name.clone();
        let place_id = self.places.push(place);
        self.pre.push_place();
        self.post.push_place();
        self.place_index.insert(name, place_id);
        place_id
    }

    /// Same contract as [`Net::add_place`], keyed by transition name.
    pub fn add_transition(&mut self, transition: Transition) -> TransitionId {
        if let Some(&existing) = self.transition_index.get(&transition.name) {
            return existing;
        }
        let name = transition.name.clone();
        let transition_id = self.transitions.push(transition);
        self.pre.push_transition();
        self.post.push_transition();
        self.transition_index.insert(name, transition_id);
        transition_id
    }

    /// 输入弧: place -> transition。重复添加返回 false。
    pub fn add_input_arc(&mut self, place: PlaceId, transition: TransitionId) -> bool {
        self.pre.insert(place, transition)
    }

    /// 输出弧: transition -> place。重复添加返回 false。
    pub fn add_output_arc(&mut self, place: PlaceId, transition: TransitionId) -> bool {
        self.post.insert(place, transition)
    }

    pub fn place_id(&self, name: &str) -> Option<PlaceId> {
        self.place_index.get(name).copied()
    }

    pub fn transition_id(&self, name: &str) -> Option<TransitionId> {
        self.transition_index.get(name).copied()
    }

    pub fn get_place_mut(&mut self, place: PlaceId) -> Option<&mut Place> {
        self.places.get_mut(place)
    }

    pub fn get_transition(&self, transition: TransitionId) -> Option<&Transition> {
        self.transitions.get(transition)
    }

    pub fn get_transition_mut(&mut self, transition: TransitionId) -> Option<&mut Transition> {
        self.transitions.get_mut(transition)
    }

    pub fn place_name(&self, place: PlaceId) -> &str {
        &self.places[place].name
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    /// Predecessor places of `transition`.
    pub fn preset(&self, transition: TransitionId) -> impl Iterator<Item = PlaceId> + '_ {
        self.pre.column(transition)
    }

    /// Successor places of `transition`.
    pub fn postset(&self, transition: TransitionId) -> impl Iterator<Item = PlaceId> + '_ {
        self.post.column(transition)
    }

    /// Transitions that `place` feeds into.
    pub fn consumers(&self, place: PlaceId) -> impl Iterator<Item = TransitionId> + '_ {
        self.pre.row(place)
    }

    /// Transitions that produce `place`.
    pub fn producers(&self, place: PlaceId) -> impl Iterator<Item = TransitionId> + '_ {
        self.post.row(place)
    }

    pub fn arcs(&self) -> Vec<Arc> {
        let mut arcs = Vec::with_capacity(self.pre.count() + self.post.count());
        for place in self.places.indices() {
            for transition in self.pre.row(place) {
                arcs.push(Arc::new(place, transition, ArcDirection::PlaceToTransition));
            }
        }
        for place in self.places.indices() {
            for transition in self.post.row(place) {
                arcs.push(Arc::new(place, transition, ArcDirection::TransitionToPlace));
            }
        }
        arcs
    }

    pub fn is_removed(&self, place: PlaceId) -> bool {
        self.places.get(place).is_none_or(|p| p.removed)
    }

    /// Tombstones `place`. Returns false when it was already removed.
    pub fn remove_place(&mut self, place: PlaceId) -> bool {
        match self.places.get_mut(place) {
            Some(p) if !p.removed => {
                p.removed = true;
                p.tokens = 0;
                true
            }
            _ => false,
        }
    }

    pub fn live_places(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.places
            .iter_enumerated()
            .filter(|(_, place)| !place.removed)
            .map(|(id, _)| id)
    }

    /// A transition whose predecessors are all gone can never fire again.
    pub fn is_orphaned(&self, transition: TransitionId) -> bool {
        let mut preset = self.preset(transition).peekable();
        preset.peek().is_some() && preset.all(|place| self.is_removed(place))
    }

    /// Current marking as stored on the places.
    pub fn marking(&self) -> Marking {
        Marking::new(IndexVec::from(
            self.places
                .iter()
                .map(|p| if p.removed { 0 } else { p.tokens })
                .collect::<Vec<_>>(),
        ))
    }

    /// Writes `marking` back onto the places; removed places stay empty.
    pub fn apply_marking(&mut self, marking: &Marking) {
        for (place, tokens) in marking.iter() {
            if let Some(p) = self.places.get_mut(place) {
                p.tokens = if p.removed { 0 } else { *tokens };
            }
        }
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(&mut dot, "digraph PetriNet {{");
        let _ = writeln!(&mut dot, "    rankdir=TB;");
        let _ = writeln!(&mut dot, "    node [fontname=\"Helvetica\"];");

        for (place_id, place) in self.places.iter_enumerated() {
            let style = if place.removed {
                "style=dashed, color=\"#9e9e9e\", fontcolor=\"#9e9e9e\""
            } else if place.tokens > 0 {
                "style=filled, fillcolor=\"#c8e6c9\""
            } else {
                "style=filled, fillcolor=\"#e3f2fd\""
            };
            let _ = writeln!(
                &mut dot,
                "    place_{} [label=\"{}\\n{}\", shape=circle, {}];",
                place_id.index(),
                escape_label(&place.name),
                place.tokens,
                style
            );
        }

        for (transition_id, transition) in self.transitions.iter_enumerated() {
            let fill = if self.is_orphaned(transition_id) {
                "#eeeeee"
            } else {
                "#ffe0b2"
            };
            let _ = writeln!(
                &mut dot,
                "    trans_{} [label=\"{}\\n{}\", shape=box, style=filled, fillcolor=\"{}\"];",
                transition_id.index(),
                escape_label(&transition.name),
                transition.kind,
                fill
            );
        }

        for arc in self.arcs() {
            let place = format!("place_{}", arc.place.index());
            let transition = format!("trans_{}", arc.transition.index());
            let _ = match arc.direction {
                ArcDirection::PlaceToTransition => {
                    writeln!(&mut dot, "    {} -> {};", place, transition)
                }
                ArcDirection::TransitionToPlace => {
                    writeln!(&mut dot, "    {} -> {};", transition, place)
                }
            };
        }

        let _ = writeln!(&mut dot, "}}");
        dot
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_dot())
    }

    pub fn diagnose_connectivity(&self) -> DiagnosticReport {
        let mut isolated_places = Vec::new();
        let mut isolated_transitions = Vec::new();
        let mut warnings = Vec::new();

        for (place_id, place) in self.places.iter_enumerated() {
            let has_producer = self.producers(place_id).next().is_some();
            let has_consumer = self.consumers(place_id).next().is_some();

            if !has_producer && !has_consumer && !place.root {
                isolated_places.push((place_id, place.name.clone()));
            } else if !has_producer && !place.root {
                warnings.push(format!(
                    "place '{}' ({}) has no producer and no initial token, it can never be active",
                    place.name, place_id
                ));
            } else if has_producer && place.root {
                warnings.push(format!(
                    "root place '{}' ({}) also has a producer",
                    place.name, place_id
                ));
            }
        }

        for (trans_id, trans) in self.transitions.iter_enumerated() {
            let has_preset = self.preset(trans_id).next().is_some();
            let has_postset = self.postset(trans_id).next().is_some();

            if !has_preset && !has_postset {
                isolated_transitions.push((trans_id, trans.name.clone()));
            } else if !has_preset {
                warnings.push(format!(
                    "transition '{}' ({}) has no predecessor and can never fire",
                    trans.name, trans_id
                ));
            } else if !has_postset {
                warnings.push(format!(
                    "transition '{}' ({}) has no successor",
                    trans.name, trans_id
                ));
            }
        }

        DiagnosticReport {
            isolated_places,
            isolated_transitions,
            warnings,
            total_places: self.places_len(),
            total_transitions: self.transitions_len(),
        }
    }

    pub fn log_diagnostics(&self) {
        let report = self.diagnose_connectivity();

        if report.has_issues() {
            log::warn!(
                "connectivity check: {} places, {} transitions",
                report.total_places,
                report.total_transitions
            );
            for (id, name) in &report.isolated_places {
                log::warn!("  isolated place [{}] {}", id.index(), name);
            }
            for (id, name) in &report.isolated_transitions {
                log::warn!("  isolated transition [{}] {}", id.index(), name);
            }
            for warning in &report.warnings {
                log::warn!("  {}", warning);
            }
        } else {
            log::info!(
                "connectivity check passed ({} places, {} transitions)",
                report.total_places,
                report.total_transitions
            );
        }
    }
}

fn escape_label(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
