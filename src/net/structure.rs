//! 依赖网静态结构元素：库所、迁移（门）、弧与标识。
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::IndexVec;

pub type Weight = u64;

/// A component of the modelled system.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
pub struct Place {
    pub name: String,
    /// Orphan component: no producer, one token in the initial marking.
    pub root: bool,
    /// Current marking.
    pub tokens: Weight,
    /// Tombstone set by the cascade. A removed place never comes back.
    pub removed: bool,
}

impl Place {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: false,
            tokens: 0,
            removed: false,
        }
    }

    pub fn root(name: impl Into<String>) -> Self {
        Self {
            root: true,
            tokens: 1,
            ..Self::new(name)
        }
    }

    pub fn is_active(&self) -> bool {
        self.tokens > 0 && !self.removed
    }
}

/// How a transition combines its predecessor places.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// Exactly one predecessor.
    Single,
    /// Every predecessor is required.
    And,
    /// Any one predecessor is enough.
    Or,
}

impl GateKind {
    /// AND and SINGLE share the same enabling rule.
    pub fn requires_all(self) -> bool {
        !matches!(self, GateKind::Or)
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GateKind::Single => "SINGLE",
            GateKind::And => "AND",
            GateKind::Or => "OR",
        })
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Transition {
    pub name: String,
    pub kind: GateKind,
}

impl Transition {
    pub fn new(name: impl Into<String>, kind: GateKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transition")
            .field(&self.name)
            .field(&self.kind)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArcDirection {
    PlaceToTransition,
    TransitionToPlace,
}

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Arc {
    pub place: PlaceId,
    pub transition: TransitionId,
    pub direction: ArcDirection,
}

impl Arc {
    pub fn new(place: PlaceId, transition: TransitionId, direction: ArcDirection) -> Self {
        Self {
            place,
            transition,
            direction,
        }
    }
}

impl fmt::Debug for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            ArcDirection::PlaceToTransition => {
                write!(f, "Arc({:?} -> {:?})", self.place, self.transition)
            }
            ArcDirection::TransitionToPlace => {
                write!(f, "Arc({:?} -> {:?})", self.transition, self.place)
            }
        }
    }
}

/// Active/inactive state of every place, indexed by [`PlaceId`].
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Marking(pub IndexVec<PlaceId, Weight>);

impl Marking {
    pub fn new(initial: IndexVec<PlaceId, Weight>) -> Self {
        Self(initial)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaceId, &Weight)> {
        self.0.iter_enumerated()
    }

    pub fn tokens(&self, place: PlaceId) -> Weight {
        self.0[place]
    }

    pub fn tokens_mut(&mut self, place: PlaceId) -> &mut Weight {
        &mut self.0[place]
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (place, tokens) in self.iter() {
            map.entry(&place, tokens);
        }
        map.finish()
    }
}
