//! 标识引擎：维护库所的激活状态，并按门语义发射迁移。
//!
//! AND/SINGLE 迁移发射前无条件激活全部前驱（模拟"前驱可用"），随后激活后继；
//! 发射不会撤销任何标识。OR 迁移从不自动发射。
use log::trace;
use thiserror::Error;

use crate::net::{GateKind, Idx, Marking, Net, PlaceId, TransitionId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("transition {0:?} is out of bounds")]
    OutOfBounds(TransitionId),
    #[error("place {0:?} is out of bounds")]
    UnknownPlace(PlaceId),
    #[error("place {0:?} has been removed")]
    Removed(PlaceId),
}

pub struct MarkingEngine<'net> {
    net: &'net Net,
    marking: Marking,
    fired: Vec<TransitionId>,
}

impl<'net> MarkingEngine<'net> {
    /// Starts from the marking currently stored on `net`.
    pub fn new(net: &'net Net) -> Self {
        Self {
            net,
            marking: net.marking(),
            fired: Vec::new(),
        }
    }

    pub fn is_active(&self, place: PlaceId) -> bool {
        place.index() < self.marking.len()
            && !self.net.is_removed(place)
            && self.marking.tokens(place) > 0
    }

    /// Puts one token on `place`. Activating an active place changes nothing.
    pub fn activate(&mut self, place: PlaceId) -> Result<(), FireError> {
        if place.index() >= self.marking.len() {
            return Err(FireError::UnknownPlace(place));
        }
        if self.net.is_removed(place) {
            return Err(FireError::Removed(place));
        }
        let tokens = self.marking.tokens_mut(place);
        if *tokens == 0 {
            trace!("activate {}", self.net.place_name(place));
            *tokens = 1;
        }
        Ok(())
    }

    /// Fires an AND/SINGLE transition after activating its predecessors.
    /// OR transitions are left alone and yield `Ok(false)`.
    pub fn try_fire(&mut self, transition: TransitionId) -> Result<bool, FireError> {
        let net = self.net;
        let kind = net
            .get_transition(transition)
            .map(|t| t.kind)
            .ok_or(FireError::OutOfBounds(transition))?;
        if kind == GateKind::Or {
            return Ok(false);
        }

        for place in net.preset(transition) {
            if !net.is_removed(place) {
                self.activate(place)?;
            }
        }
        for place in net.postset(transition) {
            if !net.is_removed(place) {
                self.activate(place)?;
            }
        }

        if !self.fired.contains(&transition) {
            trace!("fire {} ({})", net.transitions[transition].name, kind);
            self.fired.push(transition);
        }
        Ok(true)
    }

    /// Transitions fired so far, first firing first.
    pub fn fired(&self) -> &[TransitionId] {
        &self.fired
    }

    pub fn marking(&self) -> &Marking {
        &self.marking
    }

    pub fn into_marking(self) -> Marking {
        self.marking
    }
}
