//! Record model: one row of the hierarchy table.
//!
//! The table carries four columns: `Mark` (component id), `Father_Mark`
//! (parent id, or the null marker for roots), `Father_cond` (`AND`, `OR`,
//! `SINGLE` or `ORPHAN`) and `Level` (the transition name).
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::net::GateKind;

/// Parent id used by roots unless configured otherwise.
pub const DEFAULT_NULL_MARKER: &str = "NULL";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("unknown relationship `{0}`, expected AND, OR, SINGLE or ORPHAN")]
    UnknownRelationship(String),
    #[error("component `{component}` is ORPHAN but names parent `{parent}`")]
    OrphanWithParent { component: String, parent: String },
    #[error("component `{component}` has no parent but relationship {relationship}")]
    ParentlessChild {
        component: String,
        relationship: Relationship,
    },
    #[error("component `{0}` has a parent but no transition name")]
    MissingTransition(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relationship {
    Orphan,
    Single,
    And,
    Or,
}

impl Relationship {
    /// Gate kind of the transition this relationship feeds, `None` for roots.
    pub fn gate(self) -> Option<GateKind> {
        match self {
            Relationship::Orphan => None,
            Relationship::Single => Some(GateKind::Single),
            Relationship::And => Some(GateKind::And),
            Relationship::Or => Some(GateKind::Or),
        }
    }
}

impl FromStr for Relationship {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ORPHAN" => Ok(Relationship::Orphan),
            "SINGLE" => Ok(Relationship::Single),
            "AND" => Ok(Relationship::And),
            "OR" => Ok(Relationship::Or),
            _ => Err(RecordError::UnknownRelationship(s.to_string())),
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relationship::Orphan => "ORPHAN",
            Relationship::Single => "SINGLE",
            Relationship::And => "AND",
            Relationship::Or => "OR",
        })
    }
}

/// A validated row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub component_id: String,
    pub parent_id: Option<String>,
    pub relationship: Relationship,
    pub transition_name: String,
}

impl Record {
    pub fn orphan(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            parent_id: None,
            relationship: Relationship::Orphan,
            transition_name: String::new(),
        }
    }

    pub fn child(
        component_id: impl Into<String>,
        parent_id: impl Into<String>,
        relationship: Relationship,
        transition_name: impl Into<String>,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            parent_id: Some(parent_id.into()),
            relationship,
            transition_name: transition_name.into(),
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.relationship == Relationship::Orphan
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.component_id.trim().is_empty() {
            return Err(RecordError::MissingField("Mark"));
        }
        match (&self.parent_id, self.relationship) {
            (Some(parent), Relationship::Orphan) => Err(RecordError::OrphanWithParent {
                component: self.component_id.clone(),
                parent: parent.clone(),
            }),
            (None, Relationship::Orphan) => Ok(()),
            (None, relationship) => Err(RecordError::ParentlessChild {
                component: self.component_id.clone(),
                relationship,
            }),
            (Some(_), _) if self.transition_name.trim().is_empty() => {
                Err(RecordError::MissingTransition(self.component_id.clone()))
            }
            (Some(_), _) => Ok(()),
        }
    }
}

/// A row as it appears on the wire, before the null marker is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Mark", default)]
    pub mark: String,
    #[serde(rename = "Father_Mark", default)]
    pub father_mark: String,
    #[serde(rename = "Father_cond", default)]
    pub father_cond: String,
    #[serde(rename = "Level", default)]
    pub level: String,
}

impl RawRecord {
    /// Decodes and validates the row. An empty `Father_Mark` counts as null.
    pub fn into_record(self, null_marker: &str) -> Result<Record, RecordError> {
        let mark = self.mark.trim();
        if mark.is_empty() {
            return Err(RecordError::MissingField("Mark"));
        }
        if self.father_cond.trim().is_empty() {
            return Err(RecordError::MissingField("Father_cond"));
        }
        let relationship: Relationship = self.father_cond.parse()?;
        let father = self.father_mark.trim();
        let parent_id = if father.is_empty() || father == null_marker {
            None
        } else {
            Some(father.to_string())
        };
        let record = Record {
            component_id: mark.to_string(),
            parent_id,
            relationship,
            transition_name: self.level.trim().to_string(),
        };
        record.validate()?;
        Ok(record)
    }
}
