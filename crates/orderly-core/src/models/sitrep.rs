//! Situation report model.

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Email, Id};

/// Point-in-time status report attached to an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SitRep {
    pub id: Id,
    pub datetime: Timestamp,
    pub by: Email,
    #[serde(default)]
    pub ping: Vec<Email>,
    #[serde(default)]
    pub situation: String,
    #[serde(default)]
    pub actions: String,
    #[serde(default)]
    pub tbd: String,
    #[serde(default)]
    pub issues: String,
}

impl SitRep {
    /// At least one of situation, actions, tbd, issues carries text.
    pub fn has_content(&self) -> bool {
        [&self.situation, &self.actions, &self.tbd, &self.issues]
            .iter()
            .any(|s| !s.is_empty())
    }
}

/// Compare ping lists as multisets.
pub fn same_pings(a: &[Email], b: &[Email]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&Email> = a.iter().collect();
    let mut b: Vec<&Email> = b.iter().collect();
    a.sort();
    b.sort();
    a == b
}

impl PartialEq for SitRep {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.datetime == other.datetime
            && self.by == other.by
            && same_pings(&self.ping, &other.ping)
            && self.situation == other.situation
            && self.actions == other.actions
            && self.tbd == other.tbd
            && self.issues == other.issues
    }
}

impl Eq for SitRep {}
