//! Version bookkeeping shared by every stored entity.

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Id;

/// Version, creation, update and tombstone bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Meta {
    /// Starts at 1, grows by exactly one per accepted mutation
    pub version: u64,
    pub created: Timestamp,
    pub updated: Timestamp,
    /// Set only on the tombstone written by a soft delete
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

impl Meta {
    /// Meta for a freshly created entity.
    pub fn new(now: Timestamp) -> Self {
        Self {
            version: 1,
            created: now,
            updated: now,
            deleted: false,
        }
    }

    /// Advance to the next version.
    pub fn bump(&mut self, now: Timestamp) {
        self.version = self.version.saturating_add(1);
        self.updated = now.max(self.created);
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::new(Timestamp::UNIX_EPOCH)
    }
}

/// An entity the repository keeps a version history for.
pub trait Versioned: Clone + Send + Sync + 'static {
    /// Name used in error messages and logs.
    const KIND: &'static str;

    fn id(&self) -> &Id;

    fn meta(&self) -> &Meta;

    fn meta_mut(&mut self) -> &mut Meta;

    /// Key of the parent this entity hangs under, if any.
    fn parent_key(&self) -> Option<String>;
}
