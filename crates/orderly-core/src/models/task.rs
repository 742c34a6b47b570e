//! Task model.

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Email, Id, TaskState};

/// A unit of work: the primary task of an order or one of its delegated tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Task {
    pub id: Id,
    #[serde(default)]
    pub state: TaskState,
    pub accountable: Email,
    pub objective: String,
    pub deadline: Timestamp,
}
