//! Parameter structures for orderly operations.
//!
//! These are the partial-update request types shared by every interface
//! (CLI, MCP, tests). Every field is an `Option` so a request can tell
//! "unset" apart from a value. Empty strings and empty lists count as unset
//! too, matching what loosely typed JSON clients send.
//!
//! Interface layers wrap these types rather than redefining them:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (this module)   │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Validation of these shapes lives in [`crate::validation`].

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::{Email, Id, Meta, SitRep, Task, TaskState, User};

/// Values that have an "empty" sentinel meaning "not supplied".
pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for Id {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for Email {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for Timestamp {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for TaskState {
    fn is_blank(&self) -> bool {
        false
    }
}

/// Presence test for optional request fields.
pub trait Present<T> {
    /// The value, if it is set and not blank.
    fn present(&self) -> Option<&T>;

    fn is_present(&self) -> bool {
        self.present().is_some()
    }
}

impl<T: Blank> Present<T> for Option<T> {
    fn present(&self) -> Option<&T> {
        self.as_ref().filter(|v| !v.is_blank())
    }
}

/// Partial task.
///
/// On create the ID must be absent; on patch it selects the task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct TaskRequest {
    /// Task ID (patch only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// NotStarted, InProgress, HavingIssues, Blocked or Completed (or 0..=4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TaskState>,
    /// E-mail of the person accountable for the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accountable: Option<Email>,
    /// What must be achieved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    /// RFC 3339 deadline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Timestamp>,
}

impl TaskRequest {
    /// Build a complete task from a validated create request.
    pub(crate) fn to_task(&self, id: Id) -> Task {
        Task {
            id,
            state: self.state.unwrap_or_default(),
            accountable: self.accountable.clone().unwrap_or_default(),
            objective: self.objective.clone().unwrap_or_default(),
            deadline: self.deadline.unwrap_or_default(),
        }
    }
}

impl From<&Task> for TaskRequest {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id.clone()),
            state: Some(task.state),
            accountable: Some(task.accountable.clone()),
            objective: Some(task.objective.clone()),
            deadline: Some(task.deadline),
        }
    }
}

/// Partial situation report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SitRepRequest {
    /// Sitrep ID (patch only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// When the situation was observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<Timestamp>,
    /// E-mail of the reporter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<Email>,
    /// E-mails to notify
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<Vec<Email>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<String>,
    /// To be decided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tbd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,
}

impl SitRepRequest {
    pub(crate) fn to_sitrep(&self, id: Id) -> SitRep {
        SitRep {
            id,
            datetime: self.datetime.unwrap_or_default(),
            by: self.by.clone().unwrap_or_default(),
            ping: self.ping.clone().unwrap_or_default(),
            situation: self.situation.clone().unwrap_or_default(),
            actions: self.actions.clone().unwrap_or_default(),
            tbd: self.tbd.clone().unwrap_or_default(),
            issues: self.issues.clone().unwrap_or_default(),
        }
    }

    /// Whether any of the four content fields holds non-whitespace text.
    pub fn has_content(&self) -> bool {
        [&self.situation, &self.actions, &self.tbd, &self.issues]
            .into_iter()
            .any(|field| field.present().is_some_and(|text| !text.trim().is_empty()))
    }
}

/// Partial order, used for create and patch.
///
/// On patch `task.id` selects the order. Any `meta` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct OrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegated_tasks: Option<Vec<TaskRequest>>,
    /// ID of the order this one was delegated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_order_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sitreps: Option<Vec<SitRepRequest>>,
    /// Ignored on every write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl OrderRequest {
    /// ID of the order a patch targets, if given.
    pub fn order_id(&self) -> Option<&Id> {
        self.task.as_ref().and_then(|t| t.id.present())
    }
}

/// Partial user, used for create and patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UserRequest {
    /// User ID (patch only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    /// E-mail of the supervising user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<Email>,
    /// Ignored on every write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl UserRequest {
    pub(crate) fn to_user(&self, id: Id, meta: Meta) -> User {
        User {
            id,
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            supervisor: self.supervisor.clone().unwrap_or_default(),
            meta,
        }
    }
}

/// Generic parameters for operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ById {
    /// The ID of the resource to operate on
    pub id: Id,
}

/// Parameters for deleting an order or a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Delete {
    /// The ID of the resource to delete
    pub id: Id,
    /// Purge the whole history instead of writing a tombstone
    #[serde(default)]
    pub hard: bool,
}

/// Parameters for listing orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListOrders {
    /// Only orders delegated from this order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_order_id: Option<Id>,
    /// Only orders whose primary task has this accountable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accountable: Option<Email>,
}

/// Parameters for appending delegated tasks (PUT) or patching them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DelegatedTasks {
    /// The order the tasks belong to
    pub order_id: Id,
    pub tasks: Vec<TaskRequest>,
}

/// Parameters for removing delegated tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DeleteDelegatedTasks {
    pub order_id: Id,
    /// IDs of the delegated tasks to remove; unknown IDs are ignored
    pub delegated_task_ids: Vec<Id>,
}

/// Parameters for appending sitreps (PUT) or patching them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SitReps {
    pub order_id: Id,
    pub sitreps: Vec<SitRepRequest>,
}

/// Parameters for removing sitreps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DeleteSitReps {
    pub order_id: Id,
    /// IDs of the sitreps to remove; unknown IDs are ignored
    pub sitrep_ids: Vec<Id>,
}

/// Parameters for listing users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListUsers {
    /// Only users with one of these e-mails
    #[serde(default)]
    pub emails: Vec<Email>,
    /// Only users reporting to this e-mail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<Email>,
}

/// Parameters for listing a user's subordinates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Subordinates {
    pub id: Id,
    /// Walk the whole reporting tree instead of direct reports only
    #[serde(default)]
    pub transitive: bool,
}
