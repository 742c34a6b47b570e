//! Result wrapper types for displaying operation outcomes.
//!
//! This module provides wrapper types that format the results of create, update,
//! and delete operations with consistent messaging and resource display.

use std::fmt;

use crate::{
    models::{Order, User},
    service::DeleteMode,
};

/// Wrapper type for displaying the result of create operations.
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<Order> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created order with ID: {}", self.resource.id())?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<User> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created user with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations.
///
/// Carries the field paths the update changed. An empty change list means the
/// request was a no-op and `resource` is the version that was already stored.
///
/// # Examples
///
/// ```rust
/// use orderly_core::{display::UpdateResult, models::User};
///
/// let result = UpdateResult::with_changes(
///     User::default(),
///     vec!["supervisor".to_string()],
/// );
/// assert!(result.to_string().contains("Changes made:"));
/// assert!(!result.is_noop());
/// ```
#[derive(Debug, Clone)]
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    /// An update that changed nothing.
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }

    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn into_inner(self) -> T {
        self.resource
    }
}

impl<T> UpdateResult<T> {
    fn fmt_changes(&self, f: &mut fmt::Formatter<'_>, kind: &str, id: &str, version: u64) -> fmt::Result {
        if self.changes.is_empty() {
            writeln!(f, "No changes to {kind} with ID: {id} (version {version})")?;
        } else {
            writeln!(f, "Updated {kind} with ID: {id} to version {version}")?;
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for UpdateResult<Order> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = &self.resource;
        self.fmt_changes(f, "order", order.id().as_str(), order.meta.version)?;
        write!(f, "{order}")
    }
}

impl fmt::Display for UpdateResult<User> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = &self.resource;
        self.fmt_changes(f, "user", user.id.as_str(), user.meta.version)?;
        write!(f, "{user}")
    }
}

/// Wrapper type for displaying the result of delete operations.
#[derive(Debug, Clone)]
pub struct DeleteResult<T> {
    /// The tombstone (soft) or the last purged version (hard)
    pub resource: T,
    pub mode: DeleteMode,
    pub notes: Vec<String>,
}

impl<T> DeleteResult<T> {
    pub fn new(resource: T, mode: DeleteMode) -> Self {
        Self {
            resource,
            mode,
            notes: Vec::new(),
        }
    }

    /// Attach a follow-up effect of the deletion.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    fn verb(&self) -> &'static str {
        match self.mode {
            DeleteMode::Soft => "Deleted",
            DeleteMode::Hard => "Permanently deleted",
        }
    }

    fn fmt_notes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for note in &self.notes {
            writeln!(f, "- {note}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DeleteResult<Order> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} order '{}' (ID: {})",
            self.verb(),
            self.resource.task.objective,
            self.resource.id()
        )?;
        self.fmt_notes(f)
    }
}

impl fmt::Display for DeleteResult<User> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} user '{}' (ID: {})",
            self.verb(),
            self.resource.name,
            self.resource.id
        )?;
        self.fmt_notes(f)
    }
}
