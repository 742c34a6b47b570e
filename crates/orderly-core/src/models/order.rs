//! Order aggregate.

use std::collections::HashSet;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Id, Meta, SitRep, Task, Versioned};
use crate::error::{OrderlyError, Result};

/// Aggregate root: one primary task, its delegated tasks and sitreps.
///
/// The order is identified by its primary task's ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Order {
    pub task: Task,
    #[serde(default)]
    pub delegated_tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_order_id: Option<Id>,
    #[serde(default)]
    pub sitreps: Vec<SitRep>,
    #[serde(default)]
    pub meta: Meta,
}

impl Order {
    pub fn id(&self) -> &Id {
        &self.task.id
    }

    pub fn delegated_task(&self, id: &Id) -> Option<&Task> {
        self.delegated_tasks.iter().find(|t| &t.id == id)
    }

    pub fn sitrep(&self, id: &Id) -> Option<&SitRep> {
        self.sitreps.iter().find(|s| &s.id == id)
    }

    /// Verify child IDs are unique within the aggregate.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::Internal` naming the duplicated ID.
    pub fn check_invariants(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for task in &self.delegated_tasks {
            if !seen.insert(&task.id) {
                return Err(OrderlyError::internal(format!(
                    "order {} holds delegated task {} twice",
                    self.id(),
                    task.id
                )));
            }
        }

        let mut seen = HashSet::new();
        for sitrep in &self.sitreps {
            if !seen.insert(&sitrep.id) {
                return Err(OrderlyError::internal(format!(
                    "order {} holds sitrep {} twice",
                    self.id(),
                    sitrep.id
                )));
            }
        }
        Ok(())
    }
}

impl Versioned for Order {
    const KIND: &'static str = "order";

    fn id(&self) -> &Id {
        &self.task.id
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    fn parent_key(&self) -> Option<String> {
        self.parent_order_id
            .as_ref()
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_delegated_ids_violate_invariants() {
        let id = Id::new();
        let order = Order {
            task: Task {
                id: Id::new(),
                ..Default::default()
            },
            delegated_tasks: vec![
                Task {
                    id: id.clone(),
                    ..Default::default()
                },
                Task {
                    id,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        match order.check_invariants() {
            Err(OrderlyError::Internal { message }) => {
                assert!(message.contains("delegated task"));
            }
            other => panic!("Expected Internal error, got {other:?}"),
        }
    }

    #[test]
    fn test_parent_key() {
        let parent = Id::new();
        let order = Order {
            parent_order_id: Some(parent.clone()),
            ..Default::default()
        };
        assert_eq!(order.parent_key(), Some(parent.to_string()));
        assert_eq!(Order::default().parent_key(), None);
    }
}
