//! Delegated-task operations for the Service.

use super::Service;
use crate::{
    display::UpdateResult,
    error::Result,
    merge::{self, Changes},
    models::Order,
    params::{DelegatedTasks, DeleteDelegatedTasks},
    validation::Mode,
};

impl Service {
    /// Appends delegated tasks under fresh IDs; one new order version.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` if the list is empty or a task
    /// carries an ID, `OrderlyError::NotFound` for unknown orders and
    /// `OrderlyError::Conflict` on a lost race.
    pub fn put_delegated_tasks(&self, params: &DelegatedTasks) -> Result<UpdateResult<Order>> {
        self.traced("put_delegated_tasks", |trace| {
            params.validate(Mode::Create)?;
            self.update_order(trace, &params.order_id, |order| {
                merge::append_delegated_tasks(order, &params.tasks)
            })
        })
    }

    /// Patches delegated tasks matched by ID; unknown IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` if a task lacks an ID,
    /// `OrderlyError::NotFound` for unknown orders and
    /// `OrderlyError::Conflict` on a lost race.
    pub fn patch_delegated_tasks(&self, params: &DelegatedTasks) -> Result<UpdateResult<Order>> {
        self.traced("patch_delegated_tasks", |trace| {
            params.validate(Mode::Patch)?;
            self.update_order(trace, &params.order_id, |order| {
                let mut changes = Changes::new();
                merge::merge_delegated_tasks(order, &params.tasks, &mut changes);
                changes
            })
        })
    }

    /// Removes delegated tasks by ID.
    ///
    /// When none of the IDs match, the order is returned unchanged and no
    /// version is written.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for an empty or malformed ID
    /// list, `OrderlyError::NotFound` for unknown orders and
    /// `OrderlyError::Conflict` on a lost race.
    pub fn delete_delegated_tasks(
        &self,
        params: &DeleteDelegatedTasks,
    ) -> Result<UpdateResult<Order>> {
        self.traced("delete_delegated_tasks", |trace| {
            params.validate()?;
            self.update_order(trace, &params.order_id, |order| {
                merge::remove_delegated_tasks(order, &params.delegated_task_ids)
            })
        })
    }
}
