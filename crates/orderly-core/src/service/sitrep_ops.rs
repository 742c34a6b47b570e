//! Sitrep operations for the Service.

use super::Service;
use crate::{
    display::UpdateResult,
    error::Result,
    merge::{self, Changes},
    models::Order,
    params::{DeleteSitReps, SitReps},
    validation::Mode,
};

impl Service {
    /// Appends sitreps under fresh IDs; one new order version.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` if the list is empty, a sitrep
    /// carries an ID or is incomplete, `OrderlyError::NotFound` for unknown
    /// orders and `OrderlyError::Conflict` on a lost race.
    pub fn put_sitreps(&self, params: &SitReps) -> Result<UpdateResult<Order>> {
        self.traced("put_sitreps", |trace| {
            params.validate(Mode::Create)?;
            self.update_order(trace, &params.order_id, |order| {
                merge::append_sitreps(order, &params.sitreps)
            })
        })
    }

    /// Patches sitreps matched by ID; unknown IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` if a sitrep lacks an ID,
    /// `OrderlyError::NotFound` for unknown orders and
    /// `OrderlyError::Conflict` on a lost race.
    pub fn patch_sitreps(&self, params: &SitReps) -> Result<UpdateResult<Order>> {
        self.traced("patch_sitreps", |trace| {
            params.validate(Mode::Patch)?;
            self.update_order(trace, &params.order_id, |order| {
                let mut changes = Changes::new();
                merge::merge_sitreps(order, &params.sitreps, &mut changes);
                changes
            })
        })
    }

    /// Removes sitreps by ID.
    ///
    /// When none of the IDs match, the order is returned unchanged and no
    /// version is written.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for an empty or malformed ID
    /// list, `OrderlyError::NotFound` for unknown orders and
    /// `OrderlyError::Conflict` on a lost race.
    pub fn delete_sitreps(&self, params: &DeleteSitReps) -> Result<UpdateResult<Order>> {
        self.traced("delete_sitreps", |trace| {
            params.validate()?;
            self.update_order(trace, &params.order_id, |order| {
                merge::remove_sitreps(order, &params.sitrep_ids)
            })
        })
    }
}
