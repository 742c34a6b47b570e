//! High-level service API for orders and users.
//!
//! [`Service`] is the single entry point every interface talks to. Each
//! operation runs the same pipeline:
//!
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌────────────┐    ┌────────────┐
//! │  validate  │───▶│    read    │───▶│   merge    │───▶│   write    │
//! │ (requests) │    │ (latest v) │    │ (Changes)  │    │ (Expect)   │
//! └────────────┘    └────────────┘    └────────────┘    └────────────┘
//! ```
//!
//! A merge that changes nothing stops before the write and hands back the
//! stored version untouched.
//!
//! ## Submodules
//!
//! - [`builder`]: [`ServiceBuilder`], conflict policy, root order, snapshots
//! - [`order_ops`]: order create, read, list, patch, delete
//! - [`task_ops`]: delegated-task append, patch, remove
//! - [`sitrep_ops`]: sitrep append, patch, remove
//! - [`user_ops`]: user create, read, list, subordinates, patch, delete
//!
//! # Examples
//!
//! ```rust
//! use orderly_core::{
//!     params::{OrderRequest, TaskRequest},
//!     ServiceBuilder,
//! };
//!
//! # fn example() -> orderly_core::Result<()> {
//! let service = ServiceBuilder::new().build()?;
//!
//! let order = service.create_order(&OrderRequest {
//!     task: Some(TaskRequest {
//!         accountable: Some("lead@unit.org".into()),
//!         objective: Some("Secure the bridge".to_string()),
//!         deadline: Some("2030-01-01T00:00:00Z".parse().unwrap()),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! })?;
//! assert_eq!(order.meta.version, 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use jiff::Timestamp;
use log::info;

pub mod builder;
pub mod order_ops;
pub mod sitrep_ops;
pub mod task_ops;
pub mod user_ops;

#[cfg(test)]
mod tests;

pub use builder::ServiceBuilder;

use crate::{
    display::UpdateResult,
    error::Result,
    merge::{self, Changes},
    models::{Id, Order, User, Versioned},
    store::{Expect, Repository, Snapshot},
    trace::Trace,
};

/// How writes treat a concurrent writer that got there first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Compare-and-swap on the version read; losers get `Conflict`
    #[default]
    Reject,
    /// Every write lands; a concurrent update may be lost
    LastWriteWins,
}

impl ConflictPolicy {
    /// Write precondition for an update of the version `read`.
    pub fn expect(self, read: u64) -> Expect {
        match self {
            ConflictPolicy::Reject => Expect::Version(read),
            ConflictPolicy::LastWriteWins => Expect::Any,
        }
    }
}

/// Soft deletes write a tombstone; hard deletes purge the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    Soft,
    Hard,
}

impl From<bool> for DeleteMode {
    fn from(hard: bool) -> Self {
        if hard {
            DeleteMode::Hard
        } else {
            DeleteMode::Soft
        }
    }
}

/// Main service interface for managing orders and users.
pub struct Service {
    pub(crate) orders: Box<dyn Repository<Order>>,
    pub(crate) users: Box<dyn Repository<User>>,
    pub(crate) policy: ConflictPolicy,
    pub(crate) root_order_id: Option<Id>,
}

impl Service {
    pub(crate) fn new(
        orders: Box<dyn Repository<Order>>,
        users: Box<dyn Repository<User>>,
        policy: ConflictPolicy,
    ) -> Self {
        Self {
            orders,
            users,
            policy,
            root_order_id: None,
        }
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Export every order and user history.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::Internal` if a repository lock is poisoned.
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            orders: self.orders.export()?,
            users: self.users.export()?,
        })
    }

    /// Run `f` under a fresh trace named `op`.
    pub(crate) fn traced<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&Trace) -> Result<T>,
    ) -> Result<T> {
        let trace = Trace::new(op);
        let result = f(&trace);
        trace.finish(result)
    }

    /// Read-merge-write for one order.
    ///
    /// `apply` mutates a clone of the latest version and reports what it
    /// changed. No changes means no write.
    pub(crate) fn update_order(
        &self,
        trace: &Trace,
        id: &Id,
        apply: impl FnOnce(&mut Order) -> Changes,
    ) -> Result<UpdateResult<Order>> {
        let current = {
            let _span = trace.span("read");
            self.orders.read_by_id(id)?
        };

        let mut next = current.clone();
        let changes = {
            let _span = trace.span("merge");
            apply(&mut next)
        };
        if changes.is_empty() {
            return Ok(UpdateResult::new(current));
        }
        merge::stamp(&mut next, &changes, Timestamp::now());
        next.check_invariants()?;

        let _span = trace.span("write");
        let written = self
            .orders
            .write(next, self.policy.expect(current.meta.version))?;
        Ok(UpdateResult::with_changes(written, changes.into_vec()))
    }

    /// Soft or hard delete of any versioned entity.
    pub(crate) fn remove<T: Versioned>(
        &self,
        trace: &Trace,
        repo: &dyn Repository<T>,
        id: &Id,
        mode: DeleteMode,
    ) -> Result<T> {
        match mode {
            DeleteMode::Soft => {
                let current = {
                    let _span = trace.span("read");
                    repo.read_by_id(id)?
                };
                let mut tombstone = current.clone();
                tombstone.meta_mut().deleted = true;
                tombstone.meta_mut().bump(Timestamp::now());

                let _span = trace.span("write");
                let written = repo.write(tombstone, self.policy.expect(current.meta().version))?;
                info!("soft-deleted {} {id}", T::KIND);
                Ok(written)
            }
            DeleteMode::Hard => {
                let _span = trace.span("delete");
                let last = repo.delete(id)?;
                info!("hard-deleted {} {id}", T::KIND);
                Ok(last)
            }
        }
    }
}
