//! Builder for creating and configuring Service instances.

use jiff::{tz::TimeZone, Timestamp, ToSpan};
use log::info;

use super::{ConflictPolicy, Service};
use crate::{
    error::{OrderlyError, Result},
    models::{Email, Id, Meta, Order, Task, TaskState, User},
    store::{Expect, MemoryStore, Repository, Snapshot},
};

/// Objective of the order every other order ultimately descends from.
pub const ROOT_OBJECTIVE: &str = "Root Order";

/// Builder for creating and configuring Service instances.
pub struct ServiceBuilder {
    policy: ConflictPolicy,
    root_accountable: Option<Email>,
    snapshot: Option<Snapshot>,
    orders: Option<Box<dyn Repository<Order>>>,
    users: Option<Box<dyn Repository<User>>>,
}

impl ServiceBuilder {
    /// Creates a new builder with in-memory repositories and
    /// [`ConflictPolicy::Reject`].
    pub fn new() -> Self {
        Self {
            policy: ConflictPolicy::default(),
            root_accountable: None,
            snapshot: None,
            orders: None,
            users: None,
        }
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Ensure a root order exists, accountable to `accountable`.
    ///
    /// An existing root order (one that is its own parent) is reused.
    pub fn with_root_order(mut self, accountable: impl Into<Email>) -> Self {
        self.root_accountable = Some(accountable.into());
        self
    }

    /// Seed the repositories from a snapshot.
    pub fn with_snapshot(mut self, snapshot: Option<Snapshot>) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn with_order_repository(mut self, repo: Box<dyn Repository<Order>>) -> Self {
        self.orders = Some(repo);
        self
    }

    pub fn with_user_repository(mut self, repo: Box<dyn Repository<User>>) -> Self {
        self.users = Some(repo);
        self
    }

    /// Builds the configured service instance.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` if the root accountable is not
    /// an e-mail address, and `OrderlyError::Internal` if the snapshot is
    /// malformed.
    pub fn build(self) -> Result<Service> {
        let orders = self
            .orders
            .unwrap_or_else(|| Box::new(MemoryStore::<Order>::new()));
        let users = self
            .users
            .unwrap_or_else(|| Box::new(MemoryStore::<User>::new()));

        if let Some(snapshot) = self.snapshot {
            info!(
                "restoring {} orders and {} users",
                snapshot.orders.len(),
                snapshot.users.len()
            );
            orders.import(snapshot.orders)?;
            users.import(snapshot.users)?;
        }

        let mut service = Service::new(orders, users, self.policy);
        if let Some(accountable) = self.root_accountable {
            accountable.validate("root.accountable")?;
            service.root_order_id = Some(Self::ensure_root(&service, accountable)?);
        }
        Ok(service)
    }

    fn ensure_root(service: &Service, accountable: Email) -> Result<Id> {
        let existing = service
            .orders
            .read_all()?
            .into_iter()
            .find(|o| o.parent_order_id.as_ref() == Some(o.id()));
        if let Some(root) = existing {
            return Ok(root.task.id);
        }

        let now = Timestamp::now();
        let deadline = now
            .to_zoned(TimeZone::UTC)
            .checked_add(100.years())
            .map_err(|e| OrderlyError::internal(format!("root deadline: {e}")))?
            .timestamp();
        let id = Id::new();
        let root = Order {
            task: Task {
                id: id.clone(),
                state: TaskState::InProgress,
                accountable,
                objective: ROOT_OBJECTIVE.to_string(),
                deadline,
            },
            delegated_tasks: Vec::new(),
            parent_order_id: Some(id.clone()),
            sitreps: Vec::new(),
            meta: Meta::new(now),
        };
        service.orders.write(root, Expect::Absent)?;
        info!("created root order {id}");
        Ok(id)
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
