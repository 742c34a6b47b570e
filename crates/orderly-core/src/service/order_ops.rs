//! Order operations for the Service.

use jiff::Timestamp;
use log::info;

use super::{DeleteMode, Service};
use crate::{
    display::{DeleteResult, UpdateResult},
    error::{OrderlyError, Result},
    merge,
    models::{Id, Meta, Order},
    params::{ById, Delete, ListOrders, OrderRequest, Present},
    store::Expect,
};

impl Service {
    /// Creates a new order at version 1.
    ///
    /// The primary task, every delegated task and every sitrep receive fresh
    /// identifiers.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` if the request carries IDs or
    /// is incomplete.
    pub fn create_order(&self, params: &OrderRequest) -> Result<Order> {
        self.traced("create_order", |trace| {
            {
                let _span = trace.span("validate");
                params.validate_create()?;
            }
            let task = params
                .task
                .as_ref()
                .ok_or_else(|| OrderlyError::invalid("order.task").required())?;

            let mut order = Order {
                task: task.to_task(Id::new()),
                delegated_tasks: Vec::new(),
                parent_order_id: params.parent_order_id.present().cloned(),
                sitreps: Vec::new(),
                meta: Meta::new(Timestamp::now()),
            };
            if let Some(tasks) = &params.delegated_tasks {
                merge::append_delegated_tasks(&mut order, tasks);
            }
            if let Some(sitreps) = &params.sitreps {
                merge::append_sitreps(&mut order, sitreps);
            }
            order.check_invariants()?;

            let _span = trace.span("write");
            let order = self.orders.write(order, Expect::Absent)?;
            info!("created order {}", order.id());
            Ok(order)
        })
    }

    /// Retrieves the latest live version of an order.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::NotFound` for unknown or soft-deleted orders.
    pub fn get_order(&self, params: &ById) -> Result<Order> {
        self.traced("get_order", |trace| {
            params.validate()?;
            let _span = trace.span("read");
            self.orders.read_by_id(&params.id)
        })
    }

    /// Lists live orders, optionally filtered by parent and by the primary
    /// task's accountable. A self-parented root never lists as its own child.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for malformed filter values.
    pub fn list_orders(&self, params: &ListOrders) -> Result<Vec<Order>> {
        self.traced("list_orders", |trace| {
            params.validate()?;
            let _span = trace.span("read");
            let orders = match params.parent_order_id.present() {
                Some(parent) => self
                    .orders
                    .read_children(parent.as_str())?
                    .into_iter()
                    .filter(|o| o.id() != parent)
                    .collect(),
                None => self.orders.read_all()?,
            };

            Ok(match params.accountable.present() {
                Some(accountable) => orders
                    .into_iter()
                    .filter(|o| &o.task.accountable == accountable)
                    .collect(),
                None => orders,
            })
        })
    }

    /// Returns every stored version of an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::NotFound` when the order never existed or was
    /// hard-deleted.
    pub fn order_versions(&self, params: &ById) -> Result<Vec<Order>> {
        self.traced("order_versions", |trace| {
            params.validate()?;
            let _span = trace.span("read");
            self.orders.read_versions(&params.id)
        })
    }

    /// Returns the live orders delegated from the given order.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::NotFound` when the parent order does not exist.
    pub fn order_children(&self, params: &ById) -> Result<Vec<Order>> {
        self.traced("order_children", |trace| {
            params.validate()?;
            let _span = trace.span("read");
            let parent = self.orders.read_by_id(&params.id)?;
            Ok(self
                .orders
                .read_children(parent.id().as_str())?
                .into_iter()
                .filter(|o| o.id() != parent.id())
                .collect())
        })
    }

    /// Patches an order's primary task, parent and matching sub-items.
    ///
    /// Returns the stored version unchanged when the patch changes nothing;
    /// otherwise writes exactly one new version.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::InvalidArgument` for malformed requests,
    /// `OrderlyError::NotFound` for unknown orders and
    /// `OrderlyError::Conflict` when another writer updated the order first.
    pub fn patch_order(&self, params: &OrderRequest) -> Result<UpdateResult<Order>> {
        self.traced("patch_order", |trace| {
            {
                let _span = trace.span("validate");
                params.validate_patch()?;
            }
            let id = params
                .order_id()
                .ok_or_else(|| OrderlyError::invalid("order.task.id").required())?;
            self.update_order(trace, id, |order| merge::merge_order(order, params))
        })
    }

    /// Deletes an order: soft writes a tombstone, hard purges its history.
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::NotFound` when there is nothing to delete.
    pub fn delete_order(&self, params: &Delete) -> Result<DeleteResult<Order>> {
        self.traced("delete_order", |trace| {
            params.validate()?;
            let mode = DeleteMode::from(params.hard);
            let last = self.remove(trace, self.orders.as_ref(), &params.id, mode)?;
            Ok(DeleteResult::new(last, mode))
        })
    }

    /// The root order configured through
    /// [`ServiceBuilder::with_root_order`](super::ServiceBuilder::with_root_order).
    ///
    /// # Errors
    ///
    /// Returns `OrderlyError::Internal` if the repository lock is poisoned.
    pub fn root_order(&self) -> Result<Option<Order>> {
        let Some(id) = &self.root_order_id else {
            return Ok(None);
        };
        match self.orders.read_by_id(id) {
            Ok(order) => Ok(Some(order)),
            Err(OrderlyError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
