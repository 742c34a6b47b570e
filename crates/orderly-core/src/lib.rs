//! Core library for the Orderly order tracking application.
//!
//! Orders are hierarchical work items: a primary task, the tasks delegated
//! from it, and the situation reports ("sitreps") filed against it. Every
//! mutation produces a new immutable version of the whole aggregate.
//!
//! # Layers
//!
//! - [`models`]: complete aggregates as stored
//! - [`params`]: partial requests shared by every interface
//! - [`validation`]: request-shape checks
//! - [`merge`]: applies partial requests and reports what changed
//! - [`store`]: the versioned [`Repository`](store::Repository) and its
//!   in-memory implementation
//! - [`service`]: validate, read, merge, write for every operation
//! - [`display`]: markdown rendering of models and results
//! - [`trace`]: per-request trace context
//!
//! # Quick Start
//!
//! ```rust
//! use orderly_core::{
//!     params::{ById, OrderRequest, TaskRequest},
//!     ServiceBuilder,
//! };
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = ServiceBuilder::new()
//!     .with_root_order("root@root.com")
//!     .build()?;
//!
//! let order = service.create_order(&OrderRequest {
//!     task: Some(TaskRequest {
//!         accountable: Some("lead@unit.org".into()),
//!         objective: Some("Secure the bridge".to_string()),
//!         deadline: Some("2030-01-01T00:00:00Z".parse()?),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! })?;
//!
//! let fetched = service.get_order(&ById { id: order.id().clone() })?;
//! println!("{fetched}");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod display;
pub mod error;
pub mod merge;
pub mod models;
pub mod params;
pub mod service;
pub mod store;
pub mod trace;
pub mod validation;

// Re-export commonly used types
pub use display::{
    CreateResult, DeleteResult, OperationStatus, Orders, UpdateResult, Users, Versions,
};
pub use error::{ErrorBody, OrderlyError, Result};
pub use models::{Email, Id, Meta, Order, SitRep, Task, TaskState, User};
pub use params::{OrderRequest, SitRepRequest, TaskRequest, UserRequest};
pub use service::{ConflictPolicy, DeleteMode, Service, ServiceBuilder};
pub use store::{Expect, MemoryStore, Repository, Snapshot};
