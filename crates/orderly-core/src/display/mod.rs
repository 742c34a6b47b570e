//! Display formatting and result types.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! the wrappers here add context: lists, version histories and the outcome
//! of create, update and delete operations.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Wrappers &      │    │   Formatted     │
//! │ (Order, User)   │───▶│ Result Types    │───▶│    Output       │
//! │                 │    │                 │    │  (Terminal/MCP) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: list wrappers (Orders, Users, Versions)
//! - [`results`]: operation results (CreateResult, UpdateResult, DeleteResult)
//! - [`status`]: status messages (OperationStatus)
//! - [`datetime`]: timestamp formatting
//! - [`models`]: Display implementations for domain models
//!
//! All formatters produce markdown.

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Orders, Users, Versions};
pub use datetime::{LocalDate, LocalDateTime};
pub use results::{CreateResult, DeleteResult, UpdateResult};
pub use status::OperationStatus;
