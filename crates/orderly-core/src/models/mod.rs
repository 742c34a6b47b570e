//! Data models for orders, tasks, sitreps and users.
//!
//! These are complete, validated values as the repository stores them.
//! Partial requests live in [`crate::params`]; Display implementations live
//! in [`crate::display::models`].

pub mod id;
pub mod meta;
pub mod order;
pub mod sitrep;
pub mod status;
pub mod task;
pub mod user;

pub use id::{Email, Id, ID_LEN};
pub use meta::{Meta, Versioned};
pub use order::Order;
pub use sitrep::SitRep;
pub use status::TaskState;
pub use task::Task;
pub use user::User;
