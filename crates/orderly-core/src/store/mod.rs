//! Versioned repository layer.
//!
//! A repository keeps an append-only history per identifier. Writes append a
//! whole new version; reads return clones, never references into the store.
//!
//! ## Submodules
//!
//! - [`memory`]: the in-memory [`MemoryStore`]
//! - [`snapshot`]: JSON export and import of every history

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::Snapshot;

use crate::{error::Result, models::Id};

/// Precondition a write must meet against the current latest version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// The key must not exist yet (create)
    Absent,
    /// The latest version must be exactly this one (compare-and-swap)
    Version(u64),
    /// No check; the write always lands
    Any,
}

/// Storage capability the service consumes.
///
/// Implementations must be safe to share between threads. Each call is
/// atomic on its own; sequences of calls are not.
pub trait Repository<T>: Send + Sync {
    /// Latest live version.
    ///
    /// # Errors
    ///
    /// `NotFound` when the key is absent or its latest version is a tombstone.
    fn read_by_id(&self, id: &Id) -> Result<T>;

    /// Whole history, oldest first, including a trailing tombstone.
    ///
    /// # Errors
    ///
    /// `NotFound` when the key is absent.
    fn read_versions(&self, id: &Id) -> Result<Vec<T>>;

    /// Latest live version of every key, ordered by creation time.
    fn read_all(&self) -> Result<Vec<T>>;

    /// Latest live versions whose parent key is `parent_key`.
    fn read_children(&self, parent_key: &str) -> Result<Vec<T>>;

    /// Append `entity` as the newest version of its key.
    ///
    /// # Errors
    ///
    /// `Conflict` when `expect` does not hold, `NotFound` when
    /// `Expect::Version` targets a missing key.
    fn write(&self, entity: T, expect: Expect) -> Result<T>;

    /// Purge the history of `id`, returning its last version.
    ///
    /// # Errors
    ///
    /// `NotFound` when the key is absent.
    fn delete(&self, id: &Id) -> Result<T>;

    /// Every history, for snapshots.
    fn export(&self) -> Result<Vec<Vec<T>>>;

    /// Replace the contents with the given histories.
    ///
    /// # Errors
    ///
    /// `Internal` when a history is empty or mixes keys.
    fn import(&self, histories: Vec<Vec<T>>) -> Result<()>;
}
