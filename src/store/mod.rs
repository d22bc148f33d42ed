// 🗄️ Wolf Store - persistence boundary
//
// The service only talks to `dyn WolfStore`. Two implementations:
// - SqliteWolfStore: rusqlite, WAL mode (production)
// - MemoryWolfStore: BTreeMap behind a RwLock (tests, ephemeral runs)
//
// Stores never validate. They only accept `Wolf`, which can only be built
// by validate::check() or by reading a row back.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;
use thiserror::Error;

use crate::wolf::Wolf;

pub use memory::MemoryWolfStore;
pub use sqlite::SqliteWolfStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("wolf {0} not found")]
    NotFound(i64),

    /// The stored version moved on since the caller read the record
    #[error("wolf {id} was modified concurrently (expected version {expected}, found {actual})")]
    Conflict { id: i64, expected: i64, actual: i64 },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A persisted row no longer parses as a wolf
    #[error("invalid persisted wolf data: {0}")]
    InvalidData(String),
}

/// Record access façade.
///
/// `replace` honours `wolf.version` as a concurrency token: `Some(v)` must
/// equal the stored version or the call fails with [`StoreError::Conflict`];
/// `None` overwrites unconditionally. Every successful write bumps the
/// version and returns the stored value.
pub trait WolfStore: Send + Sync {
    fn find_by_id(&self, id: i64) -> StoreResult<Option<Wolf>>;

    /// All wolves, ordered by id
    fn list_all(&self) -> StoreResult<Vec<Wolf>>;

    /// Store a new wolf. `wolf.id` and `wolf.version` are ignored.
    fn insert(&self, wolf: &Wolf) -> StoreResult<Wolf>;

    fn replace(&self, id: i64, wolf: &Wolf) -> StoreResult<Wolf>;

    fn remove(&self, id: i64) -> StoreResult<Wolf>;
}

impl<S: WolfStore + ?Sized> WolfStore for Arc<S> {
    fn find_by_id(&self, id: i64) -> StoreResult<Option<Wolf>> {
        (**self).find_by_id(id)
    }

    fn list_all(&self) -> StoreResult<Vec<Wolf>> {
        (**self).list_all()
    }

    fn insert(&self, wolf: &Wolf) -> StoreResult<Wolf> {
        (**self).insert(wolf)
    }

    fn replace(&self, id: i64, wolf: &Wolf) -> StoreResult<Wolf> {
        (**self).replace(id, wolf)
    }

    fn remove(&self, id: i64) -> StoreResult<Wolf> {
        (**self).remove(id)
    }
}
