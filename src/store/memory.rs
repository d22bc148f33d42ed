// In-memory WolfStore. Same contract as the SQLite store, no durability.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::{StoreError, StoreResult, WolfStore};
use crate::wolf::Wolf;

#[derive(Default)]
struct MemoryState {
    wolves: BTreeMap<i64, Wolf>,
    last_id: i64,
}

#[derive(Default)]
pub struct MemoryWolfStore {
    state: RwLock<MemoryState>,
}

impl MemoryWolfStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .wolves
            .len()
    }
}

impl WolfStore for MemoryWolfStore {
    fn find_by_id(&self, id: i64) -> StoreResult<Option<Wolf>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.wolves.get(&id).cloned())
    }

    fn list_all(&self) -> StoreResult<Vec<Wolf>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.wolves.values().cloned().collect())
    }

    fn insert(&self, wolf: &Wolf) -> StoreResult<Wolf> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.last_id += 1;

        let stored = Wolf {
            id: state.last_id,
            version: Some(1),
            ..wolf.clone()
        };
        state.wolves.insert(stored.id, stored.clone());

        Ok(stored)
    }

    fn replace(&self, id: i64, wolf: &Wolf) -> StoreResult<Wolf> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let current = state.wolves.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let actual = current.version.unwrap_or(1);

        if let Some(expected) = wolf.version {
            if expected != actual {
                return Err(StoreError::Conflict {
                    id,
                    expected,
                    actual,
                });
            }
        }

        *current = Wolf {
            id,
            version: Some(actual + 1),
            ..wolf.clone()
        };

        Ok(current.clone())
    }

    fn remove(&self, id: i64) -> StoreResult<Wolf> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.wolves.remove(&id).ok_or(StoreError::NotFound(id))
    }
}
