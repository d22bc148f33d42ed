// 🐺 Wolf Service - the five operations behind the HTTP routes
//
// Preconditions are enforced here, before the store is touched:
// - replace: path id must equal payload id
// - create/replace: record must pass validate::check()

use chrono::{NaiveDateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{StoreError, WolfStore};
use crate::validate::{self, ValidationError};
use crate::wolf::{Wolf, WolfRecord};

// ============================================================================
// CLOCK
// ============================================================================

/// Source of "now" for the birth date check
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock, UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ============================================================================
// SERVICE ERROR
// ============================================================================

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("wolf {0} not found")]
    NotFound(i64),

    #[error("path id {path} does not match payload id {payload}")]
    IdMismatch { path: i64, payload: i64 },

    #[error("wolf {0} was modified concurrently")]
    Conflict(i64),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            StoreError::Conflict { id, .. } => ServiceError::Conflict(id),
            other => ServiceError::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// ============================================================================
// SERVICE
// ============================================================================

pub struct WolfService<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: WolfStore> WolfService<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        WolfService { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate against the service clock without touching the store
    pub fn check(&self, record: &WolfRecord) -> Result<Wolf, ValidationError> {
        validate::check(record, self.clock.now())
    }

    pub fn list(&self) -> ServiceResult<Vec<WolfRecord>> {
        let wolves = self.store.list_all()?;
        Ok(wolves.into_iter().map(WolfRecord::from).collect())
    }

    pub fn get(&self, id: i64) -> ServiceResult<WolfRecord> {
        self.store
            .find_by_id(id)?
            .map(WolfRecord::from)
            .ok_or(ServiceError::NotFound(id))
    }

    pub fn create(&self, record: &WolfRecord) -> ServiceResult<WolfRecord> {
        let wolf = self.check(record).map_err(|err| {
            warn!(field = err.field(), "rejected new wolf: {err}");
            err
        })?;

        let stored = self.store.insert(&wolf)?;
        info!(id = stored.id, name = %stored.name, "created wolf");

        Ok(stored.into())
    }

    pub fn replace(&self, id: i64, record: &WolfRecord) -> ServiceResult<()> {
        if id != record.id {
            warn!(path = id, payload = record.id, "rejected replace: id mismatch");
            return Err(ServiceError::IdMismatch {
                path: id,
                payload: record.id,
            });
        }

        let wolf = self.check(record).map_err(|err| {
            warn!(id, field = err.field(), "rejected replace: {err}");
            err
        })?;

        match self.store.replace(id, &wolf) {
            Ok(stored) => {
                info!(id, version = ?stored.version, "replaced wolf");
                Ok(())
            }
            Err(err @ StoreError::Conflict { .. }) => {
                warn!(id, "replace conflict: {err}");
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn delete(&self, id: i64) -> ServiceResult<WolfRecord> {
        let removed = self.store.remove(id)?;
        info!(id, "deleted wolf");
        Ok(removed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryWolfStore, StoreResult};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2024, 6, 15)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        ))
    }

    fn create_service() -> WolfService<MemoryWolfStore> {
        WolfService::with_clock(MemoryWolfStore::new(), clock())
    }

    fn create_test_record(name: &str) -> WolfRecord {
        WolfRecord {
            id: 0,
            name: name.to_string(),
            birth_date: "2020-03-01".to_string(),
            gender: 2,
            location: "45.0/-93.0".to_string(),
            version: None,
        }
    }

    /// Store that counts mutations, to prove rejected requests never reach it
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryWolfStore,
        mutations: AtomicUsize,
    }

    impl WolfStore for CountingStore {
        fn find_by_id(&self, id: i64) -> StoreResult<Option<Wolf>> {
            self.inner.find_by_id(id)
        }

        fn list_all(&self) -> StoreResult<Vec<Wolf>> {
            self.inner.list_all()
        }

        fn insert(&self, wolf: &Wolf) -> StoreResult<Wolf> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(wolf)
        }

        fn replace(&self, id: i64, wolf: &Wolf) -> StoreResult<Wolf> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            self.inner.replace(id, wolf)
        }

        fn remove(&self, id: i64) -> StoreResult<Wolf> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            self.inner.remove(id)
        }
    }

    #[test]
    fn test_create_assigns_id_and_normalizes() {
        let service = create_service();

        let created = service.create(&create_test_record("Raksha")).unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.location, "45/-93/0");
        assert_eq!(created.version, Some(1));

        assert_eq!(service.get(1).unwrap(), created);
        assert_eq!(service.list().unwrap(), vec![created]);
    }

    #[test]
    fn test_create_rejects_invalid_without_mutation() {
        let service = WolfService::with_clock(CountingStore::default(), clock());

        let mut record = create_test_record("Raksha");
        record.location = "91.0/0.0".to_string();

        let result = service.create(&record);
        assert!(matches!(
            result,
            Err(ServiceError::ValidationFailed(ValidationError::LatitudeOutOfRange(_)))
        ));
        assert_eq!(service.store().mutations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_scenario_f_id_mismatch_skips_store() {
        let service = WolfService::with_clock(CountingStore::default(), clock());

        let mut record = create_test_record("Akela");
        record.id = 6;

        let result = service.replace(5, &record);
        assert!(matches!(
            result,
            Err(ServiceError::IdMismatch {
                path: 5,
                payload: 6
            })
        ));
        assert_eq!(service.store().mutations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_id_mismatch_checked_before_validation() {
        let service = create_service();

        let mut record = create_test_record("Akela");
        record.id = 2;
        record.gender = 7;

        assert!(matches!(
            service.replace(1, &record),
            Err(ServiceError::IdMismatch { .. })
        ));
    }

    #[test]
    fn test_replace_outcomes() {
        let service = create_service();
        let created = service.create(&create_test_record("Akela")).unwrap();

        // Success
        let mut update = created.clone();
        update.name = "Akela the Lone".to_string();
        service.replace(created.id, &update).unwrap();
        assert_eq!(service.get(created.id).unwrap().name, "Akela the Lone");

        // Stale version
        assert!(matches!(
            service.replace(created.id, &update),
            Err(ServiceError::Conflict(id)) if id == created.id
        ));

        // Invalid payload
        let mut invalid = update.clone();
        invalid.version = None;
        invalid.birth_date = "2030-01-01".to_string();
        assert!(matches!(
            service.replace(created.id, &invalid),
            Err(ServiceError::ValidationFailed(ValidationError::FutureDate(_)))
        ));

        // Unknown id
        let mut missing = create_test_record("Ghost");
        missing.id = 77;
        assert!(matches!(
            service.replace(77, &missing),
            Err(ServiceError::NotFound(77))
        ));
    }

    #[test]
    fn test_delete_returns_removed_record() {
        let service = create_service();
        let created = service.create(&create_test_record("Akela")).unwrap();

        let removed = service.delete(created.id).unwrap();
        assert_eq!(removed, created);
        assert!(matches!(service.get(created.id), Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete(created.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_birth_date_checked_against_service_clock() {
        let service = create_service();

        let mut record = create_test_record("Pup");
        record.birth_date = "2024-06-15".to_string();
        assert!(service.check(&record).is_ok());

        record.birth_date = "2024-06-16".to_string();
        assert!(service.check(&record).is_err());
    }
}
