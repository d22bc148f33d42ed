// Wolfpack API - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod import;
pub mod logging;
pub mod service;
pub mod store;
pub mod validate;
pub mod wolf;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::{ConfigError, ServerConfig, StoreBackend};
pub use import::{import_rows, load_csv, ImportReport, RejectedRow};
pub use service::{Clock, FixedClock, ServiceError, SystemClock, WolfService};
pub use store::{MemoryWolfStore, SqliteWolfStore, StoreError, WolfStore};
pub use validate::{check, validate, ValidationError};
pub use wolf::{BirthDate, Gender, Location, Wolf, WolfRecord};

#[cfg(feature = "server")]
pub use api::{build_router, ApiError, ApiResponse, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
