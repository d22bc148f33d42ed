// ⚙️ Configuration - environment variables only
//
// WOLFPACK_DB    SQLite path, or ":memory:" for the in-memory store (default: wolfpack.db)
// WOLFPACK_ADDR  listen address (default: 0.0.0.0:3000), only parsed by the server
// WOLFPACK_LOG   tracing filter, falls back to RUST_LOG, then "info"

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::store::{MemoryWolfStore, SqliteWolfStore, StoreResult, WolfStore};

pub const DEFAULT_DB_PATH: &str = "wolfpack.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const MEMORY_DB: &str = ":memory:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("WOLFPACK_ADDR `{value}` is not a socket address: {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("WOLFPACK_DB must not be empty")]
    EmptyDbPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite(PathBuf),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub store: StoreBackend,
    pub bind_addr: String,
    pub log_filter: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source (tests pass a closure over a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("WOLFPACK_DB") {
            Some(path) if path.trim().is_empty() => return Err(ConfigError::EmptyDbPath),
            Some(path) if path == MEMORY_DB => StoreBackend::Memory,
            Some(path) => StoreBackend::Sqlite(PathBuf::from(path)),
            None => StoreBackend::Sqlite(PathBuf::from(DEFAULT_DB_PATH)),
        };

        let bind_addr = lookup("WOLFPACK_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let log_filter = lookup("WOLFPACK_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .filter(|filter| !filter.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(ServerConfig {
            store,
            bind_addr,
            log_filter,
        })
    }

    /// Parse the listen address. The CLI never binds, so a bad value only fails here.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: self.bind_addr.clone(),
                source,
            })
    }

    pub fn open_store(&self) -> StoreResult<Arc<dyn WolfStore>> {
        let store: Arc<dyn WolfStore> = match &self.store {
            StoreBackend::Sqlite(path) => Arc::new(SqliteWolfStore::open(path)?),
            StoreBackend::Memory => Arc::new(MemoryWolfStore::new()),
        };
        Ok(store)
    }
}
