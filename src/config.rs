//! Configuration for the SQLite store backing the repositories.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the database file used by [`StoreConfig::from_env`].
pub const DATABASE_PATH_ENV: &str = "AUCTION_DATABASE_PATH";

/// Configuration for the SQLite store.
///
/// ```
/// use auction_repository::config::StoreConfig;
/// use std::path::PathBuf;
///
/// // In-memory store (default)
/// let config = StoreConfig::default();
///
/// // File-backed store
/// let config = StoreConfig {
///     database_path: Some(PathBuf::from("marketplace.db")),
///     ..StoreConfig::default()
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Database file path. If None, uses an in-memory database
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Whether to create the database file if it doesn't exist
    #[serde(default = "default_true")]
    pub create_if_missing: bool,

    /// Upper bound on pooled connections. Ignored for in-memory stores,
    /// where every connection would see its own empty database.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long `begin` waits for a free connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    1
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            create_if_missing: true,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl StoreConfig {
    /// Builds a configuration from `AUCTION_DATABASE_PATH`, falling back to
    /// an in-memory store when the variable is unset or empty.
    pub fn from_env() -> Self {
        let database_path = std::env::var(DATABASE_PATH_ENV)
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
        Self {
            database_path,
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.is_none()
    }

    pub(crate) fn pool_size(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections.max(1)
        }
    }

    pub(crate) fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}
