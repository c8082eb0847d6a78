//! # Database Connection Pool
//!
//! Pool construction and lifecycle for the SQLite database.
//!
//! ## Connection Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Database Lifecycle                                  │
//! │                                                                         │
//! │  DbConfig ──► Database::connect()                                       │
//! │                    │                                                    │
//! │                    ├── SqliteConnectOptions (WAL, foreign keys)         │
//! │                    ├── SqlitePoolOptions (connection limits)            │
//! │                    ├── run_migrations()                                 │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │               Database ──► catalog() / ledger() / users()              │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │               close() on shutdown                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Options are built programmatically rather than from a URL string so
//! the in-memory database used by tests needs no special-case parsing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::migrations::run_migrations;
use crate::repository::{CatalogRepo, LedgerRepo, UserRepo};

// =============================================================================
// Configuration
// =============================================================================

/// Where and how to open the database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    path: PathBuf,
    in_memory: bool,
    max_connections: u32,
    acquire_timeout: Duration,
}

impl DbConfig {
    /// File-backed database at the given path, created if missing.
    pub fn new(path: impl AsRef<Path>) -> Self {
        DbConfig {
            path: path.as_ref().to_path_buf(),
            in_memory: false,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    /// In-memory database for tests.
    ///
    /// Pinned to a single pooled connection that never expires: each
    /// SQLite in-memory connection is its own database, so a larger
    /// pool would hand out empty databases.
    pub fn in_memory() -> Self {
        DbConfig {
            path: PathBuf::from(":memory:"),
            in_memory: true,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    /// Overrides the pool size. Ignored for in-memory databases.
    pub fn max_connections(mut self, max: u32) -> Self {
        if !self.in_memory {
            self.max_connections = max;
        }
        self
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the connection pool and the repositories over it.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and applies pending migrations.
    pub async fn connect(config: &DbConfig) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(if config.in_memory {
                SqliteJournalMode::Memory
            } else {
                SqliteJournalMode::Wal
            })
            .synchronous(SqliteSynchronous::Normal);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);

        if config.in_memory {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        debug!(path = %config.path.display(), "Opening database");
        let pool = pool_options.connect_with(options).await?;

        run_migrations(&pool).await?;
        info!(path = %config.path.display(), "Database ready");

        Ok(Database { pool })
    }

    /// Raw pool access for custom queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Product catalog repository.
    pub fn catalog(&self) -> CatalogRepo {
        CatalogRepo::new(self.pool.clone())
    }

    /// Transaction ledger repository.
    pub fn ledger(&self) -> LedgerRepo {
        LedgerRepo::new(self.pool.clone())
    }

    /// User account repository.
    pub fn users(&self) -> UserRepo {
        UserRepo::new(self.pool.clone())
    }

    /// Cheap liveness probe.
    pub async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Closes the pool, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
