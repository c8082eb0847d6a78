//! # Schema Migrations
//!
//! Embedded SQL migrations from `migrations/sqlite/` at the workspace
//! root. Applied automatically on [`crate::Database::connect`]; each
//! migration runs exactly once, tracked in `_sqlx_migrations`.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::StoreResult;

/// Migrations compiled into the binary.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies all pending migrations.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations up to date");
    Ok(())
}

/// Number of migrations known to this build.
pub fn migration_count() -> usize {
    MIGRATOR.iter().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_embedded() {
        assert!(migration_count() >= 1);
    }
}
