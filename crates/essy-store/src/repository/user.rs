//! # User Repository
//!
//! Cashier accounts backing the session provider. Authentication proper
//! is out of scope; accounts exist to attribute sales and to gate
//! ledger visibility by role.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use essy_core::types::{User, UserRole};
use essy_core::ValidationError;

use crate::error::{StoreError, StoreResult};

/// Fields for creating a user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
}

/// Repository for the `users` table.
#[derive(Clone)]
pub struct UserRepo {
    pool: SqlitePool,
}

const USER_COLUMNS: &str = "id, username, full_name, role, is_active, created_at";

impl UserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepo { pool }
    }

    /// Looks up an account by username, active or not.
    pub async fn find_by_username(&self, username: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = ?1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("user", username))
    }

    /// Looks up an account by id.
    pub async fn find_by_id(&self, id: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    /// Creates an account. Usernames are unique.
    pub async fn insert(&self, new: NewUser) -> StoreResult<User> {
        let username = new.username.trim().to_string();
        if username.is_empty() {
            return Err(ValidationError::Required {
                field: "username".to_string(),
            }
            .into());
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            full_name: new.full_name.trim().to_string(),
            role: new.role,
            is_active: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, username, full_name, role, is_active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        debug!(username = %user.username, role = ?user.role, "User created");
        Ok(user)
    }

    /// Deactivates an account; it can no longer start sessions.
    pub async fn deactivate(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("user", id));
        }
        Ok(())
    }

    /// Number of accounts, inactive included.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
