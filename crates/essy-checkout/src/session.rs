//! # Cashier Session
//!
//! Tracks who is behind the register. Every committed transaction is
//! attributed to the session's user; role decides how much of the
//! ledger they may see.

use tracing::info;

use essy_core::types::User;
use essy_store::UserRepo;

use crate::error::{CheckoutError, CheckoutResult};

/// The active cashier, if anyone is logged in.
#[derive(Debug, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Starts a session for an active account.
    pub async fn login(&mut self, users: &UserRepo, username: &str) -> CheckoutResult<&User> {
        let user = users.find_by_username(username).await?;
        if !user.is_active {
            return Err(CheckoutError::AccountInactive {
                username: username.to_string(),
            });
        }

        info!(username = %user.username, role = ?user.role, "Session started");
        self.user = Some(user);
        self.current_user()
    }

    /// Ends the session.
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!(username = %user.username, "Session ended");
        }
    }

    /// The logged-in user, or `NotAuthenticated`.
    pub fn current_user(&self) -> CheckoutResult<&User> {
        self.user.as_ref().ok_or(CheckoutError::NotAuthenticated)
    }

    /// Whether anyone is logged in.
    pub fn is_active(&self) -> bool {
        self.user.is_some()
    }

    /// Whether the session holds the manager capability.
    pub fn is_manager(&self) -> bool {
        self.user.as_ref().map(User::is_manager).unwrap_or(false)
    }
}
