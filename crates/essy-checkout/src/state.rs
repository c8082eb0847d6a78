//! # Shared Cart State
//!
//! The live cart behind a mutex, cloneable across the frontend and the
//! commit path. Locks are held only for the duration of a closure and
//! never across an await; the commit path takes a snapshot instead.

use std::sync::{Arc, Mutex, MutexGuard};

use essy_core::cart::Cart;

/// Thread-safe handle to the session's cart.
#[derive(Clone, Default)]
pub struct CartState {
    inner: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        CartState::default()
    }

    /// Runs a read-only closure against the cart.
    pub fn with_cart<R>(&self, f: impl FnOnce(&Cart) -> R) -> R {
        f(&self.lock())
    }

    /// Runs a mutating closure against the cart.
    pub fn with_cart_mut<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> R {
        f(&mut self.lock())
    }

    /// Clones the current cart contents.
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    // A poisoned lock still holds a structurally valid cart, so recover
    // rather than propagate the panic
    fn lock(&self) -> MutexGuard<'_, Cart> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
