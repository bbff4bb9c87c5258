//! # Cart State
//!
//! The draft cart on the sales screen.
//!
//! ## Thread Safety
//! The cart sits behind `Arc<Mutex<T>>`: commands may run concurrently
//! and only one of them may change the cart at a time. Admission checks
//! happen inside the lock against the product snapshot the command read
//! from the store; the store re-checks stock again at checkout.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Screen Action          Command                 Cart Change             │
//! │  ─────────────          ───────                 ───────────             │
//! │  Pick client ─────────► set_cart_client() ────► client_id = id          │
//! │  Click product ───────► add_to_cart() ────────► reserve, push/increase  │
//! │  Change quantity ─────► update_cart_item() ───► reserve, set            │
//! │  Click remove ────────► remove_from_cart() ───► retain                  │
//! │  Finish ──────────────► checkout() ───────────► create_sale, clear      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use vitrine_core::Cart;

#[derive(Debug, Default, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        // a panic inside a closure leaves the cart itself consistent
        self.cart.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        f(&self.lock())
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_item(&product, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        f(&mut self.lock())
    }
}
