//! # Inventory Reconciler
//!
//! Stock arithmetic for the three transaction types.
//!
//! ## Counters
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product P                                                              │
//! │                                                                         │
//! │  stock_quantity  ████████████████████  10  (store property)             │
//! │  on_bag_quantity ████                   2  (away with clients)          │
//! │  available       ████████████████       8  (stock − on_bag)             │
//! │                                                                         │
//! │  SALE  qty q      stock −= q                                            │
//! │  BAG   qty q      on_bag += q            stock untouched                │
//! │  SETTLE (q → k)   on_bag −= q, stock −= k                               │
//! │                   the q − k returned pieces re-enter available          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure. Mutators work on a `Product` value the
//! caller owns (a clone inside a planned change set), never on the live
//! collections.

use crate::error::{CoreError, CoreResult};
use crate::types::Product;
use crate::MAX_ITEM_QUANTITY;

/// Quantity that may still be committed to a new cart.
///
/// Recomputed from the counters on every call so an edit to either counter
/// is seen immediately.
#[inline]
pub fn available_to_sell(product: &Product) -> i64 {
    (product.stock_quantity - product.on_bag_quantity).max(0)
}

/// Admission check while building a sale.
///
/// Fails when `already_in_cart + requested` is more than what is available.
/// Never mutates anything.
pub fn reserve_for_cart(product: &Product, requested: i64, already_in_cart: i64) -> CoreResult<()> {
    let wanted = already_in_cart + requested;

    if wanted > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: wanted,
            max: MAX_ITEM_QUANTITY,
        });
    }

    let available = available_to_sell(product);
    if wanted > available {
        return Err(CoreError::insufficient_stock(&product.name, available, wanted));
    }

    Ok(())
}

/// A piece leaves for good.
pub fn apply_sale_deduction(product: &mut Product, qty: i64) {
    product.stock_quantity = (product.stock_quantity - qty).max(0);
    clamp_bag(product);
}

/// A piece goes out on a bag. The physical count is left alone.
pub fn apply_bag_reservation(product: &mut Product, qty: i64) {
    product.on_bag_quantity += qty;
    clamp_bag(product);
}

/// Releases the whole original hold and removes only the kept pieces.
pub fn apply_bag_settlement(product: &mut Product, original_qty: i64, kept_qty: i64) {
    product.on_bag_quantity = (product.on_bag_quantity - original_qty).max(0);
    product.stock_quantity = (product.stock_quantity - kept_qty).max(0);
    clamp_bag(product);
}

// on_bag can never exceed stock
fn clamp_bag(product: &mut Product) {
    if product.on_bag_quantity > product.stock_quantity {
        product.on_bag_quantity = product.stock_quantity;
    }
}
