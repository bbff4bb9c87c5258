//! # Cart
//!
//! The DRAFT state of a sale: what the seller is putting together before
//! posting it.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Seller Action          Cart Method            Check                    │
//! │  ─────────────          ───────────            ─────                    │
//! │                                                                         │
//! │  Tap product ─────────► add_item() ──────────► reserve_for_cart(        │
//! │                                                  requested,             │
//! │                                                  already in cart)       │
//! │                                                                         │
//! │  Change quantity ─────► update_quantity() ───► reserve_for_cart(        │
//! │                                                  new qty, 0)            │
//! │                                                                         │
//! │  Remove / clear ──────► remove_item() / clear()                         │
//! │                                                                         │
//! │  Finish ──────────────► to_request() ────────► SaleRequest              │
//! │                                                (re-checked at commit)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines keep a snapshot of the product for display. Prices shown here are
//! a preview: the posted sale takes prices from the product at commit time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::inventory::reserve_for_cart;
use crate::money::Money;
use crate::sale::{SaleLine, SaleRequest};
use crate::types::{PaymentMethod, Product, SaleKind};
use crate::validation::validate_quantity;
use crate::MAX_CART_ITEMS;

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub color: String,
    pub image_url: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartItem {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            size: product.size.clone(),
            color: product.color.clone(),
            image_url: product.image_url.clone(),
            unit_price_cents: product.sale_price_cents,
            quantity,
        }
    }

    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// The cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding again increases quantity)
/// - Every quantity passed `reserve_for_cart` when it was set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub client_id: Option<String>,
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn set_client(&mut self, client_id: impl Into<String>) {
        self.client_id = Some(client_id.into());
    }

    /// Adds `quantity` of a product, checking it against what is already in
    /// the cart.
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let already = self.quantity_of(&product.id);
        reserve_for_cart(product, quantity, already)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            item.quantity += quantity;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem::from_product(product, quantity));
        Ok(())
    }

    /// Sets a line's quantity. Zero removes the line.
    pub fn update_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            self.remove_item(&product.id);
            return Ok(());
        }
        validate_quantity(quantity)?;
        reserve_for_cart(product, quantity, 0)?;

        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ProductNotFound(product.id.clone())),
        }
    }

    /// Removes a line; returns whether it was there.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.client_id = None;
    }

    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map_or(0, |i| i.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Preview subtotal at the snapshot prices.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Turns the cart into a sale request.
    pub fn to_request(
        &self,
        kind: SaleKind,
        method: Option<PaymentMethod>,
        tendered_cents: Option<i64>,
        installments: u32,
    ) -> CoreResult<SaleRequest> {
        if self.items.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        let client_id = self.client_id.clone().ok_or_else(|| {
            CoreError::Validation(crate::error::ValidationError::Required {
                field: "client".to_string(),
            })
        })?;

        Ok(SaleRequest {
            client_id,
            lines: self
                .items
                .iter()
                .map(|i| SaleLine {
                    product_id: i.product_id.clone(),
                    quantity: i.quantity,
                })
                .collect(),
            kind,
            method,
            tendered_cents,
            installments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::tests::product;

    #[test]
    fn test_add_respects_available_to_sell() {
        let p = product(10, 2);
        let mut cart = Cart::new();

        assert!(matches!(
            cart.add_item(&p, 9),
            Err(CoreError::InsufficientStock { .. })
        ));
        assert!(cart.is_empty());

        cart.add_item(&p, 5).unwrap();
        cart.add_item(&p, 3).unwrap();
        assert_eq!(cart.quantity_of(&p.id), 8);
        assert_eq!(cart.items.len(), 1);

        // the ninth piece is not there
        assert!(cart.add_item(&p, 1).is_err());
        assert_eq!(cart.subtotal().cents(), 40000);
    }

    #[test]
    fn test_update_and_remove() {
        let p = product(4, 0);
        let mut cart = Cart::new();
        cart.add_item(&p, 1).unwrap();

        cart.update_quantity(&p, 4).unwrap();
        assert_eq!(cart.item_count(), 4);
        assert!(cart.update_quantity(&p, 5).is_err());

        cart.update_quantity(&p, 0).unwrap();
        assert!(cart.is_empty());
        assert!(!cart.remove_item(&p.id));
    }

    #[test]
    fn test_to_request_needs_client_and_items() {
        let p = product(4, 0);
        let mut cart = Cart::new();
        assert!(matches!(
            cart.to_request(SaleKind::Bag, None, None, 1),
            Err(CoreError::EmptyCart)
        ));

        cart.add_item(&p, 2).unwrap();
        assert!(cart.to_request(SaleKind::Bag, None, None, 1).is_err());

        cart.set_client("cli-1");
        let request = cart.to_request(SaleKind::Bag, None, None, 1).unwrap();
        assert_eq!(request.lines.len(), 1);
        assert_eq!(request.lines[0].quantity, 2);
    }
}
