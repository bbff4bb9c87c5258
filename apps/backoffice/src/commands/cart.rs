//! # Cart Commands
//!
//! The sales screen's draft cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────────┐   │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│ Sale or Bag  │   │
//! │  │  Cart    │     │          │     │          │     │   posted     │   │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────────┘   │
//! │                        │                 │                              │
//! │                   add_to_cart       create_sale on the store           │
//! │                   update_item       (stock re-checked there)           │
//! │                   remove_item            │                              │
//! │                        │                 └─ Err: cart kept as it was    │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────► (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vitrine_core::sale::InstallmentPlan;
use vitrine_core::{Cart, CartItem, PaymentMethod, SaleKind, SaleReceipt};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Cart response including items and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub client_id: Option<String>,
    pub items: Vec<CartItem>,
    pub item_count: i64,
    pub subtotal_cents: i64,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            client_id: cart.client_id.clone(),
            items: cart.items.clone(),
            item_count: cart.item_count(),
            subtotal_cents: cart.subtotal().cents(),
        }
    }
}

/// How the operator wants to close the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(rename = "type")]
    pub kind: SaleKind,
    pub method: Option<PaymentMethod>,
    pub tendered_cents: Option<i64>,
    #[serde(default = "one")]
    pub installments: u32,
}

fn one() -> u32 {
    1
}

pub fn get_cart(state: &AppState) -> CartResponse {
    state.cart.with_cart(|c| CartResponse::from(c))
}

pub async fn set_cart_client(state: &AppState, client_id: &str) -> ApiResult<CartResponse> {
    debug!(client_id = %client_id, "set_cart_client command");
    let client = state
        .store
        .client(client_id)
        .await
        .ok_or_else(|| ApiError::not_found("Client", client_id))?;

    Ok(state.cart.with_cart_mut(|c| {
        c.set_client(client.id);
        CartResponse::from(&*c)
    }))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - If product already in cart: quantity increases
/// - The price shown is a preview; checkout charges the catalog price
/// - Refused with INSUFFICIENT_STOCK past what is not away on bags
pub async fn add_to_cart(
    state: &AppState,
    product_id: &str,
    quantity: Option<i64>,
) -> ApiResult<CartResponse> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity, "add_to_cart command");

    let product = state
        .store
        .product(product_id)
        .await
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    state.cart.with_cart_mut(|c| -> ApiResult<CartResponse> {
        c.add_item(&product, quantity)?;
        Ok(CartResponse::from(&*c))
    })
}

/// Sets a line's quantity. Zero removes it.
pub async fn update_cart_item(
    state: &AppState,
    product_id: &str,
    quantity: i64,
) -> ApiResult<CartResponse> {
    debug!(product_id = %product_id, quantity, "update_cart_item command");

    let product = state
        .store
        .product(product_id)
        .await
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    state.cart.with_cart_mut(|c| -> ApiResult<CartResponse> {
        c.update_quantity(&product, quantity)?;
        Ok(CartResponse::from(&*c))
    })
}

pub fn remove_from_cart(state: &AppState, product_id: &str) -> ApiResult<CartResponse> {
    debug!(product_id = %product_id, "remove_from_cart command");
    state.cart.with_cart_mut(|c| -> ApiResult<CartResponse> {
        if !c.remove_item(product_id) {
            return Err(ApiError::not_found("Cart item", product_id));
        }
        Ok(CartResponse::from(&*c))
    })
}

pub fn clear_cart(state: &AppState) -> CartResponse {
    debug!("clear_cart command");
    state.cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::from(&*c)
    })
}

/// Installment preview for the payment modal.
pub async fn quote_installments(
    state: &AppState,
    method: PaymentMethod,
    installments: u32,
) -> InstallmentPlan {
    let settings = state.store.settings().await;
    let subtotal = state.cart.with_cart(|c| c.subtotal());
    InstallmentPlan::compute(subtotal, method, installments, &settings)
}

/// Posts the cart as a sale or bag and empties it.
///
/// On any refusal the cart stays as it was so the operator can fix it.
pub async fn checkout(state: &AppState, request: CheckoutRequest) -> ApiResult<SaleReceipt> {
    debug!(kind = ?request.kind, method = ?request.method, "checkout command");

    let sale_request = state.cart.with_cart(|c| {
        c.to_request(
            request.kind,
            request.method,
            request.tendered_cents,
            request.installments,
        )
    })?;

    let receipt = state.store.create_sale(sale_request).await?;
    state.cart.with_cart_mut(|c| c.clear());

    info!(
        sale_id = %receipt.sale.id,
        total = receipt.sale.total_cents,
        change = receipt.change.cents(),
        "Checkout complete"
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::clients::tests::input as client_input;
    use crate::commands::products::tests::input as product_input;
    use crate::commands::{cash, clients, products};
    use crate::error::ErrorCode;
    use vitrine_core::{Money, SaleStatus};

    #[tokio::test]
    async fn test_checkout_posts_and_clears_the_cart() {
        let (state, _) = crate::commands::test_support::app().await;
        let ana = clients::add_client(&state, client_input("Ana Souza", "11987654321")).await.unwrap();
        let dress = products::add_product(&state, product_input("Vestido", "Vestidos", 15000, 3))
            .await
            .unwrap();
        cash::open_register(&state, 10000).await.unwrap();

        set_cart_client(&state, &ana.id).await.unwrap();
        add_to_cart(&state, &dress.product.id, Some(2)).await.unwrap();
        let err = add_to_cart(&state, &dress.product.id, Some(2)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(get_cart(&state).subtotal_cents, 30000);

        let plan = quote_installments(&state, PaymentMethod::Credit, 3).await;
        assert_eq!(plan.total.cents(), 31500);

        let receipt = checkout(
            &state,
            CheckoutRequest {
                kind: SaleKind::Sale,
                method: Some(PaymentMethod::Cash),
                tendered_cents: Some(40000),
                installments: 1,
            },
        )
        .await
        .unwrap();
        assert_eq!(receipt.sale.status, SaleStatus::Paid);
        assert_eq!(receipt.change, Money::from_cents(10000));
        assert!(get_cart(&state).items.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_charges_the_current_catalog_price() {
        let (state, _) = crate::commands::test_support::app().await;
        let ana = clients::add_client(&state, client_input("Ana Souza", "11987654321")).await.unwrap();
        let dress = products::add_product(&state, product_input("Vestido", "Vestidos", 15000, 3))
            .await
            .unwrap();
        cash::open_register(&state, 0).await.unwrap();

        set_cart_client(&state, &ana.id).await.unwrap();
        add_to_cart(&state, &dress.product.id, None).await.unwrap();
        assert_eq!(get_cart(&state).subtotal_cents, 15000);

        // repriced while the piece sits in the cart
        products::update_product(
            &state,
            &dress.product.id,
            product_input("Vestido", "Vestidos", 12000, 3),
        )
        .await
        .unwrap();

        let receipt = checkout(
            &state,
            CheckoutRequest {
                kind: SaleKind::Sale,
                method: Some(PaymentMethod::Pix),
                tendered_cents: None,
                installments: 1,
            },
        )
        .await
        .unwrap();
        assert_eq!(receipt.sale.total_cents, 12000);
        assert_eq!(receipt.sale.items[0].unit_price_cents, 12000);
    }

    #[tokio::test]
    async fn test_refused_checkout_keeps_the_cart() {
        let (state, _) = crate::commands::test_support::app().await;
        let ana = clients::add_client(&state, client_input("Ana Souza", "11987654321")).await.unwrap();
        let dress = products::add_product(&state, product_input("Vestido", "Vestidos", 15000, 3))
            .await
            .unwrap();

        set_cart_client(&state, &ana.id).await.unwrap();
        add_to_cart(&state, &dress.product.id, None).await.unwrap();

        // register never opened
        let err = checkout(
            &state,
            CheckoutRequest {
                kind: SaleKind::Bag,
                method: None,
                tendered_cents: None,
                installments: 1,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::RegisterClosed);
        assert_eq!(get_cart(&state).item_count, 1);

        update_cart_item(&state, &dress.product.id, 0).await.unwrap();
        assert!(get_cart(&state).items.is_empty());
        let err = remove_from_cart(&state, &dress.product.id).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
