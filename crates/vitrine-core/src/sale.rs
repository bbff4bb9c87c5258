//! # Sale Lifecycle Engine
//!
//! Plans the three transactions that move stock, debt and cash together.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   DRAFT (cart) ──create_sale(SALE)──► SALE, PAID                        │
//! │        │                                                                │
//! │        └───────create_sale(BAG)───► BAG, PENDING                        │
//! │                                      │    ▲                             │
//! │                       record_payment │    │ (PARTIAL, never PAID)       │
//! │                                      ▼    │                             │
//! │                               settle_bag(kept)                          │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                      SALE, PAID | PENDING | PARTIAL                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## One Transaction, One Change Set
//! `create_sale` stages the sale, every product touched, the client's debt
//! and the cash movement in a single [`ChangeSet`]. Either the backend
//! accepts all of it or none of it reaches the books.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::books::Books;
use crate::cash::{new_movement, RegisterState};
use crate::changeset::ChangeSet;
use crate::debt;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::inventory;
use crate::money::Money;
use crate::types::{
    MovementKind, PaymentMethod, Product, Sale, SaleItem, SaleKind, SaleStatus, StoreSettings,
};
use crate::validation::{validate_amount_cents, validate_installments, validate_quantity};
use crate::MAX_CART_ITEMS;

// =============================================================================
// Requests
// =============================================================================

/// One product and quantity to sell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Everything needed to post a sale or a bag.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    pub client_id: String,
    pub lines: Vec<SaleLine>,
    #[serde(rename = "type")]
    pub kind: SaleKind,
    /// Required for SALE, ignored for BAG.
    pub method: Option<PaymentMethod>,
    /// Cash handed over. Defaults to the exact total.
    pub tendered_cents: Option<i64>,
    /// Card installments, 1 when paid at once.
    pub installments: u32,
}

// =============================================================================
// Installment Plan
// =============================================================================

/// Display-only split of a credit total.
///
/// Installments are not tracked after the sale: the client pays the card
/// company, the store receives the full total.
///
/// ## Example
/// ```rust
/// use vitrine_core::money::Money;
/// use vitrine_core::sale::InstallmentPlan;
/// use vitrine_core::types::{PaymentMethod, StoreSettings};
///
/// let settings = StoreSettings::default(); // 5% above 1x
/// let plan = InstallmentPlan::compute(Money::from_cents(20000), PaymentMethod::Credit, 3, &settings);
/// assert_eq!(plan.surcharge.cents(), 1000);
/// assert_eq!(plan.total.cents(), 21000);
/// assert_eq!(plan.per_installment.cents(), 7000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InstallmentPlan {
    pub installments: u32,
    pub subtotal: Money,
    pub surcharge: Money,
    pub total: Money,
    pub per_installment: Money,
    /// The first installment carries the rounding remainder.
    pub first_installment: Money,
}

impl InstallmentPlan {
    pub fn compute(
        subtotal: Money,
        method: PaymentMethod,
        installments: u32,
        settings: &StoreSettings,
    ) -> Self {
        let installments = if method.allows_installments() {
            installments.max(1)
        } else {
            1
        };

        let surcharge = if installments > settings.interest_free_installments {
            subtotal.apply_rate(settings.installment_interest)
        } else {
            Money::zero()
        };

        let total = subtotal + surcharge;
        let (share, remainder) = total.split(installments);
        InstallmentPlan {
            installments,
            subtotal,
            surcharge,
            total,
            per_installment: share,
            first_installment: share + remainder,
        }
    }
}

/// Result of a posted sale, for the receipt screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleReceipt {
    pub sale: Sale,
    /// Change owed to the client for a cash sale.
    pub change: Money,
    pub plan: InstallmentPlan,
}

// =============================================================================
// Planning
// =============================================================================

impl Books {
    /// Plans `create_sale`.
    ///
    /// Refusals, in order: register not open for today, unknown client,
    /// empty or oversized cart, stock no longer available, bad payment.
    pub fn plan_create_sale(
        &self,
        request: SaleRequest,
        settings: &StoreSettings,
        now: DateTime<Utc>,
    ) -> CoreResult<(ChangeSet, SaleReceipt)> {
        let session = self.require_open_register(now, settings.utc_offset_minutes)?;
        let client = self.require_client(&request.client_id)?;

        if request.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        // merge repeated products, keeping first-seen order
        let mut merged: Vec<SaleLine> = Vec::new();
        for line in &request.lines {
            validate_quantity(line.quantity)?;
            match merged.iter_mut().find(|m| m.product_id == line.product_id) {
                Some(existing) => existing.quantity += line.quantity,
                None => merged.push(line.clone()),
            }
        }
        if merged.len() > MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        // commit-time stock re-check
        let mut touched: Vec<Product> = Vec::with_capacity(merged.len());
        for line in &merged {
            let product = self.require_product(&line.product_id)?;
            inventory::reserve_for_cart(product, line.quantity, 0)?;
            touched.push(product.clone());
        }

        let sale_id = Uuid::new_v4().to_string();
        let items: Vec<SaleItem> = merged
            .iter()
            .zip(&touched)
            .enumerate()
            .map(|(position, (line, product))| SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                product_id: product.id.clone(),
                position: position as i64,
                name_snapshot: product.name.clone(),
                image_snapshot: product.image_url.clone(),
                size_snapshot: product.size.clone(),
                color_snapshot: product.color.clone(),
                quantity: line.quantity,
                unit_price_cents: product.sale_price_cents,
                unit_cost_cents: product.cost_price_cents,
            })
            .collect();
        let subtotal: Money = items.iter().map(SaleItem::line_total).sum();

        let (method, plan, paid, change) = match request.kind {
            SaleKind::Sale => {
                let method = request.method.ok_or_else(|| ValidationError::Required {
                    field: "payment method".to_string(),
                })?;
                if method.allows_installments() {
                    validate_installments(request.installments, settings.max_installments)?;
                }
                let plan = InstallmentPlan::compute(subtotal, method, request.installments, settings);

                let change = if method.is_physical_cash() {
                    if let Some(cents) = request.tendered_cents {
                        validate_amount_cents("tendered", cents)?;
                    }
                    let tendered = Money::from_cents(request.tendered_cents.unwrap_or(plan.total.cents()));
                    if tendered < plan.total {
                        return Err(CoreError::InsufficientTender {
                            total: plan.total,
                            tendered,
                        });
                    }
                    tendered - plan.total
                } else {
                    Money::zero()
                };
                let paid = plan.total;
                (Some(method), plan, paid, change)
            }
            SaleKind::Bag => {
                if !subtotal.is_positive() {
                    return Err(ValidationError::MustBePositive {
                        field: "bag total".to_string(),
                    }
                    .into());
                }
                let plan = InstallmentPlan::compute(subtotal, PaymentMethod::Cash, 1, settings);
                (None, plan, Money::zero(), Money::zero())
            }
        };

        let status = match request.kind {
            SaleKind::Sale => SaleStatus::from_amounts(paid, plan.total),
            SaleKind::Bag => SaleStatus::Pending,
        };

        let sale = Sale {
            id: sale_id.clone(),
            client_id: client.id.clone(),
            client_name: client.name.clone(),
            items,
            subtotal_cents: plan.subtotal.cents(),
            surcharge_cents: plan.surcharge.cents(),
            total_cents: plan.total.cents(),
            paid_cents: paid.cents(),
            status,
            kind: request.kind,
            installments: plan.installments,
            payment_method: method,
            created_at: now,
            updated_at: now,
            settled_at: None,
        };

        let mut cs = ChangeSet::new();
        cs.put_sale(sale.clone());

        for (line, mut product) in merged.iter().zip(touched) {
            match request.kind {
                SaleKind::Sale => inventory::apply_sale_deduction(&mut product, line.quantity),
                SaleKind::Bag => inventory::apply_bag_reservation(&mut product, line.quantity),
            }
            product.updated_at = now;
            cs.put_product(product);
        }

        let mut client = client.clone();
        debt::on_sale_created(&mut client, &sale);
        client.updated_at = now;
        self.stage_client_debt(&mut cs, client);

        if paid.is_positive() {
            let mut session = session.clone();
            session.movements.push(new_movement(
                &session.id,
                MovementKind::Sale,
                paid,
                format!("Venda para {}", sale.client_name),
                method,
                Some(sale.id.clone()),
                now,
            ));
            cs.put_session(session);
        }

        Ok((cs, SaleReceipt { sale, change, plan }))
    }

    /// Plans `record_payment`.
    ///
    /// A zero amount returns an empty change set. The RECEIPT movement is
    /// only recorded while a session for today is open; with no session the
    /// payment still settles the debt.
    pub fn plan_record_payment(
        &self,
        sale_id: &str,
        amount: Money,
        method: PaymentMethod,
        settings: &StoreSettings,
        now: DateTime<Utc>,
    ) -> CoreResult<ChangeSet> {
        if amount.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "payment amount".to_string(),
            }
            .into());
        }

        let sale = self.require_sale(sale_id)?;
        if sale.status == SaleStatus::Cancelled {
            return Err(CoreError::InvalidSaleStatus {
                sale_id: sale.id.clone(),
                current_status: sale.status.as_str().to_string(),
            });
        }

        if amount.is_zero() {
            return Ok(ChangeSet::new());
        }

        if amount > sale.remaining() {
            return Err(CoreError::OverPayment {
                sale_id: sale.id.clone(),
                remaining: sale.remaining(),
                attempted: amount,
            });
        }
        if sale.kind == SaleKind::Bag && amount == sale.remaining() {
            return Err(CoreError::BagNotSettled {
                sale_id: sale.id.clone(),
                remaining: sale.remaining(),
            });
        }

        let session = match self.register_state(now, settings.utc_offset_minutes) {
            RegisterState::Stale {
                session_id,
                opened_on,
            } => {
                return Err(CoreError::StaleSessionOpen {
                    session_id,
                    opened_on,
                })
            }
            RegisterState::Open { .. } => self.open_session().cloned(),
            RegisterState::Closed => None,
        };

        let mut client = self.require_client(&sale.client_id)?.clone();
        let mut sale = sale.clone();
        debt::on_payment_received(&mut client, &mut sale, amount);
        sale.updated_at = now;
        client.updated_at = now;

        let mut cs = ChangeSet::new();
        if let Some(mut session) = session {
            session.movements.push(new_movement(
                &session.id,
                MovementKind::Receipt,
                amount,
                format!("Recebimento de {}", sale.client_name),
                Some(method),
                Some(sale.id.clone()),
                now,
            ));
            cs.put_session(session);
        }
        cs.put_sale(sale);
        self.stage_client_debt(&mut cs, client);

        Ok(cs)
    }

    /// Plans `settle_bag`.
    ///
    /// `kept` maps product id to the quantity the client keeps; products
    /// left out are fully returned.
    pub fn plan_settle_bag(
        &self,
        sale_id: &str,
        kept: &HashMap<String, i64>,
        now: DateTime<Utc>,
    ) -> CoreResult<ChangeSet> {
        let sale = self.require_sale(sale_id)?;
        if !sale.is_open_bag() {
            return Err(CoreError::InvalidSaleStatus {
                sale_id: sale.id.clone(),
                current_status: format!("{} {:?}", sale.status.as_str(), sale.kind).to_uppercase(),
            });
        }

        for (product_id, qty) in kept {
            let original = sale
                .items
                .iter()
                .find(|i| &i.product_id == product_id)
                .ok_or_else(|| CoreError::InvalidSettlement {
                    reason: format!("product {product_id} is not in this bag"),
                })?;
            if *qty < 0 || *qty > original.quantity {
                return Err(CoreError::InvalidSettlement {
                    reason: format!(
                        "kept {qty} of {} but the bag holds {}",
                        original.name_snapshot, original.quantity
                    ),
                });
            }
        }

        let kept_items: Vec<SaleItem> = sale
            .items
            .iter()
            .filter_map(|item| {
                let qty = kept.get(&item.product_id).copied().unwrap_or(0);
                (qty > 0).then(|| SaleItem {
                    quantity: qty,
                    ..item.clone()
                })
            })
            .collect();

        let new_total: Money = kept_items.iter().map(SaleItem::line_total).sum();
        if new_total < sale.paid() {
            return Err(CoreError::InvalidSettlement {
                reason: format!(
                    "kept pieces total {new_total} but {} was already paid",
                    sale.paid()
                ),
            });
        }
        let reduction = sale.total() - new_total;

        let mut cs = ChangeSet::new();

        for item in &sale.items {
            let kept_qty = kept.get(&item.product_id).copied().unwrap_or(0);
            // a product deleted since would be restricted, but stay tolerant
            if let Some(product) = self.product(&item.product_id) {
                let mut product = product.clone();
                inventory::apply_bag_settlement(&mut product, item.quantity, kept_qty);
                product.updated_at = now;
                cs.put_product(product);
            }
        }

        let mut settled = sale.clone();
        settled.items = kept_items;
        settled.subtotal_cents = new_total.cents();
        settled.surcharge_cents = 0;
        settled.total_cents = new_total.cents();
        settled.kind = SaleKind::Sale;
        settled.status = SaleStatus::from_amounts(settled.paid(), new_total);
        settled.updated_at = now;
        settled.settled_at = Some(now);
        cs.put_sale(settled);

        let mut client = self.require_client(&sale.client_id)?.clone();
        debt::on_bag_settled(&mut client, reduction);
        client.updated_at = now;
        self.stage_client_debt(&mut cs, client);

        Ok(cs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::tests::client;
    use crate::inventory::tests::product;
    use crate::types::InterestRate;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap()
    }

    fn settings() -> StoreSettings {
        StoreSettings {
            utc_offset_minutes: 0,
            ..StoreSettings::default()
        }
    }

    fn books_with_register(stock: i64) -> Books {
        let mut books = Books::from_records(
            vec![client(0)],
            vec![product(stock, 0)],
            vec![],
            vec![],
            vec![],
        );
        let cs = books
            .plan_open_register(Money::from_cents(10000), None, now(), 0)
            .unwrap();
        books.apply(cs);
        books
    }

    fn request(kind: SaleKind, qty: i64, method: Option<PaymentMethod>) -> SaleRequest {
        SaleRequest {
            client_id: "cli-1".to_string(),
            lines: vec![SaleLine {
                product_id: "prod-1".to_string(),
                quantity: qty,
            }],
            kind,
            method,
            tendered_cents: None,
            installments: 1,
        }
    }

    #[test]
    fn test_installment_plan() {
        let settings = StoreSettings {
            installment_interest: InterestRate::from_bps(299),
            ..settings()
        };
        let plan = InstallmentPlan::compute(Money::from_cents(10000), PaymentMethod::Credit, 3, &settings);
        assert_eq!(plan.surcharge.cents(), 299);
        assert_eq!(plan.total.cents(), 10299);
        assert_eq!(plan.per_installment.cents(), 3433);
        assert_eq!(plan.first_installment.cents(), 3433);

        // pix never splits, never carries interest
        let plan = InstallmentPlan::compute(Money::from_cents(10000), PaymentMethod::Pix, 6, &settings);
        assert_eq!(plan.installments, 1);
        assert!(plan.surcharge.is_zero());
    }

    #[test]
    fn test_cash_sale_posts_everything_together() {
        let books = books_with_register(10);
        let mut req = request(SaleKind::Sale, 2, Some(PaymentMethod::Cash));
        req.tendered_cents = Some(12000);

        let (cs, receipt) = books.plan_create_sale(req, &settings(), now()).unwrap();
        assert_eq!(receipt.sale.total_cents, 10000);
        assert_eq!(receipt.sale.status, SaleStatus::Paid);
        assert_eq!(receipt.change.cents(), 2000);

        assert_eq!(cs.products[0].stock_quantity, 8);
        assert_eq!(cs.clients[0].current_debt_cents, 0);
        let movement = cs.sessions[0].movements.last().unwrap();
        assert_eq!(movement.kind, MovementKind::Sale);
        assert_eq!(movement.amount_cents, 10000);
        assert_eq!(movement.method, Some(PaymentMethod::Cash));
    }

    #[test]
    fn test_cash_sale_refuses_short_tender() {
        let books = books_with_register(10);
        let mut req = request(SaleKind::Sale, 1, Some(PaymentMethod::Cash));
        req.tendered_cents = Some(4000);
        assert!(matches!(
            books.plan_create_sale(req, &settings(), now()),
            Err(CoreError::InsufficientTender { .. })
        ));
    }

    #[test]
    fn test_bag_reserves_and_creates_debt() {
        let books = books_with_register(10);
        let (cs, receipt) = books
            .plan_create_sale(request(SaleKind::Bag, 3, None), &settings(), now())
            .unwrap();
        assert_eq!(receipt.sale.status, SaleStatus::Pending);
        assert_eq!(receipt.sale.paid_cents, 0);
        assert_eq!(cs.products[0].on_bag_quantity, 3);
        assert_eq!(cs.products[0].stock_quantity, 10);
        assert_eq!(cs.clients[0].current_debt_cents, 15000);
        assert!(cs.sessions.is_empty());
    }

    #[test]
    fn test_sale_requires_register() {
        let books = Books::from_records(vec![client(0)], vec![product(5, 0)], vec![], vec![], vec![]);
        assert!(matches!(
            books.plan_create_sale(request(SaleKind::Sale, 1, Some(PaymentMethod::Pix)), &settings(), now()),
            Err(CoreError::RegisterClosed)
        ));
    }

    #[test]
    fn test_repeated_lines_are_checked_together() {
        let books = books_with_register(3);
        let mut req = request(SaleKind::Sale, 2, Some(PaymentMethod::Pix));
        req.lines.push(SaleLine {
            product_id: "prod-1".to_string(),
            quantity: 2,
        });
        assert!(matches!(
            books.plan_create_sale(req, &settings(), now()),
            Err(CoreError::InsufficientStock { available: 3, requested: 4, .. })
        ));
    }

    #[test]
    fn test_payment_rules() {
        let mut books = books_with_register(10);
        let (cs, receipt) = books
            .plan_create_sale(request(SaleKind::Bag, 4, None), &settings(), now())
            .unwrap();
        books.apply(cs);
        let id = receipt.sale.id;

        // zero is a no-op
        let cs = books
            .plan_record_payment(&id, Money::zero(), PaymentMethod::Cash, &settings(), now())
            .unwrap();
        assert!(cs.is_empty());

        // over the remaining balance is refused, not clamped
        assert!(matches!(
            books.plan_record_payment(&id, Money::from_cents(20001), PaymentMethod::Cash, &settings(), now()),
            Err(CoreError::OverPayment { .. })
        ));

        let cs = books
            .plan_record_payment(&id, Money::from_cents(5000), PaymentMethod::Pix, &settings(), now())
            .unwrap();
        assert_eq!(cs.sales[0].status, SaleStatus::Partial);
        assert_eq!(cs.clients[0].current_debt_cents, 15000);
        let receipt_movement = cs.sessions[0].movements.last().unwrap();
        assert_eq!(receipt_movement.kind, MovementKind::Receipt);
        assert_eq!(receipt_movement.method, Some(PaymentMethod::Pix));
    }

    #[test]
    fn test_huge_payment_is_an_overpayment() {
        let mut books = books_with_register(10);
        let (cs, receipt) = books
            .plan_create_sale(request(SaleKind::Bag, 2, None), &settings(), now())
            .unwrap();
        books.apply(cs);
        let id = receipt.sale.id;
        let cs = books
            .plan_record_payment(&id, Money::from_cents(100), PaymentMethod::Cash, &settings(), now())
            .unwrap();
        books.apply(cs);

        let err = books
            .plan_record_payment(&id, Money::from_cents(i64::MAX), PaymentMethod::Cash, &settings(), now())
            .unwrap_err();
        match err {
            CoreError::OverPayment { remaining, .. } => assert_eq!(remaining.cents(), 9900),
            other => panic!("expected OverPayment, got {other:?}"),
        }
        assert_eq!(books.sale(&id).unwrap().paid_cents, 100);
    }

    #[test]
    fn test_open_bag_cannot_be_paid_off_before_settlement() {
        let mut books = books_with_register(10);
        let (cs, receipt) = books
            .plan_create_sale(request(SaleKind::Bag, 2, None), &settings(), now())
            .unwrap();
        books.apply(cs);
        let id = receipt.sale.id;

        assert!(matches!(
            books.plan_record_payment(&id, Money::from_cents(10000), PaymentMethod::Pix, &settings(), now()),
            Err(CoreError::BagNotSettled { .. })
        ));

        // settling first releases the pieces, then the rest can be paid
        let kept = HashMap::from([("prod-1".to_string(), 2)]);
        let cs = books.plan_settle_bag(&id, &kept, now()).unwrap();
        books.apply(cs);
        assert_eq!(books.product("prod-1").unwrap().on_bag_quantity, 0);

        let cs = books
            .plan_record_payment(&id, Money::from_cents(10000), PaymentMethod::Pix, &settings(), now())
            .unwrap();
        assert_eq!(cs.sales[0].status, SaleStatus::Paid);
    }

    #[test]
    fn test_settlement_rewrites_bag() {
        let mut books = books_with_register(10);
        let (cs, receipt) = books
            .plan_create_sale(request(SaleKind::Bag, 3, None), &settings(), now())
            .unwrap();
        books.apply(cs);

        let kept = HashMap::from([("prod-1".to_string(), 1)]);
        let cs = books.plan_settle_bag(&receipt.sale.id, &kept, now()).unwrap();

        let settled = &cs.sales[0];
        assert_eq!(settled.kind, SaleKind::Sale);
        assert_eq!(settled.total_cents, 5000);
        assert_eq!(settled.status, SaleStatus::Pending);
        assert_eq!(settled.items.len(), 1);
        assert_eq!(settled.items[0].quantity, 1);
        assert_eq!(cs.products[0].on_bag_quantity, 0);
        assert_eq!(cs.products[0].stock_quantity, 9);
        assert_eq!(cs.clients[0].current_debt_cents, 5000);
    }

    #[test]
    fn test_settlement_rejects_bad_input() {
        let mut books = books_with_register(10);
        let (cs, receipt) = books
            .plan_create_sale(request(SaleKind::Bag, 2, None), &settings(), now())
            .unwrap();
        books.apply(cs);
        let id = receipt.sale.id;

        let too_many = HashMap::from([("prod-1".to_string(), 3)]);
        assert!(matches!(
            books.plan_settle_bag(&id, &too_many, now()),
            Err(CoreError::InvalidSettlement { .. })
        ));

        let stranger = HashMap::from([("prod-9".to_string(), 1)]);
        assert!(matches!(
            books.plan_settle_bag(&id, &stranger, now()),
            Err(CoreError::InvalidSettlement { .. })
        ));

        // returning everything settles at zero, which is PAID
        let cs = books.plan_settle_bag(&id, &HashMap::new(), now()).unwrap();
        assert_eq!(cs.sales[0].status, SaleStatus::Paid);
        assert!(cs.sales[0].items.is_empty());
        books.apply(cs);

        // and a settled bag cannot be settled again
        assert!(matches!(
            books.plan_settle_bag(&id, &HashMap::new(), now()),
            Err(CoreError::InvalidSaleStatus { .. })
        ));
    }
}
