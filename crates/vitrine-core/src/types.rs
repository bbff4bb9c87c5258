//! # Domain Types
//!
//! Core domain types used throughout Vitrine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │      Sale       │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  client_id      │   │  id (UUID)      │       │
//! │  │  current_debt   │   │  kind SALE|BAG  │   │  stock_quantity │       │
//! │  │  trust_score    │   │  status         │   │  on_bag_quantity│       │
//! │  └─────────────────┘   │  items ─────────┼──►└─────────────────┘       │
//! │                        └────────┬────────┘     (snapshot, not FK)      │
//! │                                 │ paid > 0                              │
//! │  ┌─────────────────┐   ┌────────▼────────┐   ┌─────────────────┐       │
//! │  │    Expense      │   │  CashSession    │──►│  CashMovement   │       │
//! │  │  category       │   │  OPEN | CLOSED  │   │  OPENING, SALE, │       │
//! │  │  amount, paid   │   │  opening_balance│   │  RECEIPT, SUPPLY│       │
//! │  └─────────────────┘   └─────────────────┘   │  BLEED          │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are stored as `*_cents: i64` columns and exposed as [`Money`]
//! through accessor methods, the same shape the database rows have.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Interest Rate
// =============================================================================

/// Installment-credit interest rate in basis points (bps).
///
/// 1 basis point = 0.01%, so 299 bps = 2,99%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InterestRate(u32);

impl InterestRate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        InterestRate(bps)
    }

    /// Creates a rate from a percentage (for configuration input).
    pub fn from_percentage(pct: f64) -> Self {
        InterestRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        InterestRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for InterestRate {
    fn default() -> Self {
        InterestRate::zero()
    }
}

// =============================================================================
// Client
// =============================================================================

/// A store client (customer).
///
/// `current_debt_cents` is a cached running balance. The sale history is the
/// source of truth (see [`crate::debt`]), and the cache is rewritten from it
/// whenever a sale or payment touches the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Client {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Contact handle (phone number, used for WhatsApp).
    pub phone: String,

    /// How much the store trusts this client with bags and credit (1-5).
    pub trust_score: u8,

    /// Informational credit limit in centavos.
    pub credit_limit_cents: i64,

    /// Outstanding balance in centavos. Never negative.
    pub current_debt_cents: i64,

    pub avatar_url: Option<String>,

    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Client {
    #[inline]
    pub fn current_debt(&self) -> Money {
        Money::from_cents(self.current_debt_cents)
    }

    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_cents(self.credit_limit_cents)
    }

    /// True when the client's debt is above the informational credit limit.
    pub fn is_over_limit(&self) -> bool {
        self.credit_limit_cents > 0 && self.current_debt_cents > self.credit_limit_cents
    }
}

/// Input for creating a client.
///
/// New clients always start without debt: debt only ever comes from sales.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewClient {
    pub name: String,
    pub phone: String,
    pub trust_score: u8,
    pub credit_limit_cents: i64,
    pub avatar_url: Option<String>,
    #[ts(as = "Option<String>")]
    pub birth_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A clothing piece the store sells.
///
/// ## Stock Model
/// ```text
/// stock_quantity  = every unit the store owns (shelf + away in bags)
/// on_bag_quantity = units currently away in open bags
/// available       = stock_quantity − on_bag_quantity   (what a cart may take)
///
/// Invariant: 0 <= on_bag_quantity <= stock_quantity
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the seller and on the client's receipt.
    pub name: String,

    /// Category (e.g. "Vestidos", "Calças").
    pub category: String,

    /// Target gender descriptor (e.g. "Feminino", "Unissex").
    pub gender: String,

    /// Size label (e.g. "P", "M", "38").
    pub size: String,

    pub color: String,

    pub image_url: Option<String>,

    /// Cost in centavos (for profit reporting).
    pub cost_price_cents: i64,

    /// Sale price in centavos.
    pub sale_price_cents: i64,

    /// Total physical units owned, including units out on bags.
    pub stock_quantity: i64,

    /// Units currently away in open bags.
    pub on_bag_quantity: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }
}

/// Input for creating or editing a product.
///
/// Editing never touches `on_bag_quantity`: that counter belongs to the
/// bag lifecycle alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub gender: String,
    pub size: String,
    pub color: String,
    pub image_url: Option<String>,
    pub cost_price_cents: i64,
    pub sale_price_cents: i64,
    pub stock_quantity: i64,
}

// =============================================================================
// Sale Status / Kind / Payment Method
// =============================================================================

/// Payment status of a sale.
///
/// ```text
///   PENDING ──(partial payment)──► PARTIAL ──(rest paid)──► PAID
///      │                                                     ▲
///      └───────────────(full payment)────────────────────────┘
/// ```
/// `PAID` holds iff `paid >= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum SaleStatus {
    Pending,
    Partial,
    Paid,
    Cancelled,
}

impl SaleStatus {
    /// Derives the status from the amounts.
    pub fn from_amounts(paid: Money, total: Money) -> Self {
        if paid >= total {
            SaleStatus::Paid
        } else if paid.is_positive() {
            SaleStatus::Partial
        } else {
            SaleStatus::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "PENDING",
            SaleStatus::Partial => "PARTIAL",
            SaleStatus::Paid => "PAID",
            SaleStatus::Cancelled => "CANCELLED",
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Pending
    }
}

/// Whether a sale is a completed sale or a consignment bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum SaleKind {
    /// Goods leave the store for good.
    Sale,
    /// Goods leave on trial; the client returns what they don't keep.
    Bag,
}

/// How a client paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Physical cash: the only tender that lands in the drawer.
    Cash,
    /// Instant bank transfer.
    Pix,
    Debit,
    /// Credit card, optionally split into installments.
    Credit,
}

impl PaymentMethod {
    /// Whether this tender changes the physical drawer balance.
    #[inline]
    pub const fn is_physical_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }

    /// Whether installments (and their surcharge) may apply.
    #[inline]
    pub const fn allows_installments(&self) -> bool {
        matches!(self, PaymentMethod::Credit)
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "dinheiro" => Ok(PaymentMethod::Cash),
            "pix" => Ok(PaymentMethod::Pix),
            "debit" | "debito" | "débito" => Ok(PaymentMethod::Debit),
            "credit" | "credito" | "crédito" | "card" => Ok(PaymentMethod::Credit),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: vec![
                    "CASH".to_string(),
                    "PIX".to_string(),
                    "DEBIT".to_string(),
                    "CREDIT".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale or a consignment bag.
///
/// Items are frozen snapshots; only bag settlement rewrites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub client_id: String,
    /// Client name at the time of sale (denormalized for history display).
    pub client_name: String,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<SaleItem>,
    /// Σ quantity × unit price.
    pub subtotal_cents: i64,
    /// Installment-credit interest added on top of the subtotal.
    pub surcharge_cents: i64,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub status: SaleStatus,
    #[serde(rename = "type")]
    pub kind: SaleKind,
    /// Number of card installments (display only, 1 = paid at once).
    pub installments: u32,
    pub payment_method: Option<PaymentMethod>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// When a bag was settled into a sale.
    #[ts(as = "Option<String>")]
    pub settled_at: Option<DateTime<Utc>>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.paid_cents)
    }

    /// What the client still owes on this sale.
    #[inline]
    pub fn remaining(&self) -> Money {
        self.total().saturating_reduce(self.paid())
    }

    /// Whether this is a bag still out with the client.
    pub fn is_open_bag(&self) -> bool {
        self.kind == SaleKind::Bag
            && !matches!(self.status, SaleStatus::Paid | SaleStatus::Cancelled)
    }

    /// Whether this sale counts toward the client's debt.
    pub fn counts_as_debt(&self) -> bool {
        self.status != SaleStatus::Cancelled
    }

    /// Total quantity across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// A line item in a sale.
///
/// Uses the snapshot pattern: product data is frozen at the time of sale so
/// later edits to the product never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Position in the sale (keeps the original cart order).
    pub position: i64,
    pub name_snapshot: String,
    pub image_snapshot: Option<String>,
    pub size_snapshot: String,
    pub color_snapshot: String,
    pub quantity: i64,
    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Unit cost in centavos at time of sale (frozen, for profit reports).
    pub unit_cost_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn line_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Expense
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpenseCategory {
    Fixed,
    Variable,
    Marketing,
    Personnel,
    Taxes,
}

/// A store expense. Purely additive to the expense total in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount_cents: i64,
    pub category: ExpenseCategory,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub paid: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    pub description: String,
    pub amount_cents: i64,
    pub category: ExpenseCategory,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub paid: bool,
}

// =============================================================================
// Cash Session
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// Kind of cash movement.
///
/// ```text
///   OPENING, SUPPLY, SALE, RECEIPT  →  balance += amount
///   BLEED                           →  balance −= amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    /// Opening float, synthesized when the session opens.
    Opening,
    /// Money received for a sale.
    Sale,
    /// Money received against an outstanding debt.
    Receipt,
    /// Cash added to the drawer (e.g. change for the day).
    Supply,
    /// Cash removed from the drawer (sangria).
    Bleed,
}

impl MovementKind {
    /// Sign applied to the amount when computing the balance.
    #[inline]
    pub const fn sign(&self) -> i64 {
        match self {
            MovementKind::Bleed => -1,
            _ => 1,
        }
    }

    /// Movements the operator may record by hand.
    #[inline]
    pub const fn is_manual(&self) -> bool {
        matches!(self, MovementKind::Supply | MovementKind::Bleed)
    }
}

/// A single ledger entry in a cash session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashMovement {
    pub id: String,
    pub session_id: String,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    /// Always non-negative; the kind carries the sign.
    pub amount_cents: i64,
    pub description: String,
    /// Tender used; non-cash tenders are excluded from the drawer balance.
    pub method: Option<PaymentMethod>,
    /// The sale this movement came from, for SALE and RECEIPT.
    pub sale_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CashMovement {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// Whether this movement affects the physical drawer.
    ///
    /// Untagged movements (opening float, supplies, bleeds) are cash by
    /// definition.
    pub fn is_physical(&self) -> bool {
        self.method.map_or(true, |m| m.is_physical_cash())
    }

    /// The signed effect of this movement on the drawer.
    pub fn drawer_effect(&self) -> Money {
        if self.is_physical() {
            Money::from_cents(self.amount_cents * self.kind.sign())
        } else {
            Money::zero()
        }
    }
}

/// One open-to-close period of drawer operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashSession {
    pub id: String,
    pub status: SessionStatus,
    pub opening_balance_cents: i64,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub movements: Vec<CashMovement>,
    /// Who opened the register.
    pub opened_by: Option<String>,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Physical count at close.
    pub counted_balance_cents: Option<i64>,
    /// Ledger balance at close.
    pub expected_balance_cents: Option<i64>,
    pub notes: Option<String>,
}

// =============================================================================
// Identity & Settings
// =============================================================================

/// Operator role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Store owner: everything.
    Admin,
    /// Runs the store day to day; cannot manage users or settings.
    Manager,
    /// Sells and runs the register.
    Seller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Seller => "SELLER",
        }
    }
}

/// An authenticated operator, as returned by the backend login call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Identity {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Business settings editable from the Settings screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreSettings {
    pub store_name: String,
    /// Surcharge applied to credit sales split into installments.
    pub installment_interest: InterestRate,
    /// Installment counts up to this value carry no surcharge.
    pub interest_free_installments: u32,
    pub max_installments: u32,
    /// Offset from UTC used to decide the store's calendar day.
    pub utc_offset_minutes: i32,
    /// Outreach template for debt reminders. `{name}` and `{debt}` expand.
    pub debt_reminder_template: String,
    /// Outreach template for birthdays. `{name}` expands.
    pub birthday_template: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            store_name: "Vitrine Boutique".to_string(),
            installment_interest: InterestRate::from_bps(500),
            interest_free_installments: 1,
            max_installments: crate::MAX_INSTALLMENTS,
            utc_offset_minutes: -180,
            debt_reminder_template:
                "Olá {name}! Passando para lembrar do seu saldo em aberto de {debt}. Qualquer dúvida é só chamar."
                    .to_string(),
            birthday_template: "Feliz aniversário, {name}! Temos um presente esperando por você na loja."
                .to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interest_rate_from_percentage() {
        let rate = InterestRate::from_percentage(2.99);
        assert_eq!(rate.bps(), 299);
        assert!((rate.percentage() - 2.99).abs() < 0.001);
    }

    #[test]
    fn test_status_from_amounts() {
        let total = Money::from_cents(10000);
        assert_eq!(SaleStatus::from_amounts(Money::zero(), total), SaleStatus::Pending);
        assert_eq!(SaleStatus::from_amounts(Money::from_cents(1), total), SaleStatus::Partial);
        assert_eq!(SaleStatus::from_amounts(total, total), SaleStatus::Paid);
        // a zero-total sale is paid by definition
        assert_eq!(SaleStatus::from_amounts(Money::zero(), Money::zero()), SaleStatus::Paid);
    }

    #[test]
    fn test_movement_drawer_effect() {
        let mut movement = CashMovement {
            id: "m1".to_string(),
            session_id: "s1".to_string(),
            kind: MovementKind::Bleed,
            amount_cents: 2000,
            description: "Sangria".to_string(),
            method: None,
            sale_id: None,
            created_at: Utc::now(),
        };
        assert_eq!(movement.drawer_effect().cents(), -2000);

        movement.kind = MovementKind::Sale;
        movement.method = Some(PaymentMethod::Credit);
        assert_eq!(movement.drawer_effect(), Money::zero());

        movement.method = Some(PaymentMethod::Cash);
        assert_eq!(movement.drawer_effect().cents(), 2000);
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("dinheiro".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("PIX".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert_eq!("crédito".parse::<PaymentMethod>().unwrap(), PaymentMethod::Credit);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_sale_kind_serializes_as_type() {
        let json = serde_json::to_value(SaleKind::Bag).unwrap();
        assert_eq!(json, serde_json::json!("BAG"));
    }
}
