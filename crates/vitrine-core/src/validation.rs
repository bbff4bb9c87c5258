//! # Validation Module
//!
//! Input validation for Vitrine records and actions.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (form hints, out of core)                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Books planners (Rust)                                        │
//! │  ├── THIS MODULE: field rules for clients, products, expenses          │
//! │  └── Business rules (stock, register, debt) in inventory/cash/sale     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints (restrict on sale history)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vitrine_core::validation::{validate_phone, validate_quantity};
//!
//! assert_eq!(validate_phone("(11) 98765-4321").unwrap(), "11987654321");
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::types::{NewClient, NewExpense, ProductInput, StoreSettings};
use crate::{
    MAX_AMOUNT_CENTS, MAX_CART_ITEMS, MAX_INSTALLMENTS, MAX_ITEM_QUANTITY, TRUST_SCORE_RANGE,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display text (names, descriptions).
///
/// ## Example
/// ```rust
/// use vitrine_core::validation::validate_text;
///
/// assert!(validate_text("name", "Vestido Midi Floral", 120).is_ok());
/// assert!(validate_text("name", "   ", 120).is_err());
/// ```
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a phone handle and returns its digits.
///
/// Accepts the usual Brazilian notations (`(11) 98765-4321`,
/// `+55 11 98765-4321`). Between 10 and 13 digits after stripping.
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if !(10..=13).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must have 10 to 13 digits".to_string(),
        });
    }

    Ok(digits)
}

/// Validates a login email. Deliberately loose: one `@` with text on both
/// sides and a dot in the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity entering a cart line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a non-negative amount in centavos (prices, limits, floats).
///
/// ## Example
/// ```rust
/// use vitrine_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents("price", 8990).is_ok());
/// assert!(validate_amount_cents("price", 0).is_ok());
/// assert!(validate_amount_cents("price", -100).is_err());
/// assert!(validate_amount_cents("price", i64::MAX).is_err());
/// ```
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Validates a strictly positive amount (expenses, manual movements).
pub fn validate_positive_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

pub fn validate_trust_score(score: u8) -> ValidationResult<()> {
    let (min, max) = TRUST_SCORE_RANGE;
    if score < min || score > max {
        return Err(ValidationError::OutOfRange {
            field: "trust score".to_string(),
            min: i64::from(min),
            max: i64::from(max),
        });
    }
    Ok(())
}

/// Validates an installment count against the store's configured maximum.
pub fn validate_installments(installments: u32, max: u32) -> ValidationResult<()> {
    let max = max.min(MAX_INSTALLMENTS);
    if installments == 0 || installments > max {
        return Err(ValidationError::OutOfRange {
            field: "installments".to_string(),
            min: 1,
            max: i64::from(max),
        });
    }
    Ok(())
}

/// Validates an interest rate in basis points (0% to 100%).
pub fn validate_interest_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "interest rate".to_string(),
            min: 0,
            max: 10000,
        });
    }
    Ok(())
}

/// Validates a UTC offset in minutes (UTC-12:00 to UTC+14:00).
pub fn validate_utc_offset(minutes: i32) -> ValidationResult<()> {
    if !(-720..=840).contains(&minutes) {
        return Err(ValidationError::OutOfRange {
            field: "utc offset".to_string(),
            min: -720,
            max: 840,
        });
    }
    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size before adding a new distinct line.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

pub fn validate_new_client(input: &NewClient) -> ValidationResult<()> {
    validate_text("name", &input.name, 120)?;
    validate_phone(&input.phone)?;
    validate_trust_score(input.trust_score)?;
    validate_amount_cents("credit limit", input.credit_limit_cents)?;
    Ok(())
}

pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_text("name", &input.name, 120)?;
    validate_text("category", &input.category, 60)?;
    validate_text("size", &input.size, 20)?;
    validate_amount_cents("cost price", input.cost_price_cents)?;
    validate_amount_cents("sale price", input.sale_price_cents)?;
    validate_amount_cents("stock quantity", input.stock_quantity)?;
    Ok(())
}

pub fn validate_new_expense(input: &NewExpense) -> ValidationResult<()> {
    validate_text("description", &input.description, 200)?;
    validate_positive_amount("amount", input.amount_cents)?;
    Ok(())
}

pub fn validate_settings(settings: &StoreSettings) -> ValidationResult<()> {
    validate_text("store name", &settings.store_name, 80)?;
    validate_interest_bps(settings.installment_interest.bps())?;
    validate_installments(settings.max_installments, MAX_INSTALLMENTS)?;
    if settings.interest_free_installments > settings.max_installments {
        return Err(ValidationError::OutOfRange {
            field: "interest-free installments".to_string(),
            min: 0,
            max: i64::from(settings.max_installments),
        });
    }
    validate_utc_offset(settings.utc_offset_minutes)?;
    validate_text("debt reminder template", &settings.debt_reminder_template, 500)?;
    validate_text("birthday template", &settings.birthday_template, 500)?;
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use vitrine_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
