//! # Cash Session Ledger
//!
//! The drawer: one session per business day, a list of movements, and a
//! balance derived from them.
//!
//! ## Register States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   CLOSED ──open(float)──► OPEN ──close(counted)──► CLOSED               │
//! │                             │                                           │
//! │                             │ business day rolls over                   │
//! │                             ▼                                           │
//! │                           STALE ──close(counted)──► CLOSED              │
//! │                                                                         │
//! │   CLOSED  sales refused (RegisterClosed)                                │
//! │   STALE   sales, payments and openings refused (StaleSessionOpen)       │
//! │           close and manual movements still allowed                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Balance Law
//! ```text
//! balance = opening + Σsupply − Σbleed + Σ(cash-tendered sale + receipt)
//! ```
//! Pix and card tenders are recorded (they are revenue) but never counted
//! in the physical balance. The sum is order-independent.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::books::Books;
use crate::changeset::ChangeSet;
use crate::clock::business_date;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CashMovement, CashSession, MovementKind, PaymentMethod, SessionStatus};
use crate::validation::{validate_amount_cents, validate_positive_amount, validate_text};

// =============================================================================
// Register State
// =============================================================================

/// What the register looks like right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "state", rename_all = "UPPERCASE")]
#[ts(export)]
pub enum RegisterState {
    /// No session is open.
    Closed,
    /// A session opened today is running.
    Open { session_id: String },
    /// A session from an earlier business day was never closed.
    Stale {
        session_id: String,
        #[ts(as = "String")]
        opened_on: NaiveDate,
    },
}

impl RegisterState {
    pub fn is_open(&self) -> bool {
        matches!(self, RegisterState::Open { .. })
    }
}

/// Physical drawer balance of a session.
pub fn current_balance(session: &CashSession) -> Money {
    session.movements.iter().map(CashMovement::drawer_effect).sum()
}

// =============================================================================
// Close Report
// =============================================================================

/// Money taken in per tender during a session (SALE and RECEIPT movements).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TenderBreakdown {
    pub cash: Money,
    pub pix: Money,
    pub debit: Money,
    pub credit: Money,
}

impl TenderBreakdown {
    pub fn from_session(session: &CashSession) -> Self {
        let mut breakdown = TenderBreakdown::default();
        for movement in session
            .movements
            .iter()
            .filter(|m| matches!(m.kind, MovementKind::Sale | MovementKind::Receipt))
        {
            let slot = match movement.method.unwrap_or(PaymentMethod::Cash) {
                PaymentMethod::Cash => &mut breakdown.cash,
                PaymentMethod::Pix => &mut breakdown.pix,
                PaymentMethod::Debit => &mut breakdown.debit,
                PaymentMethod::Credit => &mut breakdown.credit,
            };
            *slot += movement.amount();
        }
        breakdown
    }

    /// Everything taken in, whatever the tender.
    pub fn total(&self) -> Money {
        self.cash + self.pix + self.debit + self.credit
    }
}

/// What the operator sees after closing the register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CloseReport {
    pub session_id: String,
    pub opening: Money,
    pub supplies: Money,
    pub bleeds: Money,
    /// Ledger balance at close.
    pub expected: Money,
    /// What the operator counted.
    pub counted: Money,
    /// counted − expected; negative means the drawer is short.
    pub variance: Money,
    pub tenders: TenderBreakdown,
    /// Movements per kind, keyed by `MovementKind` name.
    pub movement_counts: BTreeMap<String, usize>,
}

impl CloseReport {
    fn build(session: &CashSession, counted: Money) -> Self {
        let sum_of = |kind: MovementKind| -> Money {
            session
                .movements
                .iter()
                .filter(|m| m.kind == kind)
                .map(CashMovement::amount)
                .sum()
        };

        let mut movement_counts = BTreeMap::new();
        for m in &session.movements {
            *movement_counts.entry(format!("{:?}", m.kind).to_uppercase()).or_insert(0) += 1;
        }

        let expected = current_balance(session);
        CloseReport {
            session_id: session.id.clone(),
            opening: Money::from_cents(session.opening_balance_cents),
            supplies: sum_of(MovementKind::Supply),
            bleeds: sum_of(MovementKind::Bleed),
            expected,
            counted,
            variance: counted - expected,
            tenders: TenderBreakdown::from_session(session),
            movement_counts,
        }
    }
}

// =============================================================================
// Planning
// =============================================================================

pub(crate) fn new_movement(
    session_id: &str,
    kind: MovementKind,
    amount: Money,
    description: impl Into<String>,
    method: Option<PaymentMethod>,
    sale_id: Option<String>,
    now: DateTime<Utc>,
) -> CashMovement {
    CashMovement {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        kind,
        amount_cents: amount.cents(),
        description: description.into(),
        method,
        sale_id,
        created_at: now,
    }
}

impl Books {
    /// Classifies the OPEN session, if any, against today's business date.
    pub fn register_state(&self, now: DateTime<Utc>, utc_offset_minutes: i32) -> RegisterState {
        match self.open_session() {
            None => RegisterState::Closed,
            Some(session) => {
                let opened_on = business_date(session.opened_at, utc_offset_minutes);
                if opened_on < business_date(now, utc_offset_minutes) {
                    RegisterState::Stale {
                        session_id: session.id.clone(),
                        opened_on,
                    }
                } else {
                    RegisterState::Open {
                        session_id: session.id.clone(),
                    }
                }
            }
        }
    }

    /// The OPEN session, provided it belongs to today.
    pub(crate) fn require_open_register(
        &self,
        now: DateTime<Utc>,
        utc_offset_minutes: i32,
    ) -> CoreResult<&CashSession> {
        match self.register_state(now, utc_offset_minutes) {
            RegisterState::Closed => Err(CoreError::RegisterClosed),
            RegisterState::Stale {
                session_id,
                opened_on,
            } => Err(CoreError::StaleSessionOpen {
                session_id,
                opened_on,
            }),
            RegisterState::Open { .. } => self.open_session().ok_or(CoreError::RegisterClosed),
        }
    }

    pub fn plan_open_register(
        &self,
        float: Money,
        opened_by: Option<String>,
        now: DateTime<Utc>,
        utc_offset_minutes: i32,
    ) -> CoreResult<ChangeSet> {
        validate_amount_cents("opening balance", float.cents())?;

        match self.register_state(now, utc_offset_minutes) {
            RegisterState::Closed => {}
            RegisterState::Open { session_id } => {
                return Err(CoreError::AlreadyOpen { session_id });
            }
            RegisterState::Stale {
                session_id,
                opened_on,
            } => {
                return Err(CoreError::StaleSessionOpen {
                    session_id,
                    opened_on,
                });
            }
        }

        let id = Uuid::new_v4().to_string();
        let opening = new_movement(&id, MovementKind::Opening, float, "Abertura de caixa", None, None, now);
        let session = CashSession {
            id,
            status: SessionStatus::Open,
            opening_balance_cents: float.cents(),
            movements: vec![opening],
            opened_by,
            opened_at: now,
            closed_at: None,
            counted_balance_cents: None,
            expected_balance_cents: None,
            notes: None,
        };

        let mut cs = ChangeSet::new();
        cs.put_session(session);
        Ok(cs)
    }

    /// Closes whatever session is OPEN, stale or not.
    pub fn plan_close_register(
        &self,
        counted: Money,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<(ChangeSet, CloseReport)> {
        validate_amount_cents("counted balance", counted.cents())?;

        let mut session = self.open_session().cloned().ok_or(CoreError::NoOpenSession)?;
        let report = CloseReport::build(&session, counted);

        session.status = SessionStatus::Closed;
        session.closed_at = Some(now);
        session.counted_balance_cents = Some(counted.cents());
        session.expected_balance_cents = Some(report.expected.cents());
        session.notes = notes.filter(|n| !n.trim().is_empty());

        let mut cs = ChangeSet::new();
        cs.put_session(session);
        Ok((cs, report))
    }

    /// A manual supply or bleed.
    ///
    /// Allowed on a stale session too, so the operator can fix the drawer
    /// before closing it.
    pub fn plan_cash_movement(
        &self,
        kind: MovementKind,
        amount: Money,
        description: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<ChangeSet> {
        if !kind.is_manual() {
            return Err(ValidationError::NotAllowed {
                field: "movement type".to_string(),
                allowed: vec!["SUPPLY".to_string(), "BLEED".to_string()],
            }
            .into());
        }
        validate_positive_amount("amount", amount.cents())?;
        validate_text("description", description, 200)?;

        let mut session = self.open_session().cloned().ok_or(CoreError::RegisterClosed)?;
        let movement = new_movement(&session.id, kind, amount, description.trim(), None, None, now);
        session.movements.push(movement);

        let mut cs = ChangeSet::new();
        cs.put_session(session);
        Ok(cs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
