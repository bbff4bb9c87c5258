//! # Cash Register Commands
//!
//! ```text
//! open_register(float) ──► sell / receive / supply / bleed ──► close_register(counted)
//!                                                                   │
//!                                                   CloseReport { expected, variance }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrine_core::cash::current_balance;
use vitrine_core::{CashSession, CloseReport, Money, MovementKind, RegisterState};

use crate::error::ApiResult;
use crate::state::AppState;

/// The open session with its running drawer balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session: CashSession,
    pub balance_cents: i64,
}

impl From<CashSession> for SessionView {
    fn from(session: CashSession) -> Self {
        SessionView {
            balance_cents: current_balance(&session).cents(),
            session,
        }
    }
}

pub async fn register_state(state: &AppState) -> RegisterState {
    state.store.register_state().await
}

pub async fn active_session(state: &AppState) -> Option<SessionView> {
    state.store.active_session().await.map(SessionView::from)
}

/// Past and current sessions, newest first.
pub async fn list_sessions(state: &AppState) -> Vec<CashSession> {
    let mut sessions = state.store.sessions().await;
    sessions.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
    sessions
}

pub async fn open_register(state: &AppState, float_cents: i64) -> ApiResult<SessionView> {
    debug!(float = float_cents, "open_register command");
    let session = state
        .store
        .open_cash_register(Money::from_cents(float_cents))
        .await?;
    Ok(session.into())
}

pub async fn close_register(
    state: &AppState,
    counted_cents: i64,
    notes: Option<String>,
) -> ApiResult<CloseReport> {
    debug!(counted = counted_cents, "close_register command");
    Ok(state
        .store
        .close_cash_register(Money::from_cents(counted_cents), notes)
        .await?)
}

/// A supply (troco) or bleed (sangria).
pub async fn record_movement(
    state: &AppState,
    kind: MovementKind,
    amount_cents: i64,
    description: &str,
) -> ApiResult<SessionView> {
    debug!(kind = ?kind, amount = amount_cents, "record_movement command");
    let session = state
        .store
        .record_cash_movement(kind, Money::from_cents(amount_cents), description)
        .await?;
    Ok(session.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::app;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_register_round_trip() {
        let (state, _) = app().await;
        assert_eq!(register_state(&state).await, RegisterState::Closed);
        assert!(active_session(&state).await.is_none());

        let view = open_register(&state, 10000).await.unwrap();
        assert_eq!(view.balance_cents, 10000);

        let err = open_register(&state, 10000).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RegisterClosed);

        let view = record_movement(&state, MovementKind::Bleed, 2500, "Sangria")
            .await
            .unwrap();
        assert_eq!(view.balance_cents, 7500);

        let err = record_movement(&state, MovementKind::Sale, 100, "Manual")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let report = close_register(&state, 7000, Some("Faltou troco".into()))
            .await
            .unwrap();
        assert_eq!(report.variance.cents(), -500);
        assert_eq!(list_sessions(&state).await.len(), 1);
    }
}
