//! # Cash Repository
//!
//! Cash sessions and their movement ledger.
//!
//! ## Append-Only Ledger
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cash_sessions   upserted (status, close figures change over time)     │
//! │  cash_movements  append-only: ON CONFLICT (id) DO NOTHING              │
//! │                                                                         │
//! │  A session row always travels with its full movement list, so writing  │
//! │  it again only inserts the movements the database hasn't seen yet.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use vitrine_core::{CashMovement, CashSession};

const SELECT_SESSION: &str = r#"
    SELECT id, status, opening_balance_cents, opened_by, opened_at, closed_at,
           counted_balance_cents, expected_balance_cents, notes
    FROM cash_sessions
"#;

const SELECT_MOVEMENT: &str = r#"
    SELECT id, session_id, kind, amount_cents, description, method, sale_id, created_at
    FROM cash_movements
"#;

#[derive(Debug, Clone)]
pub struct CashRepository {
    pool: SqlitePool,
}

impl CashRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashRepository { pool }
    }

    /// Every session with its movements, newest session first.
    pub async fn list_sessions(&self) -> DbResult<Vec<CashSession>> {
        let mut sessions = sqlx::query_as::<_, CashSession>(&format!(
            "{SELECT_SESSION} ORDER BY opened_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let movements = sqlx::query_as::<_, CashMovement>(&format!(
            "{SELECT_MOVEMENT} ORDER BY created_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut by_session: HashMap<String, Vec<CashMovement>> = HashMap::new();
        for movement in movements {
            by_session
                .entry(movement.session_id.clone())
                .or_default()
                .push(movement);
        }
        for session in &mut sessions {
            session.movements = by_session.remove(&session.id).unwrap_or_default();
        }

        Ok(sessions)
    }

    /// Writes a session row and appends any new movements.
    pub(crate) async fn upsert_session(
        conn: &mut SqliteConnection,
        session: &CashSession,
    ) -> DbResult<()> {
        debug!(
            id = %session.id,
            status = ?session.status,
            movements = session.movements.len(),
            "Upserting cash session"
        );

        sqlx::query(
            r#"
            INSERT INTO cash_sessions (
                id, status, opening_balance_cents, opened_by, opened_at, closed_at,
                counted_balance_cents, expected_balance_cents, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (id) DO UPDATE SET
                status = excluded.status,
                closed_at = excluded.closed_at,
                counted_balance_cents = excluded.counted_balance_cents,
                expected_balance_cents = excluded.expected_balance_cents,
                notes = excluded.notes
            "#,
        )
        .bind(&session.id)
        .bind(session.status)
        .bind(session.opening_balance_cents)
        .bind(&session.opened_by)
        .bind(session.opened_at)
        .bind(session.closed_at)
        .bind(session.counted_balance_cents)
        .bind(session.expected_balance_cents)
        .bind(&session.notes)
        .execute(&mut *conn)
        .await?;

        for movement in &session.movements {
            Self::append_movement(&mut *conn, movement).await?;
        }

        Ok(())
    }

    async fn append_movement(conn: &mut SqliteConnection, movement: &CashMovement) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cash_movements (
                id, session_id, kind, amount_cents, description, method, sale_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&movement.id)
        .bind(&movement.session_id)
        .bind(movement.kind)
        .bind(movement.amount_cents)
        .bind(&movement.description)
        .bind(movement.method)
        .bind(&movement.sale_id)
        .bind(movement.created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
