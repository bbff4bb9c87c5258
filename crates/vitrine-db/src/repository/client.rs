//! # Client Repository
//!
//! Reads over the `clients` table plus the connection-level writes used by
//! change-set transactions.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use vitrine_core::Client;

const SELECT_CLIENT: &str = r#"
    SELECT id, name, phone, trust_score, credit_limit_cents, current_debt_cents,
           avatar_url, birth_date, notes, created_at, updated_at
    FROM clients
"#;

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Every client, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(&format!("{SELECT_CLIENT} ORDER BY name"))
            .fetch_all(&self.pool)
            .await?;
        Ok(clients)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!("{SELECT_CLIENT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    /// Inserts or updates a client inside an open transaction.
    ///
    /// Uses `ON CONFLICT DO UPDATE` rather than `INSERT OR REPLACE`: a
    /// replace deletes the row first, which would trip the sales foreign key.
    pub(crate) async fn upsert(conn: &mut SqliteConnection, client: &Client) -> DbResult<()> {
        debug!(id = %client.id, debt = client.current_debt_cents, "Upserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (
                id, name, phone, trust_score, credit_limit_cents, current_debt_cents,
                avatar_url, birth_date, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                trust_score = excluded.trust_score,
                credit_limit_cents = excluded.credit_limit_cents,
                current_debt_cents = excluded.current_debt_cents,
                avatar_url = excluded.avatar_url,
                birth_date = excluded.birth_date,
                notes = excluded.notes,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&client.id)
        .bind(&client.name)
        .bind(&client.phone)
        .bind(client.trust_score)
        .bind(client.credit_limit_cents)
        .bind(client.current_debt_cents)
        .bind(&client.avatar_url)
        .bind(client.birth_date)
        .bind(&client.notes)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub(crate) async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
