//! # Expense Repository

use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use vitrine_core::Expense;

const SELECT_EXPENSE: &str = r#"
    SELECT id, description, amount_cents, category, date, paid, created_at
    FROM expenses
"#;

#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Every expense, most recent date first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(&format!(
            "{SELECT_EXPENSE} ORDER BY date DESC, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(expenses)
    }

    pub(crate) async fn upsert(conn: &mut SqliteConnection, expense: &Expense) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, description, amount_cents, category, date, paid, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (id) DO UPDATE SET
                description = excluded.description,
                amount_cents = excluded.amount_cents,
                category = excluded.category,
                date = excluded.date,
                paid = excluded.paid
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(expense.category)
        .bind(expense.date)
        .bind(expense.paid)
        .bind(expense.created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub(crate) async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
