//! # Sale Repository
//!
//! Database operations for sales, bags and their line items.
//!
//! ## Sale Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Sale Data Model                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                          sales                                   │   │
//! │  │  id, client_id, kind (SALE|BAG), status, totals, installments   │   │
//! │  └─────────────────────────────────┬───────────────────────────────┘   │
//! │                                    │ 1:N (ON DELETE CASCADE)           │
//! │                                    ▼                                    │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                        sale_items                                │   │
//! │  │  product_id, position, snapshots, quantity, unit price / cost   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items are rewritten as a block whenever their sale is written: bag
//! settlement is the only operation that changes them, and it can shrink
//! or drop lines.

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use vitrine_core::{Sale, SaleItem};

const SELECT_SALE: &str = r#"
    SELECT id, client_id, client_name, subtotal_cents, surcharge_cents, total_cents,
           paid_cents, status, kind, installments, payment_method,
           created_at, updated_at, settled_at
    FROM sales
"#;

const SELECT_ITEM: &str = r#"
    SELECT id, sale_id, product_id, position, name_snapshot, image_snapshot,
           size_snapshot, color_snapshot, quantity, unit_price_cents, unit_cost_cents
    FROM sale_items
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Every sale with its items, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let mut sales =
            sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} ORDER BY created_at DESC"))
                .fetch_all(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "{SELECT_ITEM} ORDER BY sale_id, position"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for item in items {
            by_sale.entry(item.sale_id.clone()).or_default().push(item);
        }
        for sale in &mut sales {
            sale.items = by_sale.remove(&sale.id).unwrap_or_default();
        }

        debug!(count = sales.len(), "Loaded sales");
        Ok(sales)
    }

    /// Gets a sale by ID, items included.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut sale) = sale else {
            return Ok(None);
        };
        sale.items = self.get_items(id).await?;
        Ok(Some(sale))
    }

    /// Gets the items of a sale in cart order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "{SELECT_ITEM} WHERE sale_id = ?1 ORDER BY position"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Inserts or updates a sale and replaces its items, inside an open
    /// transaction.
    pub(crate) async fn upsert(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(
            id = %sale.id,
            status = sale.status.as_str(),
            total = sale.total_cents,
            paid = sale.paid_cents,
            "Upserting sale"
        );

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, client_id, client_name, subtotal_cents, surcharge_cents, total_cents,
                paid_cents, status, kind, installments, payment_method,
                created_at, updated_at, settled_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ON CONFLICT (id) DO UPDATE SET
                client_name = excluded.client_name,
                subtotal_cents = excluded.subtotal_cents,
                surcharge_cents = excluded.surcharge_cents,
                total_cents = excluded.total_cents,
                paid_cents = excluded.paid_cents,
                status = excluded.status,
                kind = excluded.kind,
                installments = excluded.installments,
                payment_method = excluded.payment_method,
                updated_at = excluded.updated_at,
                settled_at = excluded.settled_at
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.client_id)
        .bind(&sale.client_name)
        .bind(sale.subtotal_cents)
        .bind(sale.surcharge_cents)
        .bind(sale.total_cents)
        .bind(sale.paid_cents)
        .bind(sale.status)
        .bind(sale.kind)
        .bind(sale.installments)
        .bind(sale.payment_method)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .bind(sale.settled_at)
        .execute(&mut *conn)
        .await?;

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(&sale.id)
            .execute(&mut *conn)
            .await?;

        for item in &sale.items {
            Self::insert_item(&mut *conn, item).await?;
        }

        Ok(())
    }

    async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id, position, name_snapshot, image_snapshot,
                size_snapshot, color_snapshot, quantity, unit_price_cents, unit_cost_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(item.position)
        .bind(&item.name_snapshot)
        .bind(&item.image_snapshot)
        .bind(&item.size_snapshot)
        .bind(&item.color_snapshot)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.unit_cost_cents)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
