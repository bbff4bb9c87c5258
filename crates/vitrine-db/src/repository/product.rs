//! # Product Repository
//!
//! Database operations for the boutique catalog.
//!
//! ## Stock Columns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stock_quantity   every unit owned (shelf + away in bags)               │
//! │  on_bag_quantity  units away in open bags                               │
//! │                                                                         │
//! │  CHECK (0 <= on_bag_quantity <= stock_quantity) is enforced by the     │
//! │  schema, so a bad change set fails the whole transaction.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use vitrine_core::Product;

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, category, gender, size, color, image_url,
           cost_price_cents, sale_price_cents, stock_quantity, on_bag_quantity,
           created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let catalog = repo.list().await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Every product, ordered by name then size.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products =
            sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} ORDER BY name, size"))
                .fetch_all(&self.pool)
                .await?;
        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Counts products (used by the seed binary).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Inserts or updates a product inside an open transaction.
    pub(crate) async fn upsert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
        debug!(
            id = %product.id,
            stock = product.stock_quantity,
            on_bag = product.on_bag_quantity,
            "Upserting product"
        );

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, gender, size, color, image_url,
                cost_price_cents, sale_price_cents, stock_quantity, on_bag_quantity,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                gender = excluded.gender,
                size = excluded.size,
                color = excluded.color,
                image_url = excluded.image_url,
                cost_price_cents = excluded.cost_price_cents,
                sale_price_cents = excluded.sale_price_cents,
                stock_quantity = excluded.stock_quantity,
                on_bag_quantity = excluded.on_bag_quantity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.gender)
        .bind(&product.size)
        .bind(&product.color)
        .bind(&product.image_url)
        .bind(product.cost_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.stock_quantity)
        .bind(product.on_bag_quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub(crate) async fn delete(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
