//! # Persistence Backend
//!
//! The seam between the entity store and wherever the records live.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Backend::apply(change_set)                       │
//! │                                                                         │
//! │  Ok(())   every record in the change set is durable                    │
//! │  Err(_)   NOTHING from the change set is durable                       │
//! │                                                                         │
//! │  The store publishes a change set to its in-memory books only after    │
//! │  Ok(()), so memory never shows a state the backend rejected.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two implementations ship with this crate: [`Database`] (SQLite, one
//! transaction per change set) and [`crate::MemoryBackend`] (tests, demos,
//! failure injection).

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::cash::CashRepository;
use crate::repository::client::ClientRepository;
use crate::repository::expense::ExpenseRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use vitrine_core::{
    Books, CashSession, ChangeSet, Client, Deletion, Expense, Identity, Product, Role, Sale,
    StoreSettings,
};

// =============================================================================
// Snapshot
// =============================================================================

/// Everything the books are built from, as loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub expenses: Vec<Expense>,
    pub sessions: Vec<CashSession>,
}

impl Snapshot {
    pub fn into_books(self) -> Books {
        Books::from_records(
            self.clients,
            self.products,
            self.sales,
            self.expenses,
            self.sessions,
        )
    }
}

// =============================================================================
// Backend Trait
// =============================================================================

/// Persistence collaborator of the entity store.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn load_clients(&self) -> DbResult<Vec<Client>>;
    async fn load_products(&self) -> DbResult<Vec<Product>>;
    /// Sales with their items.
    async fn load_sales(&self) -> DbResult<Vec<Sale>>;
    async fn load_expenses(&self) -> DbResult<Vec<Expense>>;
    /// Cash sessions with their movements.
    async fn load_sessions(&self) -> DbResult<Vec<CashSession>>;

    async fn get_client(&self, id: &str) -> DbResult<Option<Client>>;
    async fn get_product(&self, id: &str) -> DbResult<Option<Product>>;
    async fn get_sale(&self, id: &str) -> DbResult<Option<Sale>>;

    /// Loads every collection.
    async fn load_all(&self) -> DbResult<Snapshot> {
        Ok(Snapshot {
            clients: self.load_clients().await?,
            products: self.load_products().await?,
            sales: self.load_sales().await?,
            expenses: self.load_expenses().await?,
            sessions: self.load_sessions().await?,
        })
    }

    /// Makes a change set durable, all or nothing.
    async fn apply(&self, changes: &ChangeSet) -> DbResult<()>;

    /// Verifies operator credentials.
    async fn login(&self, email: &str, password: &str) -> DbResult<Identity>;
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> DbResult<Identity>;
    async fn list_users(&self) -> DbResult<Vec<Identity>>;
    async fn set_role(&self, user_id: &str, role: Role) -> DbResult<()>;

    /// `None` until settings have been saved once.
    async fn load_settings(&self) -> DbResult<Option<StoreSettings>>;
    async fn save_settings(&self, settings: &StoreSettings) -> DbResult<()>;
}

// =============================================================================
// SQLite Implementation
// =============================================================================

#[async_trait]
impl Backend for Database {
    async fn load_clients(&self) -> DbResult<Vec<Client>> {
        self.clients().list().await
    }

    async fn load_products(&self) -> DbResult<Vec<Product>> {
        self.products().list().await
    }

    async fn load_sales(&self) -> DbResult<Vec<Sale>> {
        self.sales().list().await
    }

    async fn load_expenses(&self) -> DbResult<Vec<Expense>> {
        self.expenses().list().await
    }

    async fn load_sessions(&self) -> DbResult<Vec<CashSession>> {
        self.cash().list_sessions().await
    }

    async fn get_client(&self, id: &str) -> DbResult<Option<Client>> {
        self.clients().get_by_id(id).await
    }

    async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        self.products().get_by_id(id).await
    }

    async fn get_sale(&self, id: &str) -> DbResult<Option<Sale>> {
        self.sales().get_by_id(id).await
    }

    /// Writes the change set in one transaction.
    ///
    /// ## Write Order
    /// Parents before children so foreign keys hold at every statement:
    /// clients → products → sales (+ items) → expenses → sessions
    /// (+ movements) → deletions. Dropping `tx` on an early `?` rolls
    /// everything back.
    async fn apply(&self, changes: &ChangeSet) -> DbResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        debug!(changes = %changes.summary(), "Applying change set");

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for client in &changes.clients {
            ClientRepository::upsert(&mut *tx, client).await?;
        }
        for product in &changes.products {
            ProductRepository::upsert(&mut *tx, product).await?;
        }
        for sale in &changes.sales {
            SaleRepository::upsert(&mut *tx, sale).await?;
        }
        for expense in &changes.expenses {
            ExpenseRepository::upsert(&mut *tx, expense).await?;
        }
        for session in &changes.sessions {
            CashRepository::upsert_session(&mut *tx, session).await?;
        }
        for deletion in &changes.deletions {
            match deletion {
                Deletion::Client(id) => ClientRepository::delete(&mut *tx, id).await?,
                Deletion::Product(id) => ProductRepository::delete(&mut *tx, id).await?,
                Deletion::Expense(id) => ExpenseRepository::delete(&mut *tx, id).await?,
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> DbResult<Identity> {
        let identity = self.users().authenticate(email, password).await?;
        info!(user_id = %identity.user_id, role = identity.role.as_str(), "Operator logged in");
        Ok(identity)
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> DbResult<Identity> {
        self.users().create(name, email, password, role).await
    }

    async fn list_users(&self) -> DbResult<Vec<Identity>> {
        self.users().list().await
    }

    async fn set_role(&self, user_id: &str, role: Role) -> DbResult<()> {
        self.users().set_role(user_id, role).await
    }

    async fn load_settings(&self) -> DbResult<Option<StoreSettings>> {
        self.settings().load().await
    }

    async fn save_settings(&self, settings: &StoreSettings) -> DbResult<()> {
        self.settings().save(settings).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
