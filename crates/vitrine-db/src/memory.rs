//! # In-Memory Backend
//!
//! A [`Backend`] that keeps everything in process memory. Used by tests and
//! demos, and to rehearse what the store does when persistence fails.
//!
//! ## Failure Injection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  backend.fail_next_writes(1)   next apply() → Err(Unavailable)         │
//! │  backend.set_offline(true)     every call   → Err(Unavailable)         │
//! │                                                                         │
//! │  A failed apply() changes nothing, the same as a rolled-back           │
//! │  SQLite transaction.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same row-level guards as the SQLite schema are checked before a
//! change set is accepted (stock counters, paid ≤ total, a single open
//! session, delete restrictions), so tests against this backend fail the
//! same way the real one would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::backend::{Backend, Snapshot};
use crate::error::{DbError, DbResult};
use vitrine_core::{
    CashSession, ChangeSet, Client, Deletion, Expense, Identity, Product, Role, Sale,
    SessionStatus, StoreSettings,
};

#[derive(Debug, Default)]
struct Tables {
    clients: HashMap<String, Client>,
    products: HashMap<String, Product>,
    sales: HashMap<String, Sale>,
    expenses: HashMap<String, Expense>,
    sessions: HashMap<String, CashSession>,
    users: Vec<(Identity, String)>,
    settings: Option<StoreSettings>,
}

/// Process-memory persistence with switchable failures.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
    failing_writes: AtomicUsize,
    offline: AtomicBool,
    applied: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend pre-filled with records.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let tables = Tables {
            clients: snapshot.clients.into_iter().map(|c| (c.id.clone(), c)).collect(),
            products: snapshot.products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            sales: snapshot.sales.into_iter().map(|s| (s.id.clone(), s)).collect(),
            expenses: snapshot.expenses.into_iter().map(|e| (e.id.clone(), e)).collect(),
            sessions: snapshot.sessions.into_iter().map(|s| (s.id.clone(), s)).collect(),
            ..Tables::default()
        };
        MemoryBackend {
            tables: RwLock::new(tables),
            ..Self::default()
        }
    }

    /// Makes the next `count` calls to `apply` fail.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// While offline, every call fails (reads included).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of change sets accepted so far.
    pub fn applied_count(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }

    /// Current contents, for assertions.
    pub async fn snapshot(&self) -> Snapshot {
        let tables = self.tables.read().await;
        Snapshot {
            clients: tables.clients.values().cloned().collect(),
            products: tables.products.values().cloned().collect(),
            sales: tables.sales.values().cloned().collect(),
            expenses: tables.expenses.values().cloned().collect(),
            sessions: tables.sessions.values().cloned().collect(),
        }
    }

    fn check_online(&self) -> DbResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("backend offline".to_string()));
        }
        Ok(())
    }

    fn take_injected_failure(&self) -> DbResult<()> {
        let remaining = self.failing_writes.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_writes.store(remaining - 1, Ordering::SeqCst);
            warn!(remaining = remaining - 1, "Injected write failure");
            return Err(DbError::Unavailable("injected write failure".to_string()));
        }
        Ok(())
    }
}

/// Rejects a change set that would break a guard the SQLite schema enforces.
fn check_constraints(tables: &Tables, changes: &ChangeSet) -> DbResult<()> {
    for product in &changes.products {
        if product.on_bag_quantity < 0 || product.on_bag_quantity > product.stock_quantity {
            return Err(DbError::ConstraintViolation(format!(
                "products.on_bag_quantity for {}",
                product.id
            )));
        }
    }
    for client in &changes.clients {
        if client.current_debt_cents < 0 {
            return Err(DbError::ConstraintViolation(format!(
                "clients.current_debt_cents for {}",
                client.id
            )));
        }
    }
    for sale in &changes.sales {
        if sale.paid_cents < 0 || sale.paid_cents > sale.total_cents {
            return Err(DbError::ConstraintViolation(format!("sales.paid_cents for {}", sale.id)));
        }
        let client_known = tables.clients.contains_key(&sale.client_id)
            || changes.clients.iter().any(|c| c.id == sale.client_id);
        if !client_known {
            return Err(DbError::ForeignKeyViolation {
                message: format!("sale {} references unknown client {}", sale.id, sale.client_id),
            });
        }
    }

    let mut open: Vec<&str> = tables
        .sessions
        .values()
        .filter(|s| s.status == SessionStatus::Open)
        .filter(|s| !changes.sessions.iter().any(|c| c.id == s.id))
        .map(|s| s.id.as_str())
        .collect();
    open.extend(
        changes
            .sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Open)
            .map(|s| s.id.as_str()),
    );
    if open.len() > 1 {
        return Err(DbError::UniqueViolation {
            field: "cash_sessions.status".to_string(),
            value: "OPEN".to_string(),
        });
    }

    for deletion in &changes.deletions {
        let referenced = match deletion {
            Deletion::Client(id) => tables.sales.values().any(|s| &s.client_id == id),
            Deletion::Product(id) => tables
                .sales
                .values()
                .any(|s| s.items.iter().any(|i| &i.product_id == id)),
            Deletion::Expense(_) => false,
        };
        if referenced {
            return Err(DbError::ForeignKeyViolation {
                message: format!("{deletion:?} is still referenced by a sale"),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn load_clients(&self) -> DbResult<Vec<Client>> {
        self.check_online()?;
        Ok(self.tables.read().await.clients.values().cloned().collect())
    }

    async fn load_products(&self) -> DbResult<Vec<Product>> {
        self.check_online()?;
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn load_sales(&self) -> DbResult<Vec<Sale>> {
        self.check_online()?;
        Ok(self.tables.read().await.sales.values().cloned().collect())
    }

    async fn load_expenses(&self) -> DbResult<Vec<Expense>> {
        self.check_online()?;
        Ok(self.tables.read().await.expenses.values().cloned().collect())
    }

    async fn load_sessions(&self) -> DbResult<Vec<CashSession>> {
        self.check_online()?;
        Ok(self.tables.read().await.sessions.values().cloned().collect())
    }

    async fn get_client(&self, id: &str) -> DbResult<Option<Client>> {
        self.check_online()?;
        Ok(self.tables.read().await.clients.get(id).cloned())
    }

    async fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        self.check_online()?;
        Ok(self.tables.read().await.products.get(id).cloned())
    }

    async fn get_sale(&self, id: &str) -> DbResult<Option<Sale>> {
        self.check_online()?;
        Ok(self.tables.read().await.sales.get(id).cloned())
    }

    async fn apply(&self, changes: &ChangeSet) -> DbResult<()> {
        self.check_online()?;
        self.take_injected_failure()?;

        let mut tables = self.tables.write().await;
        check_constraints(&tables, changes)?;

        for client in &changes.clients {
            tables.clients.insert(client.id.clone(), client.clone());
        }
        for product in &changes.products {
            tables.products.insert(product.id.clone(), product.clone());
        }
        for sale in &changes.sales {
            tables.sales.insert(sale.id.clone(), sale.clone());
        }
        for expense in &changes.expenses {
            tables.expenses.insert(expense.id.clone(), expense.clone());
        }
        for session in &changes.sessions {
            tables.sessions.insert(session.id.clone(), session.clone());
        }
        for deletion in &changes.deletions {
            match deletion {
                Deletion::Client(id) => {
                    tables.clients.remove(id);
                }
                Deletion::Product(id) => {
                    tables.products.remove(id);
                }
                Deletion::Expense(id) => {
                    tables.expenses.remove(id);
                }
            }
        }

        self.applied.fetch_add(1, Ordering::SeqCst);
        debug!(changes = %changes.summary(), "Memory backend applied change set");
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> DbResult<Identity> {
        self.check_online()?;
        let email = email.trim().to_lowercase();
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|(identity, hash)| identity.email == email && verify_password(password, hash))
            .map(|(identity, _)| identity.clone())
            .ok_or(DbError::InvalidCredentials)
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> DbResult<Identity> {
        self.check_online()?;
        let email = email.trim().to_lowercase();
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|(identity, _)| identity.email == email) {
            return Err(DbError::duplicate("users.email", email));
        }

        let identity = Identity {
            user_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email,
            role,
        };
        tables.users.push((identity.clone(), hash_password(password)?));
        Ok(identity)
    }

    async fn list_users(&self) -> DbResult<Vec<Identity>> {
        self.check_online()?;
        let mut users: Vec<Identity> = self
            .tables
            .read()
            .await
            .users
            .iter()
            .map(|(identity, _)| identity.clone())
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn set_role(&self, user_id: &str, role: Role) -> DbResult<()> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let (identity, _) = tables
            .users
            .iter_mut()
            .find(|(identity, _)| identity.user_id == user_id)
            .ok_or_else(|| DbError::not_found("User", user_id))?;
        identity.role = role;
        Ok(())
    }

    async fn load_settings(&self) -> DbResult<Option<StoreSettings>> {
        self.check_online()?;
        Ok(self.tables.read().await.settings.clone())
    }

    async fn save_settings(&self, settings: &StoreSettings) -> DbResult<()> {
        self.check_online()?;
        self.take_injected_failure()?;
        self.tables.write().await.settings = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(stock: i64, on_bag: i64) -> Product {
        Product {
            id: "prod-1".to_string(),
            name: "Blusa Linho".to_string(),
            category: "Blusas".to_string(),
            gender: "Feminino".to_string(),
            size: "P".to_string(),
            color: "Branco".to_string(),
            image_url: None,
            cost_price_cents: 3000,
            sale_price_cents: 7990,
            stock_quantity: stock,
            on_bag_quantity: on_bag,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_injected_failure_changes_nothing() {
        let backend = MemoryBackend::new();
        backend.fail_next_writes(1);

        let mut cs = ChangeSet::new();
        cs.put_product(product(3, 0));

        let err = backend.apply(&cs).await.unwrap_err();
        assert!(matches!(err, DbError::Unavailable(_)));
        assert!(backend.load_products().await.unwrap().is_empty());

        backend.apply(&cs).await.unwrap();
        assert_eq!(backend.load_products().await.unwrap().len(), 1);
        assert_eq!(backend.applied_count(), 1);
    }

    #[tokio::test]
    async fn test_offline_fails_reads() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        assert!(backend.load_all().await.is_err());
        backend.set_offline(false);
        assert!(backend.load_all().await.is_ok());
    }

    #[tokio::test]
    async fn test_stock_guard_matches_schema() {
        let backend = MemoryBackend::new();
        let mut cs = ChangeSet::new();
        cs.put_product(product(1, 2));

        let err = backend.apply(&cs).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation(_)));
        assert_eq!(backend.applied_count(), 0);
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let backend = MemoryBackend::new();
        backend
            .create_user("Carla Dona", "carla@loja.com", "segredo", Role::Admin)
            .await
            .unwrap();

        let identity = backend.login(" Carla@Loja.com ", "segredo").await.unwrap();
        assert_eq!(identity.role, Role::Admin);
        assert!(matches!(
            backend.login("carla@loja.com", "nope").await,
            Err(DbError::InvalidCredentials)
        ));
    }
}
