//! # Entity Store
//!
//! The action surface of Vitrine: every mutation of clients, products,
//! sales, expenses and the cash register goes through here.
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        EntityStore::create_sale()                       │
//! │                                                                         │
//! │  1. lock        tokio Mutex: one action at a time, start to finish     │
//! │  2. authorize   policy::authorize(role, action)                        │
//! │  3. plan        books.plan_create_sale(...) → ChangeSet (pure)         │
//! │  4. write       backend.apply(&change_set).await                       │
//! │                    └─ Err → RemoteWriteFailed, books untouched         │
//! │  5. reflect     books.apply(change_set)                                │
//! │  6. unlock                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads take the same lock briefly and hand out owned snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use vitrine_core::clock::business_date;
use vitrine_core::outreach::OutreachMessage;
use vitrine_core::policy::{self, Action};
use vitrine_core::report::{
    BestSeller, FinancialSummary, InventoryValuation, OpenBags, Period, Receivable,
};
use vitrine_core::validation::{validate_email, validate_settings, validate_text};
use vitrine_core::{
    Books, CashSession, ChangeSet, Client, Clock, CloseReport, CoreError, CoreResult, Expense,
    Identity, Money, MovementKind, NewClient, NewExpense, PaymentMethod, Product, ProductInput,
    RegisterState, Role, Sale, SaleReceipt, SaleRequest, StoreSettings,
};
use vitrine_db::{Backend, DbError};

use crate::error::{StoreError, StoreResult};

struct Inner {
    books: Books,
    settings: StoreSettings,
    identity: Option<Identity>,
}

impl Inner {
    fn authorize(&self, action: Action) -> StoreResult<Identity> {
        let identity = self.identity.clone().ok_or(StoreError::NotAuthenticated)?;
        if let Err(e) = policy::authorize(identity.role, action) {
            warn!(user_id = %identity.user_id, action = action.as_str(), "Permission denied");
            return Err(e.into());
        }
        Ok(identity)
    }
}

/// The single writer of the in-memory books.
///
/// Pass it around by reference (or `Arc`); there is no global instance.
pub struct EntityStore {
    inner: Mutex<Inner>,
    backend: Arc<dyn Backend>,
    clock: Arc<dyn Clock>,
}

impl EntityStore {
    /// Loads every collection and the saved settings from the backend.
    pub async fn open(backend: Arc<dyn Backend>, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let snapshot = backend.load_all().await?;
        let settings = backend.load_settings().await?.unwrap_or_default();

        info!(
            clients = snapshot.clients.len(),
            products = snapshot.products.len(),
            sales = snapshot.sales.len(),
            "Entity store loaded"
        );

        Ok(EntityStore {
            inner: Mutex::new(Inner {
                books: snapshot.into_books(),
                settings,
                identity: None,
            }),
            backend,
            clock,
        })
    }

    /// Replaces the books with a fresh load from the backend.
    pub async fn reload(&self) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        let snapshot = self.backend.load_all().await?;
        inner.books = snapshot.into_books();
        debug!("Entity store reloaded");
        Ok(())
    }

    // =========================================================================
    // The Commit Path
    // =========================================================================

    /// Runs one action: lock, authorize, plan, write, reflect.
    async fn commit<T, F>(&self, action: Action, plan: F) -> StoreResult<T>
    where
        F: FnOnce(&Books, &StoreSettings, &Identity, DateTime<Utc>) -> CoreResult<(ChangeSet, T)>,
    {
        let mut inner = self.inner.lock().await;
        let identity = inner.authorize(action)?;
        let now = self.clock.now();

        let (changes, output) = match plan(&inner.books, &inner.settings, &identity, now) {
            Ok(planned) => planned,
            Err(e) => {
                warn!(action = action.as_str(), error = %e, "Action refused");
                return Err(e.into());
            }
        };

        if changes.is_empty() {
            debug!(action = action.as_str(), "Nothing to write");
            return Ok(output);
        }

        for correction in &changes.debt_corrections {
            warn!(
                client_id = %correction.client_id,
                cached = correction.cached_cents,
                derived = correction.derived_cents,
                "Client debt drifted from sale history; keeping the derived value"
            );
        }

        if let Err(e) = self.backend.apply(&changes).await {
            error!(action = action.as_str(), error = %e, "Backend rejected change set");
            return Err(StoreError::RemoteWriteFailed(e));
        }

        info!(
            action = action.as_str(),
            user_id = %identity.user_id,
            changes = %changes.summary(),
            "Committed"
        );
        inner.books.apply(changes);
        Ok(output)
    }

    /// Runs a read that needs a permission.
    async fn read_gated<T>(
        &self,
        action: Action,
        read: impl FnOnce(&Books, &StoreSettings, DateTime<Utc>) -> T,
    ) -> StoreResult<T> {
        let inner = self.inner.lock().await;
        inner.authorize(action)?;
        Ok(read(&inner.books, &inner.settings, self.clock.now()))
    }

    async fn read<T>(&self, read: impl FnOnce(&Books) -> T) -> T {
        let inner = self.inner.lock().await;
        read(&inner.books)
    }

    // =========================================================================
    // Session & Users
    // =========================================================================

    /// Verifies credentials and makes that operator the acting identity.
    pub async fn login(&self, email: &str, password: &str) -> StoreResult<Identity> {
        let mut inner = self.inner.lock().await;
        let identity = match self.backend.login(email, password).await {
            Ok(identity) => identity,
            Err(DbError::InvalidCredentials) => {
                warn!(email = %email, "Login refused");
                return Err(CoreError::InvalidCredentials.into());
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %identity.user_id, role = identity.role.as_str(), "Logged in");
        inner.identity = Some(identity.clone());
        Ok(identity)
    }

    pub async fn logout(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(identity) = inner.identity.take() {
            info!(user_id = %identity.user_id, "Logged out");
        }
    }

    /// The acting operator, if logged in.
    pub async fn identity(&self) -> Option<Identity> {
        self.inner.lock().await.identity.clone()
    }

    /// Creates an operator login (admin only).
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> StoreResult<Identity> {
        let inner = self.inner.lock().await;
        inner.authorize(Action::ChangeRoles)?;
        validate_text("name", name, 120).map_err(CoreError::from)?;
        validate_email(email).map_err(CoreError::from)?;

        let created = self.backend.create_user(name, email, password, role).await?;
        info!(user_id = %created.user_id, role = role.as_str(), "User created");
        Ok(created)
    }

    pub async fn list_users(&self) -> StoreResult<Vec<Identity>> {
        let inner = self.inner.lock().await;
        inner.authorize(Action::ChangeRoles)?;
        Ok(self.backend.list_users().await?)
    }

    /// Changes an operator's role (admin only).
    ///
    /// When the acting operator changes their own role, it takes effect
    /// immediately.
    pub async fn change_role(&self, user_id: &str, role: Role) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        let acting = inner.authorize(Action::ChangeRoles)?;

        self.backend
            .set_role(user_id, role)
            .await
            .map_err(StoreError::RemoteWriteFailed)?;

        info!(user_id = %user_id, role = role.as_str(), by = %acting.user_id, "Role changed");
        if acting.user_id == user_id {
            if let Some(identity) = inner.identity.as_mut() {
                identity.role = role;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub async fn settings(&self) -> StoreSettings {
        self.inner.lock().await.settings.clone()
    }

    /// Validates, persists, then publishes new settings.
    pub async fn update_settings(&self, settings: StoreSettings) -> StoreResult<StoreSettings> {
        let mut inner = self.inner.lock().await;
        inner.authorize(Action::UpdateSettings)?;
        validate_settings(&settings).map_err(CoreError::from)?;

        self.backend
            .save_settings(&settings)
            .await
            .map_err(StoreError::RemoteWriteFailed)?;

        info!(store_name = %settings.store_name, "Settings updated");
        inner.settings = settings.clone();
        Ok(settings)
    }

    // =========================================================================
    // Clients
    // =========================================================================

    pub async fn add_client(&self, input: NewClient) -> StoreResult<Client> {
        self.commit(Action::ManageClients, |books, _, _, now| {
            books.plan_add_client(input, now)
        })
        .await
    }

    pub async fn update_client(&self, id: &str, input: NewClient) -> StoreResult<Client> {
        self.commit(Action::ManageClients, |books, _, _, now| {
            books.plan_update_client(id, input, now)
        })
        .await
    }

    /// Refused with `InUse` while any sale references the client.
    pub async fn delete_client(&self, id: &str) -> StoreResult<()> {
        self.commit(Action::DeleteClient, |books, _, _, _| {
            Ok((books.plan_delete_client(id)?, ()))
        })
        .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn add_product(&self, input: ProductInput) -> StoreResult<Product> {
        self.commit(Action::ManageProducts, |books, _, _, now| {
            books.plan_add_product(input, now)
        })
        .await
    }

    pub async fn update_product(&self, id: &str, input: ProductInput) -> StoreResult<Product> {
        self.commit(Action::ManageProducts, |books, _, _, now| {
            books.plan_update_product(id, input, now)
        })
        .await
    }

    /// Refused with `InUse` while any sale references the product.
    pub async fn delete_product(&self, id: &str) -> StoreResult<()> {
        self.commit(Action::DeleteProduct, |books, _, _, _| {
            Ok((books.plan_delete_product(id)?, ()))
        })
        .await
    }

    // =========================================================================
    // Expenses
    // =========================================================================

    pub async fn add_expense(&self, input: NewExpense) -> StoreResult<Expense> {
        self.commit(Action::ManageExpenses, |books, _, _, now| {
            books.plan_add_expense(input, now)
        })
        .await
    }

    pub async fn delete_expense(&self, id: &str) -> StoreResult<()> {
        self.commit(Action::DeleteExpense, |books, _, _, _| {
            Ok((books.plan_delete_expense(id)?, ()))
        })
        .await
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Posts a sale or a bag: stock, debt, sale record and cash movement
    /// are written as one change set.
    pub async fn create_sale(&self, request: SaleRequest) -> StoreResult<SaleReceipt> {
        self.commit(Action::RecordSale, |books, settings, _, now| {
            books.plan_create_sale(request, settings, now)
        })
        .await
    }

    /// Records money received against a sale. A zero amount changes nothing.
    pub async fn record_payment(
        &self,
        sale_id: &str,
        amount: Money,
        method: PaymentMethod,
    ) -> StoreResult<Sale> {
        self.commit(Action::RecordPayment, |books, settings, _, now| {
            let changes = books.plan_record_payment(sale_id, amount, method, settings, now)?;
            let sale = changes
                .sales
                .first()
                .or_else(|| books.sale(sale_id))
                .cloned()
                .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
            Ok((changes, sale))
        })
        .await
    }

    /// Settles a bag. `kept` maps product id to the quantity kept; anything
    /// missing is returned.
    pub async fn settle_bag(&self, sale_id: &str, kept: &HashMap<String, i64>) -> StoreResult<Sale> {
        self.commit(Action::SettleBag, |books, _, _, now| {
            let changes = books.plan_settle_bag(sale_id, kept, now)?;
            let sale = changes
                .sales
                .first()
                .cloned()
                .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;
            Ok((changes, sale))
        })
        .await
    }

    // =========================================================================
    // Cash Register
    // =========================================================================

    pub async fn open_cash_register(&self, float: Money) -> StoreResult<CashSession> {
        self.commit(Action::OperateRegister, |books, settings, identity, now| {
            let changes = books.plan_open_register(
                float,
                Some(identity.name.clone()),
                now,
                settings.utc_offset_minutes,
            )?;
            let session = changes
                .sessions
                .first()
                .cloned()
                .ok_or(CoreError::NoOpenSession)?;
            Ok((changes, session))
        })
        .await
    }

    /// Closes the open session (stale or not) and reports the variance.
    pub async fn close_cash_register(
        &self,
        counted: Money,
        notes: Option<String>,
    ) -> StoreResult<CloseReport> {
        self.commit(Action::OperateRegister, |books, _, _, now| {
            books.plan_close_register(counted, notes, now)
        })
        .await
    }

    /// A manual supply or bleed on the open session.
    pub async fn record_cash_movement(
        &self,
        kind: MovementKind,
        amount: Money,
        description: &str,
    ) -> StoreResult<CashSession> {
        self.commit(Action::RecordCashMovement, |books, _, _, now| {
            let changes = books.plan_cash_movement(kind, amount, description, now)?;
            let session = changes
                .sessions
                .first()
                .cloned()
                .ok_or(CoreError::RegisterClosed)?;
            Ok((changes, session))
        })
        .await
    }

    pub async fn register_state(&self) -> RegisterState {
        let inner = self.inner.lock().await;
        inner
            .books
            .register_state(self.clock.now(), inner.settings.utc_offset_minutes)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    pub async fn clients(&self) -> Vec<Client> {
        self.read(|books| books.clients()).await
    }

    pub async fn products(&self) -> Vec<Product> {
        self.read(|books| books.products()).await
    }

    pub async fn sales(&self) -> Vec<Sale> {
        self.read(|books| books.sales()).await
    }

    pub async fn expenses(&self) -> Vec<Expense> {
        self.read(|books| books.expenses()).await
    }

    pub async fn sessions(&self) -> Vec<CashSession> {
        self.read(|books| books.sessions()).await
    }

    /// The OPEN session, stale or not.
    pub async fn active_session(&self) -> Option<CashSession> {
        self.read(|books| books.open_session().cloned()).await
    }

    pub async fn client(&self, id: &str) -> Option<Client> {
        self.read(|books| books.client(id).cloned()).await
    }

    pub async fn product(&self, id: &str) -> Option<Product> {
        self.read(|books| books.product(id).cloned()).await
    }

    pub async fn sale(&self, id: &str) -> Option<Sale> {
        self.read(|books| books.sale(id).cloned()).await
    }

    // =========================================================================
    // Reports
    // =========================================================================

    pub async fn financial_summary(&self, period: Period) -> StoreResult<FinancialSummary> {
        self.read_gated(Action::ViewReports, |books, settings, _| {
            books.financial_summary(period, settings.utc_offset_minutes)
        })
        .await
    }

    pub async fn receivables(&self) -> StoreResult<Vec<Receivable>> {
        self.read_gated(Action::ViewReports, |books, _, _| books.receivables())
            .await
    }

    pub async fn open_bags(&self) -> StoreResult<OpenBags> {
        self.read_gated(Action::ViewReports, |books, _, _| books.open_bags())
            .await
    }

    pub async fn inventory_valuation(&self) -> StoreResult<InventoryValuation> {
        self.read_gated(Action::ViewReports, |books, _, _| books.inventory_valuation())
            .await
    }

    pub async fn best_sellers(&self, period: Period, limit: usize) -> StoreResult<Vec<BestSeller>> {
        self.read_gated(Action::ViewReports, |books, settings, _| {
            books.best_sellers(period, settings.utc_offset_minutes, limit)
        })
        .await
    }

    // =========================================================================
    // Outreach
    // =========================================================================

    pub async fn debt_reminders(&self) -> StoreResult<Vec<OutreachMessage>> {
        self.read_gated(Action::ManageClients, |books, settings, _| {
            books.debt_reminders(settings)
        })
        .await
    }

    /// Birthday greetings for the store's current calendar day.
    pub async fn birthday_messages(&self) -> StoreResult<Vec<OutreachMessage>> {
        self.read_gated(Action::ManageClients, |books, settings, now| {
            let today = business_date(now, settings.utc_offset_minutes);
            books.birthday_messages(today, settings)
        })
        .await
    }
}
