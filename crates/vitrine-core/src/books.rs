//! # Books
//!
//! The in-memory collections the store publishes, and the planners that
//! turn an action into a [`ChangeSet`].
//!
//! ## Plan → Write → Reflect
//! ```text
//! ┌───────────────┐  plan_*(&self)   ┌───────────┐  Backend::apply  ┌────────┐
//! │ Books (live)  │ ───────────────► │ ChangeSet │ ───────────────► │   DB   │
//! └───────▲───────┘                  └─────┬─────┘                  └───┬────┘
//!         │            Books::apply(cs)    │          ok                │
//!         └────────────────────────────────┴────────────────────────────┘
//! ```
//! Planners take `&self`, so a refused action cannot leave anything
//! behind. Only [`Books::apply`] mutates.
//!
//! Sale and register planners live next to their rules in
//! [`crate::sale`] and [`crate::cash`].

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::changeset::{ChangeSet, DebtCorrection, Deletion};
use crate::debt;
use crate::error::{CoreError, CoreResult};
use crate::types::{
    CashSession, Client, Expense, NewClient, NewExpense, Product, ProductInput, Sale,
    SessionStatus,
};
use crate::validation::{
    validate_new_client, validate_new_expense, validate_phone, validate_product_input,
};

#[derive(Debug, Clone, Default)]
pub struct Books {
    clients: HashMap<String, Client>,
    products: HashMap<String, Product>,
    sales: HashMap<String, Sale>,
    expenses: HashMap<String, Expense>,
    sessions: HashMap<String, CashSession>,
}

impl Books {
    pub fn new() -> Self {
        Books::default()
    }

    /// Builds the collections from a full backend load.
    pub fn from_records(
        clients: Vec<Client>,
        products: Vec<Product>,
        sales: Vec<Sale>,
        expenses: Vec<Expense>,
        sessions: Vec<CashSession>,
    ) -> Self {
        Books {
            clients: clients.into_iter().map(|c| (c.id.clone(), c)).collect(),
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            sales: sales.into_iter().map(|s| (s.id.clone(), s)).collect(),
            expenses: expenses.into_iter().map(|e| (e.id.clone(), e)).collect(),
            sessions: sessions.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn sale(&self, id: &str) -> Option<&Sale> {
        self.sales.get(id)
    }

    pub fn expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.get(id)
    }

    pub fn session(&self, id: &str) -> Option<&CashSession> {
        self.sessions.get(id)
    }

    /// The OPEN session, if any. At most one exists.
    pub fn open_session(&self) -> Option<&CashSession> {
        self.sessions.values().find(|s| s.status == SessionStatus::Open)
    }

    pub(crate) fn require_client(&self, id: &str) -> CoreResult<&Client> {
        self.clients
            .get(id)
            .ok_or_else(|| CoreError::ClientNotFound(id.to_string()))
    }

    pub(crate) fn require_product(&self, id: &str) -> CoreResult<&Product> {
        self.products
            .get(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    pub(crate) fn require_sale(&self, id: &str) -> CoreResult<&Sale> {
        self.sales
            .get(id)
            .ok_or_else(|| CoreError::SaleNotFound(id.to_string()))
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Clients sorted by name.
    pub fn clients(&self) -> Vec<Client> {
        let mut out: Vec<Client> = self.clients.values().cloned().collect();
        out.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        out
    }

    /// Products sorted by name, then size.
    pub fn products(&self) -> Vec<Product> {
        let mut out: Vec<Product> = self.products.values().cloned().collect();
        out.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.size.cmp(&b.size))
        });
        out
    }

    /// Sales, newest first.
    pub fn sales(&self) -> Vec<Sale> {
        let mut out: Vec<Sale> = self.sales.values().cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        out
    }

    /// Expenses, most recent date first.
    pub fn expenses(&self) -> Vec<Expense> {
        let mut out: Vec<Expense> = self.expenses.values().cloned().collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        out
    }

    /// Sessions, most recently opened first.
    pub fn sessions(&self) -> Vec<CashSession> {
        let mut out: Vec<CashSession> = self.sessions.values().cloned().collect();
        out.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        out
    }

    pub(crate) fn sale_values(&self) -> impl Iterator<Item = &Sale> {
        self.sales.values()
    }

    pub(crate) fn product_values(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub(crate) fn client_values(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    pub(crate) fn expense_values(&self) -> impl Iterator<Item = &Expense> {
        self.expenses.values()
    }

    // =========================================================================
    // Reflect
    // =========================================================================

    /// Publishes a change set that the backend has already accepted.
    pub fn apply(&mut self, cs: ChangeSet) {
        for client in cs.clients {
            self.clients.insert(client.id.clone(), client);
        }
        for product in cs.products {
            self.products.insert(product.id.clone(), product);
        }
        for sale in cs.sales {
            self.sales.insert(sale.id.clone(), sale);
        }
        for expense in cs.expenses {
            self.expenses.insert(expense.id.clone(), expense);
        }
        for session in cs.sessions {
            self.sessions.insert(session.id.clone(), session);
        }
        for deletion in cs.deletions {
            match deletion {
                Deletion::Client(id) => {
                    self.clients.remove(&id);
                }
                Deletion::Product(id) => {
                    self.products.remove(&id);
                }
                Deletion::Expense(id) => {
                    self.expenses.remove(&id);
                }
            }
        }
    }

    // =========================================================================
    // Debt Reconciliation
    // =========================================================================

    /// Rewrites the client's cached debt from the sale history, as it will
    /// look once `cs` is applied, and stages the client.
    pub(crate) fn stage_client_debt(&self, cs: &mut ChangeSet, mut client: Client) -> Client {
        let derived = {
            let staged: HashSet<&str> = cs.sales.iter().map(|s| s.id.as_str()).collect();
            let history = self
                .sales
                .values()
                .filter(|s| !staged.contains(s.id.as_str()))
                .chain(cs.sales.iter());
            debt::outstanding_for(&client.id, history)
        };

        if derived.cents() != client.current_debt_cents {
            cs.debt_corrections.push(DebtCorrection {
                client_id: client.id.clone(),
                cached_cents: client.current_debt_cents,
                derived_cents: derived.cents(),
            });
            client.current_debt_cents = derived.cents();
        }

        cs.put_client(client.clone());
        client
    }

    /// Number of sales that reference a client or product.
    fn references(&self, matches: impl Fn(&Sale) -> bool) -> usize {
        self.sales.values().filter(|s| matches(s)).count()
    }

    // =========================================================================
    // Clients
    // =========================================================================

    pub fn plan_add_client(
        &self,
        input: NewClient,
        now: DateTime<Utc>,
    ) -> CoreResult<(ChangeSet, Client)> {
        validate_new_client(&input)?;
        let phone = validate_phone(&input.phone)?;

        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            phone,
            trust_score: input.trust_score,
            credit_limit_cents: input.credit_limit_cents,
            current_debt_cents: 0,
            avatar_url: input.avatar_url,
            birth_date: input.birth_date,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        let mut cs = ChangeSet::new();
        cs.put_client(client.clone());
        Ok((cs, client))
    }

    /// Edits a client's profile. The debt is never taken from the input.
    pub fn plan_update_client(
        &self,
        id: &str,
        input: NewClient,
        now: DateTime<Utc>,
    ) -> CoreResult<(ChangeSet, Client)> {
        validate_new_client(&input)?;
        let phone = validate_phone(&input.phone)?;

        let mut client = self.require_client(id)?.clone();
        client.name = input.name.trim().to_string();
        client.phone = phone;
        client.trust_score = input.trust_score;
        client.credit_limit_cents = input.credit_limit_cents;
        client.avatar_url = input.avatar_url;
        client.birth_date = input.birth_date;
        client.notes = input.notes;
        client.updated_at = now;

        let mut cs = ChangeSet::new();
        // denormalized names in history stay as they were at sale time
        let client = self.stage_client_debt(&mut cs, client);
        Ok((cs, client))
    }

    pub fn plan_delete_client(&self, id: &str) -> CoreResult<ChangeSet> {
        self.require_client(id)?;

        let references = self.references(|s| s.client_id == id);
        if references > 0 {
            return Err(CoreError::InUse {
                entity: "Client".to_string(),
                id: id.to_string(),
                references,
            });
        }

        let mut cs = ChangeSet::new();
        cs.delete(Deletion::Client(id.to_string()));
        Ok(cs)
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub fn plan_add_product(
        &self,
        input: ProductInput,
        now: DateTime<Utc>,
    ) -> CoreResult<(ChangeSet, Product)> {
        validate_product_input(&input)?;

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            gender: input.gender.trim().to_string(),
            size: input.size.trim().to_string(),
            color: input.color.trim().to_string(),
            image_url: input.image_url,
            cost_price_cents: input.cost_price_cents,
            sale_price_cents: input.sale_price_cents,
            stock_quantity: input.stock_quantity,
            on_bag_quantity: 0,
            created_at: now,
            updated_at: now,
        };

        let mut cs = ChangeSet::new();
        cs.put_product(product.clone());
        Ok((cs, product))
    }

    /// Edits a product. Stock may not drop below the pieces out on bags.
    pub fn plan_update_product(
        &self,
        id: &str,
        input: ProductInput,
        now: DateTime<Utc>,
    ) -> CoreResult<(ChangeSet, Product)> {
        validate_product_input(&input)?;

        let mut product = self.require_product(id)?.clone();
        if input.stock_quantity < product.on_bag_quantity {
            return Err(CoreError::insufficient_stock(
                &product.name,
                input.stock_quantity,
                product.on_bag_quantity,
            ));
        }

        product.name = input.name.trim().to_string();
        product.category = input.category.trim().to_string();
        product.gender = input.gender.trim().to_string();
        product.size = input.size.trim().to_string();
        product.color = input.color.trim().to_string();
        product.image_url = input.image_url;
        product.cost_price_cents = input.cost_price_cents;
        product.sale_price_cents = input.sale_price_cents;
        product.stock_quantity = input.stock_quantity;
        product.updated_at = now;

        let mut cs = ChangeSet::new();
        cs.put_product(product.clone());
        Ok((cs, product))
    }

    pub fn plan_delete_product(&self, id: &str) -> CoreResult<ChangeSet> {
        self.require_product(id)?;

        let references = self.references(|s| s.items.iter().any(|i| i.product_id == id));
        if references > 0 {
            return Err(CoreError::InUse {
                entity: "Product".to_string(),
                id: id.to_string(),
                references,
            });
        }

        let mut cs = ChangeSet::new();
        cs.delete(Deletion::Product(id.to_string()));
        Ok(cs)
    }

    // =========================================================================
    // Expenses
    // =========================================================================

    pub fn plan_add_expense(
        &self,
        input: NewExpense,
        now: DateTime<Utc>,
    ) -> CoreResult<(ChangeSet, Expense)> {
        validate_new_expense(&input)?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            description: input.description.trim().to_string(),
            amount_cents: input.amount_cents,
            category: input.category,
            date: input.date,
            paid: input.paid,
            created_at: now,
        };

        let mut cs = ChangeSet::new();
        cs.put_expense(expense.clone());
        Ok((cs, expense))
    }

    pub fn plan_delete_expense(&self, id: &str) -> CoreResult<ChangeSet> {
        if !self.expenses.contains_key(id) {
            return Err(CoreError::ExpenseNotFound(id.to_string()));
        }
        let mut cs = ChangeSet::new();
        cs.delete(Deletion::Expense(id.to_string()));
        Ok(cs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debt::tests::{client, sale};
    use crate::inventory::tests::product;
    use crate::types::{ExpenseCategory, SaleItem, SaleKind};
    use chrono::NaiveDate;

    fn item_for(product_id: &str, sale_id: &str) -> SaleItem {
        SaleItem {
            id: "item-1".to_string(),
            sale_id: sale_id.to_string(),
            product_id: product_id.to_string(),
            position: 0,
            name_snapshot: "Vestido Midi".to_string(),
            image_snapshot: None,
            size_snapshot: "M".to_string(),
            color_snapshot: "Verde".to_string(),
            quantity: 1,
            unit_price_cents: 5000,
            unit_cost_cents: 4000,
        }
    }

    #[test]
    fn test_add_client_starts_without_debt() {
        let books = Books::new();
        let (cs, created) = books
            .plan_add_client(
                NewClient {
                    name: "  Beatriz Lima ".to_string(),
                    phone: "(21) 99876-5432".to_string(),
                    trust_score: 3,
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(cs.clients.len(), 1);
        assert_eq!(cs.clients[0].name, "Beatriz Lima");
        assert_eq!(cs.clients[0].phone, "21998765432");
        assert_eq!(cs.clients[0].current_debt_cents, 0);
        assert_eq!(created, cs.clients[0]);
    }

    #[test]
    fn test_delete_client_restricted_by_history() {
        let books = Books::from_records(
            vec![client(0)],
            vec![],
            vec![sale(5000, 5000, SaleKind::Sale)],
            vec![],
            vec![],
        );
        let err = books.plan_delete_client("cli-1").unwrap_err();
        assert!(matches!(err, CoreError::InUse { references: 1, .. }));
    }

    #[test]
    fn test_delete_product_restricted_by_history() {
        let mut s = sale(5000, 5000, SaleKind::Sale);
        s.items.push(item_for("prod-1", &s.id));
        let books = Books::from_records(vec![], vec![product(5, 0)], vec![s], vec![], vec![]);
        assert!(matches!(
            books.plan_delete_product("prod-1"),
            Err(CoreError::InUse { .. })
        ));

        let free = Books::from_records(vec![], vec![product(5, 0)], vec![], vec![], vec![]);
        let cs = free.plan_delete_product("prod-1").unwrap();
        assert_eq!(cs.deletions, vec![Deletion::Product("prod-1".to_string())]);
    }

    #[test]
    fn test_update_product_keeps_bag_counter() {
        let books = Books::from_records(vec![], vec![product(10, 3)], vec![], vec![], vec![]);
        let input = ProductInput {
            name: "Vestido Midi".to_string(),
            category: "Vestidos".to_string(),
            size: "M".to_string(),
            stock_quantity: 12,
            sale_price_cents: 5500,
            ..Default::default()
        };
        let (cs, _) = books.plan_update_product("prod-1", input.clone(), Utc::now()).unwrap();
        assert_eq!(cs.products[0].on_bag_quantity, 3);
        assert_eq!(cs.products[0].stock_quantity, 12);

        // stock below what is out on bags is refused
        let too_low = ProductInput {
            stock_quantity: 2,
            ..input
        };
        assert!(books.plan_update_product("prod-1", too_low, Utc::now()).is_err());
    }

    #[test]
    fn test_update_client_repairs_drifted_debt() {
        // cache says 999, history says 3000
        let books = Books::from_records(
            vec![client(999)],
            vec![],
            vec![sale(5000, 2000, SaleKind::Sale)],
            vec![],
            vec![],
        );
        let input = NewClient {
            name: "Ana Souza".to_string(),
            phone: "11987654321".to_string(),
            trust_score: 5,
            ..Default::default()
        };
        let (cs, updated) = books.plan_update_client("cli-1", input, Utc::now()).unwrap();
        assert_eq!(cs.clients[0].current_debt_cents, 3000);
        assert_eq!(cs.debt_corrections.len(), 1);
        assert_eq!(cs.debt_corrections[0].cached_cents, 999);
        assert_eq!(updated.current_debt_cents, 3000);
    }

    #[test]
    fn test_expense_lifecycle() {
        let mut books = Books::new();
        let (cs, _) = books
            .plan_add_expense(
                NewExpense {
                    description: "Aluguel".to_string(),
                    amount_cents: 250000,
                    category: ExpenseCategory::Fixed,
                    date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
                    paid: true,
                },
                Utc::now(),
            )
            .unwrap();
        let id = cs.expenses[0].id.clone();
        books.apply(cs);
        assert_eq!(books.expenses().len(), 1);

        let cs = books.plan_delete_expense(&id).unwrap();
        books.apply(cs);
        assert!(books.expenses().is_empty());
        assert!(matches!(
            books.plan_delete_expense(&id),
            Err(CoreError::ExpenseNotFound(_))
        ));
    }
}
