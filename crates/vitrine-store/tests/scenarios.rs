//! End-to-end behaviour of the store against the in-memory backend.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use vitrine_core::cash::current_balance;
use vitrine_core::debt::outstanding_for;
use vitrine_core::report::Period;
use vitrine_core::{
    Client, CoreError, ExpenseCategory, FixedClock, Money, MovementKind, NewClient, NewExpense,
    PaymentMethod, Product, ProductInput, RegisterState, Role, SaleKind, SaleLine, SaleRequest,
    SaleStatus, StoreSettings,
};
use vitrine_db::{Backend, MemoryBackend};

use vitrine_store::{EntityStore, StoreError};

const ADMIN_EMAIL: &str = "dona@vitrine.local";
const SELLER_EMAIL: &str = "bia@vitrine.local";
const PASSWORD: &str = "senha-da-loja";

struct Harness {
    store: EntityStore,
    backend: Arc<MemoryBackend>,
    clock: Arc<FixedClock>,
}

/// A store on 2025-03-10 at noon in São Paulo, logged in as the owner.
async fn harness() -> Harness {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .create_user("Dona Marta", ADMIN_EMAIL, PASSWORD, Role::Admin)
        .await
        .unwrap();
    backend
        .create_user("Bia", SELLER_EMAIL, PASSWORD, Role::Seller)
        .await
        .unwrap();

    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap(),
    ));
    let store = EntityStore::open(backend.clone(), clock.clone()).await.unwrap();
    store.login(ADMIN_EMAIL, PASSWORD).await.unwrap();

    Harness {
        store,
        backend,
        clock,
    }
}

async fn add_client(store: &EntityStore, name: &str) -> Client {
    store
        .add_client(NewClient {
            name: name.to_string(),
            phone: "(11) 98765-4321".to_string(),
            trust_score: 4,
            credit_limit_cents: 100_000,
            ..NewClient::default()
        })
        .await
        .unwrap()
}

async fn add_product(store: &EntityStore, name: &str, price_cents: i64, stock: i64) -> Product {
    store
        .add_product(ProductInput {
            name: name.to_string(),
            category: "Vestidos".to_string(),
            gender: "Feminino".to_string(),
            size: "M".to_string(),
            color: "Preto".to_string(),
            image_url: None,
            cost_price_cents: price_cents / 2,
            sale_price_cents: price_cents,
            stock_quantity: stock,
        })
        .await
        .unwrap()
}

fn sale(client: &Client, product: &Product, qty: i64, method: PaymentMethod) -> SaleRequest {
    SaleRequest {
        client_id: client.id.clone(),
        lines: vec![SaleLine {
            product_id: product.id.clone(),
            quantity: qty,
        }],
        kind: SaleKind::Sale,
        method: Some(method),
        tendered_cents: None,
        installments: 1,
    }
}

fn bag(client: &Client, product: &Product, qty: i64) -> SaleRequest {
    SaleRequest {
        kind: SaleKind::Bag,
        method: None,
        ..sale(client, product, qty, PaymentMethod::Cash)
    }
}

/// The rules that must hold after every action, successful or not.
async fn assert_books_consistent(store: &EntityStore) {
    let sales = store.sales().await;

    for product in store.products().await {
        assert!(product.on_bag_quantity >= 0, "{} on_bag < 0", product.name);
        assert!(
            product.on_bag_quantity <= product.stock_quantity,
            "{} on_bag > stock",
            product.name
        );
    }

    for client in store.clients().await {
        assert_eq!(
            client.current_debt(),
            outstanding_for(&client.id, &sales),
            "debt of {} drifted from sale history",
            client.name
        );
    }

    for sale in &sales {
        assert!(sale.paid_cents <= sale.total_cents);
        assert_eq!(
            sale.status == SaleStatus::Paid,
            sale.paid_cents >= sale.total_cents
        );
    }
}

fn core_error(err: StoreError) -> CoreError {
    match err {
        StoreError::Core(e) => e,
        other => panic!("expected a rule refusal, got {other:?}"),
    }
}

// =============================================================================
// Stock
// =============================================================================

#[tokio::test]
async fn test_cart_admission_respects_pieces_away_on_bags() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let dress = add_product(&h.store, "Vestido Midi", 15000, 10).await;
    h.store.open_cash_register(Money::from_cents(10000)).await.unwrap();

    h.store.create_sale(bag(&ana, &dress, 2)).await.unwrap();
    let dress_now = h.store.product(&dress.id).await.unwrap();
    assert_eq!((dress_now.stock_quantity, dress_now.on_bag_quantity), (10, 2));

    let err = h
        .store
        .create_sale(sale(&ana, &dress, 9, PaymentMethod::Pix))
        .await
        .unwrap_err();
    assert!(matches!(
        core_error(err),
        CoreError::InsufficientStock {
            available: 8,
            requested: 9,
            ..
        }
    ));

    h.store
        .create_sale(sale(&ana, &dress, 8, PaymentMethod::Pix))
        .await
        .unwrap();
    let dress_now = h.store.product(&dress.id).await.unwrap();
    assert_eq!((dress_now.stock_quantity, dress_now.on_bag_quantity), (2, 2));

    assert_books_consistent(&h.store).await;
}

// =============================================================================
// Cash Register
// =============================================================================

#[tokio::test]
async fn test_only_cash_tender_moves_the_drawer() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let blouse = add_product(&h.store, "Blusa Seda", 5000, 5).await;
    let pants = add_product(&h.store, "Calça Linho", 3000, 5).await;

    let session = h.store.open_cash_register(Money::from_cents(10000)).await.unwrap();
    assert_eq!(session.opened_by.as_deref(), Some("Dona Marta"));

    h.store
        .create_sale(sale(&ana, &blouse, 1, PaymentMethod::Cash))
        .await
        .unwrap();
    let open = h.store.active_session().await.unwrap();
    assert_eq!(current_balance(&open).cents(), 15000);

    h.store
        .create_sale(sale(&ana, &pants, 1, PaymentMethod::Credit))
        .await
        .unwrap();
    let open = h.store.active_session().await.unwrap();
    assert_eq!(current_balance(&open).cents(), 15000);
    // the card sale is still on the ledger
    assert_eq!(open.movements.len(), 3);

    assert_books_consistent(&h.store).await;
}

#[tokio::test]
async fn test_cash_sale_returns_change() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let blouse = add_product(&h.store, "Blusa Seda", 5000, 5).await;
    h.store.open_cash_register(Money::from_cents(0)).await.unwrap();

    let mut request = sale(&ana, &blouse, 1, PaymentMethod::Cash);
    request.tendered_cents = Some(10000);
    let receipt = h.store.create_sale(request).await.unwrap();
    assert_eq!(receipt.change.cents(), 5000);

    // only what the sale cost stays in the drawer
    let open = h.store.active_session().await.unwrap();
    assert_eq!(current_balance(&open).cents(), 5000);

    let mut short = sale(&ana, &blouse, 1, PaymentMethod::Cash);
    short.tendered_cents = Some(4000);
    let err = h.store.create_sale(short).await.unwrap_err();
    assert!(matches!(core_error(err), CoreError::InsufficientTender { .. }));
}

#[tokio::test]
async fn test_close_reconciles_with_no_variance_when_count_matches() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let dress = add_product(&h.store, "Vestido Midi", 20000, 5).await;
    let blouse = add_product(&h.store, "Blusa Seda", 5000, 5).await;

    h.store.open_cash_register(Money::from_cents(10000)).await.unwrap();
    h.store
        .record_cash_movement(MovementKind::Supply, Money::from_cents(2000), "Troco")
        .await
        .unwrap();
    h.store
        .record_cash_movement(MovementKind::Bleed, Money::from_cents(500), "Café")
        .await
        .unwrap();
    h.store
        .create_sale(sale(&ana, &blouse, 1, PaymentMethod::Cash))
        .await
        .unwrap();
    h.store
        .create_sale(sale(&ana, &blouse, 1, PaymentMethod::Pix))
        .await
        .unwrap();
    let receipt = h.store.create_sale(bag(&ana, &dress, 1)).await.unwrap();
    h.store
        .record_payment(&receipt.sale.id, Money::from_cents(7000), PaymentMethod::Cash)
        .await
        .unwrap();

    // 100 + 20 − 5 + 50 (cash sale) + 70 (cash receipt)
    let report = h
        .store
        .close_cash_register(Money::from_cents(23500), Some("Fechamento".to_string()))
        .await
        .unwrap();
    assert_eq!(report.expected.cents(), 23500);
    assert!(report.variance.is_zero());
    assert_eq!(report.tenders.pix.cents(), 5000);
    assert_eq!(report.tenders.cash.cents(), 12000);

    assert_eq!(h.store.register_state().await, RegisterState::Closed);
    assert!(h.store.active_session().await.is_none());
    let sessions = h.store.sessions().await;
    let closed = &sessions[0];
    assert_eq!(closed.counted_balance_cents, Some(23500));
    assert_eq!(closed.expected_balance_cents, Some(23500));
}

#[tokio::test]
async fn test_stale_session_blocks_selling_until_closed() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let blouse = add_product(&h.store, "Blusa Seda", 5000, 5).await;
    let opened = h.store.open_cash_register(Money::from_cents(10000)).await.unwrap();

    h.clock.advance(Duration::days(1));
    assert!(matches!(
        h.store.register_state().await,
        RegisterState::Stale { .. }
    ));

    let err = h
        .store
        .create_sale(sale(&ana, &blouse, 1, PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert!(matches!(core_error(err), CoreError::StaleSessionOpen { .. }));

    let err = h
        .store
        .open_cash_register(Money::from_cents(5000))
        .await
        .unwrap_err();
    assert!(matches!(core_error(err), CoreError::StaleSessionOpen { .. }));

    // fixing the drawer and closing are still allowed
    h.store
        .record_cash_movement(MovementKind::Bleed, Money::from_cents(1000), "Depósito")
        .await
        .unwrap();
    let report = h
        .store
        .close_cash_register(Money::from_cents(9000), None)
        .await
        .unwrap();
    assert_eq!(report.session_id, opened.id);
    assert!(report.variance.is_zero());

    h.store.open_cash_register(Money::from_cents(9000)).await.unwrap();
    h.store
        .create_sale(sale(&ana, &blouse, 1, PaymentMethod::Cash))
        .await
        .unwrap();
    assert_eq!(h.store.sessions().await.len(), 2);
}

// =============================================================================
// Debt & Bags
// =============================================================================

#[tokio::test]
async fn test_bag_creates_debt_and_payment_reduces_it() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let dress = add_product(&h.store, "Vestido Longo", 20000, 3).await;
    h.store.open_cash_register(Money::from_cents(0)).await.unwrap();

    let receipt = h.store.create_sale(bag(&ana, &dress, 1)).await.unwrap();
    assert_eq!(receipt.sale.status, SaleStatus::Pending);
    assert_eq!(h.store.client(&ana.id).await.unwrap().current_debt_cents, 20000);

    let paid = h
        .store
        .record_payment(&receipt.sale.id, Money::from_cents(8000), PaymentMethod::Pix)
        .await
        .unwrap();
    assert_eq!(paid.paid_cents, 8000);
    assert_eq!(paid.status, SaleStatus::Partial);
    assert_eq!(h.store.client(&ana.id).await.unwrap().current_debt_cents, 12000);

    // a zero payment changes nothing and writes nothing
    let writes = h.backend.applied_count();
    let same = h
        .store
        .record_payment(&receipt.sale.id, Money::zero(), PaymentMethod::Pix)
        .await
        .unwrap();
    assert_eq!(same.paid_cents, 8000);
    assert_eq!(h.backend.applied_count(), writes);

    assert_books_consistent(&h.store).await;
}

#[tokio::test]
async fn test_settling_a_bag_returns_pieces_and_reduces_debt() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let skirt = add_product(&h.store, "Saia Plissada", 5000, 10).await;
    h.store.open_cash_register(Money::from_cents(0)).await.unwrap();

    let receipt = h.store.create_sale(bag(&ana, &skirt, 3)).await.unwrap();
    assert_eq!(receipt.sale.total_cents, 15000);
    assert_eq!(h.store.product(&skirt.id).await.unwrap().on_bag_quantity, 3);

    let kept = HashMap::from([(skirt.id.clone(), 1)]);
    let settled = h.store.settle_bag(&receipt.sale.id, &kept).await.unwrap();

    assert_eq!(settled.total_cents, 5000);
    assert_eq!(settled.kind, SaleKind::Sale);
    assert_eq!(settled.status, SaleStatus::Pending);
    assert!(settled.settled_at.is_some());
    assert_eq!(settled.items.len(), 1);

    let skirt_now = h.store.product(&skirt.id).await.unwrap();
    assert_eq!(skirt_now.on_bag_quantity, 0);
    assert_eq!(skirt_now.stock_quantity, 9);
    assert_eq!(h.store.client(&ana.id).await.unwrap().current_debt_cents, 5000);

    // a settled bag cannot be settled twice
    let err = h.store.settle_bag(&receipt.sale.id, &kept).await.unwrap_err();
    assert!(matches!(core_error(err), CoreError::InvalidSaleStatus { .. }));

    assert_books_consistent(&h.store).await;
}

#[tokio::test]
async fn test_bag_pieces_stay_releasable_when_the_client_pays_up_front() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let skirt = add_product(&h.store, "Saia Plissada", 5000, 10).await;
    h.store.open_cash_register(Money::from_cents(0)).await.unwrap();

    let receipt = h.store.create_sale(bag(&ana, &skirt, 2)).await.unwrap();
    let err = h
        .store
        .record_payment(&receipt.sale.id, Money::from_cents(10000), PaymentMethod::Pix)
        .await
        .unwrap_err();
    assert!(matches!(core_error(err), CoreError::BagNotSettled { .. }));
    assert_eq!(h.store.sale(&receipt.sale.id).await.unwrap().paid_cents, 0);

    let kept = HashMap::from([(skirt.id.clone(), 2)]);
    h.store.settle_bag(&receipt.sale.id, &kept).await.unwrap();
    let paid = h
        .store
        .record_payment(&receipt.sale.id, Money::from_cents(10000), PaymentMethod::Pix)
        .await
        .unwrap();
    assert_eq!(paid.status, SaleStatus::Paid);

    let skirt_now = h.store.product(&skirt.id).await.unwrap();
    assert_eq!((skirt_now.stock_quantity, skirt_now.on_bag_quantity), (8, 0));
    assert_books_consistent(&h.store).await;
}

#[tokio::test]
async fn test_returning_a_whole_bag_clears_it() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let skirt = add_product(&h.store, "Saia Plissada", 5000, 4).await;
    h.store.open_cash_register(Money::from_cents(0)).await.unwrap();

    let receipt = h.store.create_sale(bag(&ana, &skirt, 2)).await.unwrap();
    let settled = h
        .store
        .settle_bag(&receipt.sale.id, &HashMap::new())
        .await
        .unwrap();

    assert_eq!(settled.total_cents, 0);
    assert_eq!(settled.status, SaleStatus::Paid);
    let skirt_now = h.store.product(&skirt.id).await.unwrap();
    assert_eq!((skirt_now.stock_quantity, skirt_now.on_bag_quantity), (4, 0));
    assert_eq!(h.store.client(&ana.id).await.unwrap().current_debt_cents, 0);

    assert_books_consistent(&h.store).await;
}

// =============================================================================
// Refusals Leave Nothing Behind
// =============================================================================

#[tokio::test]
async fn test_sale_with_closed_register_changes_nothing() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let dress = add_product(&h.store, "Vestido Midi", 15000, 10).await;
    let writes = h.backend.applied_count();

    let err = h
        .store
        .create_sale(sale(&ana, &dress, 1, PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert!(matches!(core_error(err), CoreError::RegisterClosed));

    assert_eq!(h.store.product(&dress.id).await.unwrap(), dress);
    assert_eq!(h.store.client(&ana.id).await.unwrap(), ana);
    assert!(h.store.sales().await.is_empty());
    assert_eq!(h.backend.applied_count(), writes);
}

#[tokio::test]
async fn test_overpayment_changes_nothing() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let dress = add_product(&h.store, "Vestido Midi", 15000, 10).await;
    h.store.open_cash_register(Money::from_cents(0)).await.unwrap();
    let receipt = h.store.create_sale(bag(&ana, &dress, 1)).await.unwrap();

    let before_client = h.store.client(&ana.id).await.unwrap();
    let before_sale = h.store.sale(&receipt.sale.id).await.unwrap();
    let before_session = h.store.active_session().await.unwrap();

    let err = h
        .store
        .record_payment(&receipt.sale.id, Money::from_cents(15001), PaymentMethod::Cash)
        .await
        .unwrap_err();
    assert!(matches!(core_error(err), CoreError::OverPayment { .. }));

    assert_eq!(h.store.client(&ana.id).await.unwrap(), before_client);
    assert_eq!(h.store.sale(&receipt.sale.id).await.unwrap(), before_sale);
    assert_eq!(h.store.active_session().await.unwrap(), before_session);
}

#[tokio::test]
async fn test_failed_remote_write_leaves_books_untouched_and_retry_succeeds() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let dress = add_product(&h.store, "Vestido Midi", 15000, 10).await;
    h.store.open_cash_register(Money::from_cents(10000)).await.unwrap();
    let session_before = h.store.active_session().await.unwrap();

    h.backend.fail_next_writes(1);
    let err = h
        .store
        .create_sale(sale(&ana, &dress, 2, PaymentMethod::Cash))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::RemoteWriteFailed(_)));

    assert_eq!(h.store.product(&dress.id).await.unwrap().stock_quantity, 10);
    assert!(h.store.sales().await.is_empty());
    assert_eq!(h.store.active_session().await.unwrap(), session_before);

    h.store
        .create_sale(sale(&ana, &dress, 2, PaymentMethod::Cash))
        .await
        .unwrap();
    assert_eq!(h.store.product(&dress.id).await.unwrap().stock_quantity, 8);

    // what memory shows is what the backend holds
    let persisted = h.backend.snapshot().await;
    assert_eq!(persisted.sales.len(), 1);
    let persisted_dress = persisted.products.iter().find(|p| p.id == dress.id).unwrap();
    assert_eq!(persisted_dress.stock_quantity, 8);

    assert_books_consistent(&h.store).await;
}

#[tokio::test]
async fn test_reload_restores_the_persisted_view() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let dress = add_product(&h.store, "Vestido Midi", 15000, 10).await;
    h.store.open_cash_register(Money::from_cents(0)).await.unwrap();
    h.store.create_sale(bag(&ana, &dress, 2)).await.unwrap();

    h.store.reload().await.unwrap();
    assert_eq!(h.store.product(&dress.id).await.unwrap().on_bag_quantity, 2);
    assert_eq!(h.store.client(&ana.id).await.unwrap().current_debt_cents, 30000);
    assert!(h.store.active_session().await.is_some());
}

// =============================================================================
// Deletes
// =============================================================================

#[tokio::test]
async fn test_referenced_records_cannot_be_deleted() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let bea = add_client(&h.store, "Beatriz Lima").await;
    let dress = add_product(&h.store, "Vestido Midi", 15000, 10).await;
    let spare = add_product(&h.store, "Cinto Couro", 4000, 2).await;
    h.store.open_cash_register(Money::from_cents(0)).await.unwrap();
    h.store
        .create_sale(sale(&ana, &dress, 1, PaymentMethod::Pix))
        .await
        .unwrap();

    let err = h.store.delete_client(&ana.id).await.unwrap_err();
    assert!(matches!(core_error(err), CoreError::InUse { references: 1, .. }));
    let err = h.store.delete_product(&dress.id).await.unwrap_err();
    assert!(matches!(core_error(err), CoreError::InUse { .. }));

    h.store.delete_client(&bea.id).await.unwrap();
    h.store.delete_product(&spare.id).await.unwrap();
    assert!(h.store.client(&bea.id).await.is_none());
    assert!(h.store.product(&spare.id).await.is_none());
    assert_eq!(h.backend.snapshot().await.clients.len(), 1);
}

#[tokio::test]
async fn test_expenses_feed_the_financial_summary() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let dress = add_product(&h.store, "Vestido Midi", 10000, 10).await;
    h.store.open_cash_register(Money::from_cents(0)).await.unwrap();
    h.store
        .create_sale(sale(&ana, &dress, 2, PaymentMethod::Debit))
        .await
        .unwrap();

    let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let rent = h
        .store
        .add_expense(NewExpense {
            description: "Aluguel".to_string(),
            amount_cents: 3000,
            category: ExpenseCategory::Fixed,
            date: today,
            paid: true,
        })
        .await
        .unwrap();

    let summary = h.store.financial_summary(Period::day(today)).await.unwrap();
    assert_eq!(summary.revenue.cents(), 20000);
    assert_eq!(summary.cost_of_goods.cents(), 10000);
    assert_eq!(summary.expenses.cents(), 3000);
    assert_eq!(summary.net_profit.cents(), 7000);

    h.store.delete_expense(&rent.id).await.unwrap();
    let summary = h.store.financial_summary(Period::day(today)).await.unwrap();
    assert_eq!(summary.net_profit.cents(), 10000);
}

// =============================================================================
// Identity & Permissions
// =============================================================================

#[tokio::test]
async fn test_actions_require_login() {
    let h = harness().await;
    h.store.logout().await;
    assert!(h.store.identity().await.is_none());

    let err = h
        .store
        .open_cash_register(Money::from_cents(0))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotAuthenticated));
}

#[tokio::test]
async fn test_wrong_password_is_refused() {
    let h = harness().await;
    h.store.logout().await;
    let err = h.store.login(ADMIN_EMAIL, "errada").await.unwrap_err();
    assert!(matches!(core_error(err), CoreError::InvalidCredentials));
    assert!(h.store.identity().await.is_none());
}

#[tokio::test]
async fn test_seller_sells_but_cannot_delete_or_see_reports() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let dress = add_product(&h.store, "Vestido Midi", 15000, 10).await;

    h.store.logout().await;
    let seller = h.store.login(SELLER_EMAIL, PASSWORD).await.unwrap();
    assert_eq!(seller.role, Role::Seller);

    h.store.open_cash_register(Money::from_cents(0)).await.unwrap();
    h.store
        .create_sale(sale(&ana, &dress, 1, PaymentMethod::Pix))
        .await
        .unwrap();

    let err = h.store.delete_client(&ana.id).await.unwrap_err();
    assert!(matches!(core_error(err), CoreError::PermissionDenied { .. }));
    let err = h.store.receivables().await.unwrap_err();
    assert!(matches!(core_error(err), CoreError::PermissionDenied { .. }));
    let err = h
        .store
        .update_settings(StoreSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(core_error(err), CoreError::PermissionDenied { .. }));
}

#[tokio::test]
async fn test_admin_manages_roles() {
    let h = harness().await;
    let users = h.store.list_users().await.unwrap();
    assert_eq!(users.len(), 2);

    let bia = users.iter().find(|u| u.email == SELLER_EMAIL).unwrap();
    h.store.change_role(&bia.user_id, Role::Manager).await.unwrap();

    let created = h
        .store
        .create_user("Caio", "caio@vitrine.local", PASSWORD, Role::Seller)
        .await
        .unwrap();
    assert_eq!(created.role, Role::Seller);

    let err = h
        .store
        .create_user("Caio 2", "CAIO@vitrine.local", PASSWORD, Role::Seller)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));

    h.store.logout().await;
    let bia = h.store.login(SELLER_EMAIL, PASSWORD).await.unwrap();
    assert_eq!(bia.role, Role::Manager);
    assert!(h.store.receivables().await.is_ok());
}

#[tokio::test]
async fn test_settings_are_validated_and_persisted() {
    let h = harness().await;

    let mut settings = h.store.settings().await;
    settings.store_name = "Ateliê Marta".to_string();
    settings.interest_free_installments = 3;
    h.store.update_settings(settings.clone()).await.unwrap();
    assert_eq!(h.backend.load_settings().await.unwrap(), Some(settings.clone()));

    let mut bad = settings.clone();
    bad.interest_free_installments = bad.max_installments + 1;
    let err = h.store.update_settings(bad).await.unwrap_err();
    assert!(matches!(core_error(err), CoreError::Validation(_)));
    assert_eq!(h.store.settings().await, settings);

    // a reopened store picks the saved settings up
    let reopened = EntityStore::open(h.backend.clone(), h.clock.clone()).await.unwrap();
    assert_eq!(reopened.settings().await.store_name, "Ateliê Marta");
}

// =============================================================================
// Outreach
// =============================================================================

#[tokio::test]
async fn test_outreach_targets_debtors_and_birthdays() {
    let h = harness().await;
    let ana = add_client(&h.store, "Ana Souza").await;
    let dress = add_product(&h.store, "Vestido Midi", 15000, 10).await;
    h.store
        .add_client(NewClient {
            name: "Carla Dias".to_string(),
            phone: "11 91234-5678".to_string(),
            trust_score: 3,
            birth_date: NaiveDate::from_ymd_opt(1990, 3, 10),
            ..NewClient::default()
        })
        .await
        .unwrap();
    h.store.open_cash_register(Money::from_cents(0)).await.unwrap();
    h.store.create_sale(bag(&ana, &dress, 1)).await.unwrap();

    let reminders = h.store.debt_reminders().await.unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].client_id, ana.id);

    let birthdays = h.store.birthday_messages().await.unwrap();
    assert_eq!(birthdays.len(), 1);
    assert_eq!(birthdays[0].client_name, "Carla Dias");
}
