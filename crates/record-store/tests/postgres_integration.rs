//! PostgreSQL record store integration tests
//!
//! These tests share one PostgreSQL container for efficiency and are
//! serialized with `#[serial]` because each one truncates the tables.
//!
//! ```bash
//! cargo test -p record-store --test postgres_integration
//! ```

use std::sync::Arc;

use common::{Money, ProductId, Role, UserId};
use record_store::{
    CatalogStore, Notification, NotificationStore, Order, OrderLine, OrderStatus, OrderStore,
    PaymentMode, PostgresStore, Product, ProductFilter, Shop, ShopStore, StoreError, User,
    UserStore,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for the schema
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!("../../../migrations/0001_initial_schema.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE notifications, orders, products, shops, users CASCADE")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

/// Seeds a dealer with an approved shop and one published product.
async fn seed_catalog(store: &PostgresStore, quantity: u32) -> (User, Shop, Product) {
    let dealer = store
        .insert_user(User::new(
            "Ramesh",
            format!("{}@example.com", UserId::new()),
            "9800000000",
            Role::Dealer,
            "$argon2$test",
        ))
        .await
        .unwrap();

    let mut shop = Shop::new(dealer.id, "Ramesh Agro", "Market Road");
    shop.status = record_store::ShopStatus::Approved;
    let shop = store.save_shop(shop).await.unwrap();

    let mut product = Product::new(
        shop.id,
        dealer.id,
        "Urea 45kg",
        "fertilizer",
        Money::from_rupees(50),
        quantity,
    );
    product.is_published = true;
    let product = store.save_product(product).await.unwrap();

    (dealer, shop, product)
}

#[tokio::test]
#[serial]
async fn reserve_decrements_both_counters_atomically() {
    let store = get_test_store().await;
    let (_, _, product) = seed_catalog(&store, 5).await;

    let updated = store.reserve_stock(product.id, 3).await.unwrap();
    assert_eq!(updated.quantity, 2);
    assert_eq!(updated.warehouse_quantity, Some(2));
    assert!(updated.is_available);
}

#[tokio::test]
#[serial]
async fn reserve_to_zero_clears_availability() {
    let store = get_test_store().await;
    let (_, _, product) = seed_catalog(&store, 5).await;

    let updated = store.reserve_stock(product.id, 5).await.unwrap();
    assert_eq!(updated.quantity, 0);
    assert_eq!(updated.warehouse_quantity, Some(0));
    assert!(!updated.is_available);
}

#[tokio::test]
#[serial]
async fn reserve_failure_classification() {
    let store = get_test_store().await;
    let (_, shop, product) = seed_catalog(&store, 5).await;

    let err = store.reserve_stock(ProductId::new(), 1).await.unwrap_err();
    assert!(matches!(err, StoreError::ProductNotFound(_)));

    let err = store.reserve_stock(product.id, 6).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::InsufficientStock {
            available: 5,
            requested: 6,
            ..
        }
    ));

    let mut unpublished = Product::new(
        shop.id,
        product.dealer_id,
        "Draft",
        "seeds",
        Money::from_rupees(10),
        5,
    );
    unpublished.is_published = false;
    let unpublished = store.save_product(unpublished).await.unwrap();
    let err = store.reserve_stock(unpublished.id, 1).await.unwrap_err();
    assert!(matches!(err, StoreError::ProductUnavailable(_)));

    // Failed reservations leave stock untouched.
    let product = store.product(product.id).await.unwrap().unwrap();
    assert_eq!(product.quantity, 5);
}

#[tokio::test]
#[serial]
async fn concurrent_reservations_never_oversell() {
    let store = get_test_store().await;
    let (_, _, product) = seed_catalog(&store, 10).await;

    let (a, b) = tokio::join!(
        store.reserve_stock(product.id, 6),
        store.reserve_stock(product.id, 6),
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let final_product = store.product(product.id).await.unwrap().unwrap();
    assert_eq!(final_product.quantity, 4);
}

#[tokio::test]
#[serial]
async fn release_restores_stock_and_availability() {
    let store = get_test_store().await;
    let (_, _, product) = seed_catalog(&store, 5).await;
    store.reserve_stock(product.id, 5).await.unwrap();

    let restored = store.release_stock(product.id, 5).await.unwrap().unwrap();
    assert_eq!(restored.quantity, 5);
    assert_eq!(restored.warehouse_quantity, Some(5));
    assert!(restored.is_available);

    assert!(
        store
            .release_stock(ProductId::new(), 1)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
#[serial]
async fn warehouse_counter_floors_at_zero() {
    let store = get_test_store().await;
    let (_, _, mut product) = seed_catalog(&store, 5).await;
    product.warehouse_quantity = Some(2);
    let product = store.save_product(product).await.unwrap();

    let updated = store.reserve_stock(product.id, 4).await.unwrap();
    assert_eq!(updated.quantity, 1);
    assert_eq!(updated.warehouse_quantity, Some(0));
}

#[tokio::test]
#[serial]
async fn order_roundtrip_preserves_lines() {
    let store = get_test_store().await;
    let (dealer, shop, product) = seed_catalog(&store, 5).await;
    let farmer = store
        .insert_user(User::new(
            "Asha",
            format!("{}@example.com", UserId::new()),
            "9811111111",
            Role::Farmer,
            "$argon2$test",
        ))
        .await
        .unwrap();

    let order = Order::new(
        farmer.id,
        dealer.id,
        shop.id,
        vec![OrderLine::new(product.id, 3, Money::from_rupees(50))],
        PaymentMode::Cod,
        Some("Village Khed, Pune".to_string()),
    );
    let saved = store.save_order(order.clone()).await.unwrap();

    let loaded = store.order(saved.id).await.unwrap().unwrap();
    assert_eq!(loaded.lines, order.lines);
    assert_eq!(loaded.total_amount, Money::from_rupees(150));
    assert_eq!(loaded.status, OrderStatus::Placed);
    assert_eq!(loaded.payment_mode, PaymentMode::Cod);

    // Status update persists through the upsert path.
    let mut updated = loaded;
    updated.status = OrderStatus::Assigned;
    store.save_order(updated).await.unwrap();
    let reloaded = store.order(saved.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, OrderStatus::Assigned);

    let by_farmer = store.orders_by_farmer(farmer.id).await.unwrap();
    assert_eq!(by_farmer.len(), 1);
    let filtered = store
        .all_orders(Some(OrderStatus::Assigned))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert!(
        store
            .all_orders(Some(OrderStatus::Delivered))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
#[serial]
async fn duplicate_email_maps_to_typed_error() {
    let store = get_test_store().await;

    store
        .insert_user(User::new(
            "First",
            "taken@example.com",
            "98",
            Role::Farmer,
            "h",
        ))
        .await
        .unwrap();

    let err = store
        .insert_user(User::new(
            "Second",
            "TAKEN@example.com",
            "99",
            Role::Dealer,
            "h",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateEmail(_)));
}

#[tokio::test]
#[serial]
async fn find_available_applies_filters() {
    let store = get_test_store().await;
    let (dealer, shop, product) = seed_catalog(&store, 5).await;

    let mut pesticide = Product::new(
        shop.id,
        dealer.id,
        "Neem Oil Spray",
        "pesticide",
        Money::from_rupees(120),
        8,
    );
    pesticide.is_published = true;
    store.save_product(pesticide).await.unwrap();

    let all = store.find_available(&ProductFilter::new()).await.unwrap();
    assert_eq!(all.len(), 2);

    let by_search = store
        .find_available(&ProductFilter::new().search("neem"))
        .await
        .unwrap();
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].name, "Neem Oil Spray");

    let by_category = store
        .find_available(&ProductFilter::new().category("fertilizer"))
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].id, product.id);

    let by_price = store
        .find_available(
            &ProductFilter::new()
                .min_price(Money::from_rupees(100))
                .max_price(Money::from_rupees(120)),
        )
        .await
        .unwrap();
    assert_eq!(by_price.len(), 1);
    assert_eq!(by_price[0].name, "Neem Oil Spray");
}

#[tokio::test]
#[serial]
async fn notifications_mark_read_and_prune() {
    let store = get_test_store().await;
    let user = store
        .insert_user(User::new(
            "Asha",
            format!("{}@example.com", UserId::new()),
            "98",
            Role::Farmer,
            "h",
        ))
        .await
        .unwrap();

    let n = store
        .insert_notification(Notification::order(user.id, "New order received"))
        .await
        .unwrap();

    // Someone else's id cannot mark it read.
    let other = store
        .insert_user(User::new(
            "Other",
            format!("{}@example.com", UserId::new()),
            "97",
            Role::Farmer,
            "h",
        ))
        .await
        .unwrap();
    assert!(store.mark_read(n.id, other.id).await.unwrap().is_none());

    let marked = store.mark_read(n.id, user.id).await.unwrap().unwrap();
    assert!(marked.read);

    // An old read notification is pruned; the cutoff spares fresh ones.
    let mut stale = Notification::order(user.id, "stale");
    stale.read = true;
    stale.created_at = chrono::Utc::now() - chrono::Duration::days(60);
    store.insert_notification(stale).await.unwrap();

    let cutoff = chrono::Utc::now() - chrono::Duration::days(30);
    let removed = store.prune_read_before(cutoff).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.notifications_for(user.id).await.unwrap().len(), 1);
}
