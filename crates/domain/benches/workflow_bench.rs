use common::{Money, Role, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{LineRequest, OrderWorkflow, PlaceOrder, Principal};
use record_store::{
    CatalogStore, InMemoryStore, PaymentMode, Product, Shop, ShopStatus, ShopStore,
};

async fn seed(store: &InMemoryStore, quantity: u32) -> (Principal, PlaceOrder) {
    let dealer_id = UserId::new();
    let mut shop = Shop::new(dealer_id, "Bench Agro", "Bench Road");
    shop.status = ShopStatus::Approved;
    let shop = store.save_shop(shop).await.unwrap();

    let mut product = Product::new(
        shop.id,
        dealer_id,
        "Bench Urea",
        "fertilizer",
        Money::from_rupees(50),
        quantity,
    );
    product.is_published = true;
    let product = store.save_product(product).await.unwrap();

    let farmer = Principal::new(UserId::new(), "Bench Farmer", Role::Farmer);
    let request = PlaceOrder {
        shop_id: shop.id,
        lines: vec![LineRequest {
            product_id: product.id,
            quantity: 1,
        }],
        payment_mode: PaymentMode::default(),
        delivery_address: None,
    };
    (farmer, request)
}

fn bench_place_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("workflow/place_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryStore::new();
                let workflow = OrderWorkflow::new(store.clone());
                let (farmer, request) = seed(&store, 100).await;
                workflow.place_order(&farmer, request).await.unwrap();
            });
        });
    });
}

fn bench_place_and_cancel(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("workflow/place_and_cancel", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryStore::new();
                let workflow = OrderWorkflow::new(store.clone());
                let (farmer, request) = seed(&store, 100).await;
                let order = workflow.place_order(&farmer, request).await.unwrap();
                workflow.cancel_order(&farmer, order.id).await.unwrap();
            });
        });
    });
}

fn bench_reserve_release_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryStore::new();
    let (_, request) = rt.block_on(seed(&store, u32::MAX));
    let product_id = request.lines[0].product_id;

    c.bench_function("store/reserve_release", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.reserve_stock(product_id, 1).await.unwrap();
                store.release_stock(product_id, 1).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_place_order,
    bench_place_and_cancel,
    bench_reserve_release_cycle
);
criterion_main!(benches);
