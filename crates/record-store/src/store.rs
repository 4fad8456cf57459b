//! Store traits implemented by every record store backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{NotificationId, OrderId, ProductId, ShopId, UserId};

use crate::{
    Notification, Order, OrderStatus, Product, ProductFilter, Result, Shop, User,
};

/// Catalog persistence: products and their stock.
///
/// `reserve_stock` and `release_stock` are the only ways stock moves.
/// Implementations must make `reserve_stock` atomic with respect to
/// concurrent calls on the same product: the check against the current
/// quantity and the decrement happen as one step, so the sum of successful
/// concurrent reservations can never exceed the quantity that was
/// available when the contention started, and `quantity` can never go
/// negative.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Saves a product (atomic single-record upsert).
    async fn save_product(&self, product: Product) -> Result<Product>;

    /// Fetches a product by id.
    async fn product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Atomically reserves `quantity` units of stock.
    ///
    /// Decrements the visible quantity, moves the warehouse counter by the
    /// same amount floored at zero, and clears `is_available` when stock is
    /// exhausted. Fails with `ProductNotFound`, `ProductUnavailable` or
    /// `InsufficientStock` without changing anything.
    async fn reserve_stock(&self, id: ProductId, quantity: u32) -> Result<Product>;

    /// Releases a previous reservation of `quantity` units.
    ///
    /// Restores both counters and re-asserts `is_available`. Returns `None`
    /// when the product no longer exists.
    async fn release_stock(&self, id: ProductId, quantity: u32) -> Result<Option<Product>>;

    /// Deletes a product; returns true if it existed.
    ///
    /// Orders referencing the product keep their line snapshots; the
    /// workflow skips missing products when restoring stock.
    async fn delete_product(&self, id: ProductId) -> Result<bool>;

    /// Lists products a farmer can order: published, available, positive
    /// stock, narrowed by the filter. Newest first.
    async fn find_available(&self, filter: &ProductFilter) -> Result<Vec<Product>>;

    /// Lists every product owned by a dealer, newest first.
    async fn products_by_dealer(&self, dealer_id: UserId) -> Result<Vec<Product>>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Saves an order (atomic single-record upsert).
    async fn save_order(&self, order: Order) -> Result<Order>;

    /// Fetches an order by id.
    async fn order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists a farmer's orders, newest first.
    async fn orders_by_farmer(&self, farmer_id: UserId) -> Result<Vec<Order>>;

    /// Lists a dealer's orders, newest first.
    async fn orders_by_dealer(&self, dealer_id: UserId) -> Result<Vec<Order>>;

    /// Lists all orders, optionally narrowed to one status, newest first.
    async fn all_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>>;
}

/// Shop registry persistence.
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// Saves a shop (atomic single-record upsert).
    async fn save_shop(&self, shop: Shop) -> Result<Shop>;

    /// Fetches a shop by id.
    async fn shop(&self, id: ShopId) -> Result<Option<Shop>>;

    /// Lists the shops owned by a dealer, newest first.
    async fn shops_by_owner(&self, owner_id: UserId) -> Result<Vec<Shop>>;

    /// Lists every shop, newest first.
    async fn all_shops(&self) -> Result<Vec<Shop>>;
}

/// User registry persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user; fails with `DuplicateEmail` if the email is
    /// already registered (comparison is case-insensitive).
    async fn insert_user(&self, user: User) -> Result<User>;

    /// Fetches a user by id.
    async fn user(&self, id: UserId) -> Result<Option<User>>;

    /// Fetches a user by email (case-insensitive).
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Lists every active administrator.
    async fn active_admins(&self) -> Result<Vec<User>>;
}

/// Notification persistence.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Inserts a notification.
    async fn insert_notification(&self, notification: Notification) -> Result<Notification>;

    /// Lists a user's notifications, newest first.
    async fn notifications_for(&self, user_id: UserId) -> Result<Vec<Notification>>;

    /// Marks a notification read if it belongs to `user_id`.
    ///
    /// Returns `None` when it doesn't exist or belongs to someone else;
    /// callers cannot distinguish the two.
    async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<Option<Notification>>;

    /// Deletes read notifications created before `cutoff`.
    ///
    /// Returns the number of rows removed. Used by the maintenance job.
    async fn prune_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// A complete record store backend.
///
/// Blanket-implemented for any type covering all five concerns; the
/// workflow engine and the HTTP layer are generic over this.
pub trait RecordStore:
    CatalogStore + OrderStore + ShopStore + UserStore + NotificationStore + Clone + Send + Sync + 'static
{
}

impl<T> RecordStore for T where
    T: CatalogStore
        + OrderStore
        + ShopStore
        + UserStore
        + NotificationStore
        + Clone
        + Send
        + Sync
        + 'static
{
}
