//! In-memory record store implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{NotificationId, OrderId, ProductId, ShopId, UserId};
use tokio::sync::RwLock;

use crate::{
    Notification, Order, OrderStatus, Product, ProductFilter, Result, Shop, StoreError, User,
    store::{CatalogStore, NotificationStore, OrderStore, ShopStore, UserStore},
};

#[derive(Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    shops: HashMap<ShopId, Shop>,
    users: HashMap<UserId, User>,
    notifications: HashMap<NotificationId, Notification>,
}

/// In-memory record store used by tests and database-less deployments.
///
/// All tables sit behind a single `RwLock`; holding the write guard across
/// the check-and-decrement in [`CatalogStore::reserve_stock`] is what
/// serializes concurrent reservations against the same product.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored notifications.
    pub async fn notification_count(&self) -> usize {
        self.tables.read().await.notifications.len()
    }

    /// Clears every table.
    pub async fn clear(&self) {
        let mut tables = self.tables.write().await;
        tables.products.clear();
        tables.orders.clear();
        tables.shops.clear();
        tables.users.clear();
        tables.notifications.clear();
    }
}

fn newest_first<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    items
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn save_product(&self, product: Product) -> Result<Product> {
        let mut tables = self.tables.write().await;
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn reserve_stock(&self, id: ProductId, quantity: u32) -> Result<Product> {
        let mut tables = self.tables.write().await;

        let product = tables
            .products
            .get_mut(&id)
            .ok_or(StoreError::ProductNotFound(id))?;

        if !product.is_orderable() {
            return Err(StoreError::ProductUnavailable(id));
        }

        if product.quantity < quantity {
            return Err(StoreError::InsufficientStock {
                product_id: id,
                available: product.quantity,
                requested: quantity,
            });
        }

        product.apply_reservation(quantity);
        Ok(product.clone())
    }

    async fn release_stock(&self, id: ProductId, quantity: u32) -> Result<Option<Product>> {
        let mut tables = self.tables.write().await;

        match tables.products.get_mut(&id) {
            Some(product) => {
                product.apply_release(quantity);
                Ok(Some(product.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.products.remove(&id).is_some())
    }

    async fn find_available(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        let products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| p.is_published && p.is_available && p.quantity > 0)
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(newest_first(products, |p| p.created_at))
    }

    async fn products_by_dealer(&self, dealer_id: UserId) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        let products: Vec<Product> = tables
            .products
            .values()
            .filter(|p| p.dealer_id == dealer_id)
            .cloned()
            .collect();
        Ok(newest_first(products, |p| p.created_at))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn save_order(&self, order: Order) -> Result<Order> {
        let mut tables = self.tables.write().await;
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn orders_by_farmer(&self, farmer_id: UserId) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        let orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.farmer_id == farmer_id)
            .cloned()
            .collect();
        Ok(newest_first(orders, |o| o.created_at))
    }

    async fn orders_by_dealer(&self, dealer_id: UserId) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        let orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| o.dealer_id == dealer_id)
            .cloned()
            .collect();
        Ok(newest_first(orders, |o| o.created_at))
    }

    async fn all_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        let orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        Ok(newest_first(orders, |o| o.created_at))
    }
}

#[async_trait]
impl ShopStore for InMemoryStore {
    async fn save_shop(&self, shop: Shop) -> Result<Shop> {
        let mut tables = self.tables.write().await;
        tables.shops.insert(shop.id, shop.clone());
        Ok(shop)
    }

    async fn shop(&self, id: ShopId) -> Result<Option<Shop>> {
        Ok(self.tables.read().await.shops.get(&id).cloned())
    }

    async fn shops_by_owner(&self, owner_id: UserId) -> Result<Vec<Shop>> {
        let tables = self.tables.read().await;
        let shops: Vec<Shop> = tables
            .shops
            .values()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(shops, |s| s.created_at))
    }

    async fn all_shops(&self) -> Result<Vec<Shop>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.shops.values().cloned().collect(),
            |s: &Shop| s.created_at,
        ))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: User) -> Result<User> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn active_admins(&self) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|u| u.role == common::Role::Admin && u.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn insert_notification(&self, notification: Notification) -> Result<Notification> {
        let mut tables = self.tables.write().await;
        tables
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn notifications_for(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let tables = self.tables.read().await;
        let notifications: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(notifications, |n| n.created_at))
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<Option<Notification>> {
        let mut tables = self.tables.write().await;

        match tables.notifications.get_mut(&id) {
            Some(notification) if notification.user_id == user_id => {
                notification.read = true;
                Ok(Some(notification.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn prune_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.notifications.len();
        tables
            .notifications
            .retain(|_, n| !(n.read && n.created_at < cutoff));
        Ok((before - tables.notifications.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, Role};

    async fn seeded_product(store: &InMemoryStore, quantity: u32) -> Product {
        let mut product = Product::new(
            ShopId::new(),
            UserId::new(),
            "DAP 50kg",
            "fertilizer",
            Money::from_rupees(1450),
            quantity,
        );
        product.is_published = true;
        store.save_product(product).await.unwrap()
    }

    #[tokio::test]
    async fn reserve_decrements_both_counters() {
        let store = InMemoryStore::new();
        let product = seeded_product(&store, 5).await;

        let updated = store.reserve_stock(product.id, 3).await.unwrap();
        assert_eq!(updated.quantity, 2);
        assert_eq!(updated.warehouse_quantity, Some(2));
        assert!(updated.is_available);
    }

    #[tokio::test]
    async fn reserve_to_zero_clears_availability() {
        let store = InMemoryStore::new();
        let product = seeded_product(&store, 5).await;

        let updated = store.reserve_stock(product.id, 5).await.unwrap();
        assert_eq!(updated.quantity, 0);
        assert!(!updated.is_available);

        // Further reservations now fail as unavailable, not insufficient.
        let err = store.reserve_stock(product.id, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::ProductUnavailable(_)));
    }

    #[tokio::test]
    async fn reserve_more_than_stock_fails_and_changes_nothing() {
        let store = InMemoryStore::new();
        let product = seeded_product(&store, 5).await;

        let err = store.reserve_stock(product.id, 6).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));

        let unchanged = store.product(product.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity, 5);
        assert_eq!(unchanged.warehouse_quantity, Some(5));
    }

    #[tokio::test]
    async fn reserve_unpublished_product_fails() {
        let store = InMemoryStore::new();
        let product = Product::new(
            ShopId::new(),
            UserId::new(),
            "Hidden",
            "seeds",
            Money::from_rupees(10),
            5,
        );
        let product = store.save_product(product).await.unwrap();

        let err = store.reserve_stock(product.id, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::ProductUnavailable(_)));
    }

    #[tokio::test]
    async fn reserve_missing_product_fails() {
        let store = InMemoryStore::new();
        let err = store.reserve_stock(ProductId::new(), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::ProductNotFound(_)));
    }

    #[tokio::test]
    async fn release_restores_stock_and_availability() {
        let store = InMemoryStore::new();
        let product = seeded_product(&store, 5).await;
        store.reserve_stock(product.id, 5).await.unwrap();

        let restored = store.release_stock(product.id, 5).await.unwrap().unwrap();
        assert_eq!(restored.quantity, 5);
        assert_eq!(restored.warehouse_quantity, Some(5));
        assert!(restored.is_available);
    }

    #[tokio::test]
    async fn release_missing_product_returns_none() {
        let store = InMemoryStore::new();
        let result = store.release_stock(ProductId::new(), 3).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn concurrent_reservations_never_oversell() {
        let store = InMemoryStore::new();
        let product = seeded_product(&store, 10).await;

        let (a, b) = tokio::join!(
            store.reserve_stock(product.id, 6),
            store.reserve_stock(product.id, 6),
        );

        // Exactly one of the two contended reservations may win.
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let final_product = store.product(product.id).await.unwrap().unwrap();
        assert_eq!(final_product.quantity, 4);
    }

    #[tokio::test]
    async fn find_available_hides_unpublished_and_exhausted() {
        let store = InMemoryStore::new();
        let visible = seeded_product(&store, 5).await;
        let exhausted = seeded_product(&store, 2).await;
        store.reserve_stock(exhausted.id, 2).await.unwrap();
        // Unpublished product never surfaces.
        let hidden = Product::new(
            ShopId::new(),
            UserId::new(),
            "Draft",
            "seeds",
            Money::from_rupees(10),
            5,
        );
        store.save_product(hidden).await.unwrap();

        let found = store.find_available(&ProductFilter::new()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, visible.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let store = InMemoryStore::new();
        let user = User::new("Asha", "asha@example.com", "98", Role::Farmer, "h");
        store.insert_user(user).await.unwrap();

        let clash = User::new("Asha2", "ASHA@example.com", "99", Role::Dealer, "h");
        let err = store.insert_user(clash).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn mark_read_ignores_other_users_notifications() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let n = store
            .insert_notification(Notification::order(owner, "New order"))
            .await
            .unwrap();

        assert!(store.mark_read(n.id, UserId::new()).await.unwrap().is_none());
        let marked = store.mark_read(n.id, owner).await.unwrap().unwrap();
        assert!(marked.read);
    }

    #[tokio::test]
    async fn prune_removes_only_read_and_expired() {
        let store = InMemoryStore::new();
        let user = UserId::new();

        let mut old_read = Notification::order(user, "old read");
        old_read.read = true;
        old_read.created_at = Utc::now() - chrono::Duration::days(60);
        store.insert_notification(old_read).await.unwrap();

        let mut old_unread = Notification::order(user, "old unread");
        old_unread.created_at = Utc::now() - chrono::Duration::days(60);
        store.insert_notification(old_unread).await.unwrap();

        let mut fresh_read = Notification::order(user, "fresh read");
        fresh_read.read = true;
        store.insert_notification(fresh_read).await.unwrap();

        let cutoff = Utc::now() - chrono::Duration::days(30);
        let removed = store.prune_read_before(cutoff).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.notification_count().await, 2);
    }
}
