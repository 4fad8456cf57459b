//! PostgreSQL-backed record store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Money, NotificationId, OrderId, ProductId, Role, ShopId, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Notification, Order, OrderStatus, Product, ProductFilter, Result, Shop, StoreError, User,
    store::{CatalogStore, NotificationStore, OrderStore, ShopStore, UserStore},
};

/// PostgreSQL-backed record store.
///
/// Stock reservation is a single conditional `UPDATE`, so the database
/// itself serializes concurrent reservations against the same product;
/// there is no application-level read-modify-write anywhere in the stock
/// path.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL record store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

fn row_to_product(row: PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
        shop_id: ShopId::from_uuid(row.try_get::<Uuid, _>("shop_id")?),
        dealer_id: UserId::from_uuid(row.try_get::<Uuid, _>("dealer_id")?),
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        description: row.try_get("description")?,
        unit: row.try_get("unit")?,
        price: Money::from_paise(row.try_get("price_paise")?),
        quantity: row.try_get::<i32, _>("quantity")? as u32,
        warehouse_quantity: row
            .try_get::<Option<i32>, _>("warehouse_quantity")?
            .map(|v| v as u32),
        image_url: row.try_get("image_url")?,
        is_published: row.try_get("is_published")?,
        is_available: row.try_get("is_available")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_order(row: PgRow) -> Result<Order> {
    let status: String = row.try_get("status")?;
    let payment_mode: String = row.try_get("payment_mode")?;
    Ok(Order {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        farmer_id: UserId::from_uuid(row.try_get::<Uuid, _>("farmer_id")?),
        dealer_id: UserId::from_uuid(row.try_get::<Uuid, _>("dealer_id")?),
        shop_id: ShopId::from_uuid(row.try_get::<Uuid, _>("shop_id")?),
        lines: serde_json::from_value(row.try_get("lines")?)?,
        status: status.parse().map_err(StoreError::Decode)?,
        payment_mode: payment_mode.parse().map_err(StoreError::Decode)?,
        delivery_address: row.try_get("delivery_address")?,
        total_amount: Money::from_paise(row.try_get("total_paise")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_shop(row: PgRow) -> Result<Shop> {
    let status: String = row.try_get("status")?;
    Ok(Shop {
        id: ShopId::from_uuid(row.try_get::<Uuid, _>("id")?),
        owner_id: UserId::from_uuid(row.try_get::<Uuid, _>("owner_id")?),
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        status: status.parse().map_err(StoreError::Decode)?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_user(row: PgRow) -> Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        mobile: row.try_get("mobile")?,
        role: role.parse::<Role>().map_err(StoreError::Decode)?,
        password_hash: row.try_get("password_hash")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_notification(row: PgRow) -> Result<Notification> {
    let kind: String = row.try_get("kind")?;
    Ok(Notification {
        id: NotificationId::from_uuid(row.try_get::<Uuid, _>("id")?),
        user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
        kind: kind.parse().map_err(StoreError::Decode)?,
        message: row.try_get("message")?,
        read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Escapes LIKE wildcards so user search terms match literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn save_product(&self, product: Product) -> Result<Product> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, shop_id, dealer_id, name, category, description, unit,
                price_paise, quantity, warehouse_quantity, image_url,
                is_published, is_available, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (id) DO UPDATE SET
                shop_id = EXCLUDED.shop_id,
                dealer_id = EXCLUDED.dealer_id,
                name = EXCLUDED.name,
                category = EXCLUDED.category,
                description = EXCLUDED.description,
                unit = EXCLUDED.unit,
                price_paise = EXCLUDED.price_paise,
                quantity = EXCLUDED.quantity,
                warehouse_quantity = EXCLUDED.warehouse_quantity,
                image_url = EXCLUDED.image_url,
                is_published = EXCLUDED.is_published,
                is_available = EXCLUDED.is_available,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.shop_id.as_uuid())
        .bind(product.dealer_id.as_uuid())
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.description)
        .bind(&product.unit)
        .bind(product.price.paise())
        .bind(product.quantity as i32)
        .bind(product.warehouse_quantity.map(|v| v as i32))
        .bind(&product.image_url)
        .bind(product.is_published)
        .bind(product.is_available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_product).transpose()
    }

    async fn reserve_stock(&self, id: ProductId, quantity: u32) -> Result<Product> {
        // The whole check-and-decrement is one conditional UPDATE: either
        // it matches and commits atomically, or stock is untouched.
        let row = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity - $2,
                warehouse_quantity = CASE
                    WHEN warehouse_quantity IS NULL THEN NULL
                    ELSE GREATEST(warehouse_quantity - $2, 0)
                END,
                is_available = quantity - $2 > 0,
                updated_at = NOW()
            WHERE id = $1
              AND is_published
              AND is_available
              AND quantity >= $2
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(quantity as i32)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return row_to_product(row);
        }

        // The update matched nothing; probe once to classify the failure.
        let probe = sqlx::query(
            "SELECT quantity, is_published, is_available FROM products WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match probe {
            None => Err(StoreError::ProductNotFound(id)),
            Some(row) => {
                let is_published: bool = row.try_get("is_published")?;
                let is_available: bool = row.try_get("is_available")?;
                if !is_published || !is_available {
                    Err(StoreError::ProductUnavailable(id))
                } else {
                    Err(StoreError::InsufficientStock {
                        product_id: id,
                        available: row.try_get::<i32, _>("quantity")? as u32,
                        requested: quantity,
                    })
                }
            }
        }
    }

    async fn release_stock(&self, id: ProductId, quantity: u32) -> Result<Option<Product>> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + $2,
                warehouse_quantity = warehouse_quantity + $2,
                is_available = CASE WHEN quantity + $2 > 0 THEN TRUE ELSE is_available END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(quantity as i32)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_product).transpose()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_available(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let mut sql = String::from(
            "SELECT * FROM products WHERE is_published AND is_available AND quantity > 0",
        );
        let mut arg = 0;

        if filter.search.is_some() {
            arg += 1;
            sql.push_str(&format!(
                " AND (name ILIKE ${arg} OR description ILIKE ${arg})"
            ));
        }
        if filter.category.is_some() {
            arg += 1;
            sql.push_str(&format!(" AND category = ${arg}"));
        }
        if filter.min_price.is_some() {
            arg += 1;
            sql.push_str(&format!(" AND price_paise >= ${arg}"));
        }
        if filter.max_price.is_some() {
            arg += 1;
            sql.push_str(&format!(" AND price_paise <= ${arg}"));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(ref term) = filter.search {
            query = query.bind(format!("%{}%", escape_like(term)));
        }
        if let Some(ref category) = filter.category {
            query = query.bind(category.clone());
        }
        if let Some(min) = filter.min_price {
            query = query.bind(min.paise());
        }
        if let Some(max) = filter.max_price {
            query = query.bind(max.paise());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_product).collect()
    }

    async fn products_by_dealer(&self, dealer_id: UserId) -> Result<Vec<Product>> {
        let rows =
            sqlx::query("SELECT * FROM products WHERE dealer_id = $1 ORDER BY created_at DESC")
                .bind(dealer_id.as_uuid())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(row_to_product).collect()
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn save_order(&self, order: Order) -> Result<Order> {
        let lines = serde_json::to_value(&order.lines)?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, farmer_id, dealer_id, shop_id, lines, status,
                payment_mode, delivery_address, total_paise, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                lines = EXCLUDED.lines,
                status = EXCLUDED.status,
                payment_mode = EXCLUDED.payment_mode,
                delivery_address = EXCLUDED.delivery_address,
                total_paise = EXCLUDED.total_paise,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.farmer_id.as_uuid())
        .bind(order.dealer_id.as_uuid())
        .bind(order.shop_id.as_uuid())
        .bind(lines)
        .bind(order.status.as_str())
        .bind(order.payment_mode.as_str())
        .bind(&order.delivery_address)
        .bind(order.total_amount.paise())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(order)
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_order).transpose()
    }

    async fn orders_by_farmer(&self, farmer_id: UserId) -> Result<Vec<Order>> {
        let rows =
            sqlx::query("SELECT * FROM orders WHERE farmer_id = $1 ORDER BY created_at DESC")
                .bind(farmer_id.as_uuid())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(row_to_order).collect()
    }

    async fn orders_by_dealer(&self, dealer_id: UserId) -> Result<Vec<Order>> {
        let rows =
            sqlx::query("SELECT * FROM orders WHERE dealer_id = $1 ORDER BY created_at DESC")
                .bind(dealer_id.as_uuid())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(row_to_order).collect()
    }

    async fn all_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let rows = match status {
            Some(status) => {
                sqlx::query("SELECT * FROM orders WHERE status = $1 ORDER BY created_at DESC")
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM orders ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(row_to_order).collect()
    }
}

#[async_trait]
impl ShopStore for PostgresStore {
    async fn save_shop(&self, shop: Shop) -> Result<Shop> {
        sqlx::query(
            r#"
            INSERT INTO shops (id, owner_id, name, address, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                address = EXCLUDED.address,
                status = EXCLUDED.status
            "#,
        )
        .bind(shop.id.as_uuid())
        .bind(shop.owner_id.as_uuid())
        .bind(&shop.name)
        .bind(&shop.address)
        .bind(shop.status.as_str())
        .bind(shop.created_at)
        .execute(&self.pool)
        .await?;

        Ok(shop)
    }

    async fn shop(&self, id: ShopId) -> Result<Option<Shop>> {
        let row = sqlx::query("SELECT * FROM shops WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_shop).transpose()
    }

    async fn shops_by_owner(&self, owner_id: UserId) -> Result<Vec<Shop>> {
        let rows = sqlx::query("SELECT * FROM shops WHERE owner_id = $1 ORDER BY created_at DESC")
            .bind(owner_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_shop).collect()
    }

    async fn all_shops(&self) -> Result<Vec<Shop>> {
        let rows = sqlx::query("SELECT * FROM shops ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_shop).collect()
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn insert_user(&self, user: User) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, mobile, role, password_hash, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.mobile)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateEmail(user.email))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_user).transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_user).transpose()
    }

    async fn active_admins(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users WHERE role = 'admin' AND is_active")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_user).collect()
    }
}

#[async_trait]
impl NotificationStore for PostgresStore {
    async fn insert_notification(&self, notification: Notification) -> Result<Notification> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, message, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(notification.id.as_uuid())
        .bind(notification.user_id.as_uuid())
        .bind(notification.kind.as_str())
        .bind(&notification.message)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn notifications_for(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_notification).collect()
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<Option<Notification>> {
        let row = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_notification).transpose()
    }

    async fn prune_read_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE is_read AND created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
