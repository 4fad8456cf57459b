//! Transactional record store for the marketplace backend.
//!
//! This crate owns the persistent record types (products, orders, shops,
//! users, notifications) together with their intrinsic invariants, the
//! per-concern store traits, and two interchangeable implementations:
//!
//! - [`InMemoryStore`] — everything behind one `RwLock`, used by tests and
//!   by deployments without a database
//! - [`PostgresStore`] — sqlx-backed, with stock reservation expressed as a
//!   single conditional `UPDATE`
//!
//! Stock arithmetic lives here because it must be atomic with respect to
//! concurrent reservations: callers never read-modify-write a product's
//! quantity themselves, they go through [`CatalogStore::reserve_stock`] and
//! [`CatalogStore::release_stock`].

pub mod error;
pub mod memory;
pub mod notification;
pub mod order;
pub mod postgres;
pub mod product;
pub mod query;
pub mod shop;
pub mod store;
pub mod user;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use notification::{Notification, NotificationKind};
pub use order::{Order, OrderLine, OrderStatus, PaymentMode};
pub use postgres::PostgresStore;
pub use product::Product;
pub use query::ProductFilter;
pub use shop::{Shop, ShopStatus};
pub use store::{
    CatalogStore, NotificationStore, OrderStore, RecordStore, ShopStore, UserStore,
};
pub use user::User;
