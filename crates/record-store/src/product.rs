//! Product record and its stock invariants.

use chrono::{DateTime, Utc};
use common::{Money, ProductId, ShopId, UserId};
use serde::{Deserialize, Serialize};

/// A catalog product owned by a dealer's shop.
///
/// Two stock counters move in lockstep: `quantity` is the farmer-visible
/// available stock, `warehouse_quantity` (when tracked) is the dealer's
/// internal counter. Every reservation decrements both by the same amount,
/// with the warehouse counter floored at zero; every release increments
/// both. `is_available` mirrors `quantity > 0` after each movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,

    /// The shop this product belongs to.
    pub shop_id: ShopId,

    /// The dealer who owns the shop.
    pub dealer_id: UserId,

    /// Display name.
    pub name: String,

    /// Category used for browsing filters.
    pub category: String,

    /// Free-form description.
    pub description: String,

    /// Sale unit, e.g. "kg".
    pub unit: String,

    /// Current unit price. Orders snapshot this at placement time.
    pub price: Money,

    /// Farmer-visible available stock.
    pub quantity: u32,

    /// Dealer-internal stock counter, never exposed to farmer-facing reads.
    pub warehouse_quantity: Option<u32>,

    /// URL of the product image, if one was uploaded.
    pub image_url: Option<String>,

    /// Whether the dealer has published the product.
    pub is_published: bool,

    /// Whether the product can currently be ordered.
    pub is_available: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new unpublished product with the given stock.
    ///
    /// The warehouse counter starts equal to the visible quantity.
    pub fn new(
        shop_id: ShopId,
        dealer_id: UserId,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Money,
        quantity: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::new(),
            shop_id,
            dealer_id,
            name: name.into(),
            category: category.into(),
            description: String::new(),
            unit: "kg".to_string(),
            price,
            quantity,
            warehouse_quantity: Some(quantity),
            image_url: None,
            is_published: false,
            is_available: quantity > 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if a farmer may order this product right now.
    pub fn is_orderable(&self) -> bool {
        self.is_published && self.is_available
    }

    /// Applies a reservation of `quantity` units.
    ///
    /// The caller must have verified `quantity <= self.quantity`; the store
    /// implementations do so under their own serialization mechanism.
    pub(crate) fn apply_reservation(&mut self, quantity: u32) {
        debug_assert!(quantity <= self.quantity);
        self.quantity -= quantity;
        if let Some(warehouse) = self.warehouse_quantity.as_mut() {
            *warehouse = warehouse.saturating_sub(quantity);
        }
        if self.quantity == 0 {
            self.is_available = false;
        }
        self.updated_at = Utc::now();
    }

    /// Applies a release of `quantity` units, restoring reserved stock.
    pub(crate) fn apply_release(&mut self, quantity: u32) {
        self.quantity += quantity;
        if let Some(warehouse) = self.warehouse_quantity.as_mut() {
            *warehouse += quantity;
        }
        if self.quantity > 0 {
            self.is_available = true;
        }
        self.updated_at = Utc::now();
    }
}
