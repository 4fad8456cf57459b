//! Validated request structs, one per operation.
//!
//! Each request is an explicit struct with enumerated fields and stated
//! defaulting rules, validated before any mutation happens.

use common::{Money, ProductId, ShopId};
use record_store::{OrderStatus, PaymentMode};
use serde::Deserialize;

use crate::error::WorkflowError;

/// One requested order line.
#[derive(Debug, Clone, Deserialize)]
pub struct LineRequest {
    /// The product to order.
    pub product_id: ProductId,

    /// Units to order; must be positive.
    pub quantity: u32,
}

/// Request to place an order against a shop.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrder {
    /// The shop to order from.
    pub shop_id: ShopId,

    /// The requested lines; must be non-empty.
    pub lines: Vec<LineRequest>,

    /// Payment mode; defaults to collect-on-delivery.
    #[serde(default)]
    pub payment_mode: PaymentMode,

    /// Delivery address snapshot to store on the order.
    #[serde(default)]
    pub delivery_address: Option<String>,
}

impl PlaceOrder {
    /// Validates the request without touching any state.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.lines.is_empty() {
            return Err(WorkflowError::Validation(
                "order must contain at least one line".to_string(),
            ));
        }
        for line in &self.lines {
            if line.quantity == 0 {
                return Err(WorkflowError::Validation(format!(
                    "quantity for product {} must be positive",
                    line.product_id
                )));
            }
        }
        Ok(())
    }
}

/// Request to move an order to a new status (dealer side).
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatus {
    /// The target status.
    pub status: OrderStatus,
}

/// Request to add a product to a shop's catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct AddProduct {
    /// The shop the product belongs to; must be owned by the caller and
    /// approved.
    pub shop_id: ShopId,

    /// Display name; must be non-empty.
    pub name: String,

    /// Category; must be non-empty.
    pub category: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Sale unit; defaults to "kg".
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Unit price in paise; must be positive.
    pub price: Money,

    /// Initial farmer-visible stock.
    pub quantity: u32,

    /// Dealer-internal stock counter; defaults to the visible quantity.
    #[serde(default)]
    pub warehouse_quantity: Option<u32>,

    /// Whether the product is immediately visible to farmers.
    #[serde(default)]
    pub is_published: bool,
}

fn default_unit() -> String {
    "kg".to_string()
}

impl AddProduct {
    /// Validates the request without touching any state.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "product name is required".to_string(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "product category is required".to_string(),
            ));
        }
        if !self.price.is_positive() {
            return Err(WorkflowError::Validation(
                "product price must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sparse update of a product; absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub price: Option<Money>,
    pub quantity: Option<u32>,
    pub warehouse_quantity: Option<u32>,
    pub is_published: Option<bool>,
    pub is_available: Option<bool>,
}

impl UpdateProduct {
    /// Validates the request without touching any state.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if let Some(ref name) = self.name
            && name.trim().is_empty()
        {
            return Err(WorkflowError::Validation(
                "product name cannot be empty".to_string(),
            ));
        }
        if let Some(price) = self.price
            && !price.is_positive()
        {
            return Err(WorkflowError::Validation(
                "product price must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request to register a new shop.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShop {
    /// Display name; must be non-empty.
    pub name: String,

    /// Street address shown to farmers.
    #[serde(default)]
    pub address: String,
}

impl CreateShop {
    /// Validates the request without touching any state.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "shop name is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_order_rejects_empty_lines() {
        let request = PlaceOrder {
            shop_id: ShopId::new(),
            lines: vec![],
            payment_mode: PaymentMode::default(),
            delivery_address: None,
        };
        assert!(matches!(
            request.validate(),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn place_order_rejects_zero_quantity() {
        let request = PlaceOrder {
            shop_id: ShopId::new(),
            lines: vec![LineRequest {
                product_id: ProductId::new(),
                quantity: 0,
            }],
            payment_mode: PaymentMode::default(),
            delivery_address: None,
        };
        assert!(matches!(
            request.validate(),
            Err(WorkflowError::Validation(_))
        ));
    }

    #[test]
    fn place_order_payment_mode_defaults_to_cod() {
        let json = format!(
            r#"{{"shop_id":"{}","lines":[{{"product_id":"{}","quantity":2}}]}}"#,
            ShopId::new(),
            ProductId::new()
        );
        let request: PlaceOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(request.payment_mode, PaymentMode::Cod);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn add_product_requires_name_category_and_positive_price() {
        let base = AddProduct {
            shop_id: ShopId::new(),
            name: "Urea".to_string(),
            category: "fertilizer".to_string(),
            description: String::new(),
            unit: default_unit(),
            price: Money::from_rupees(50),
            quantity: 10,
            warehouse_quantity: None,
            is_published: true,
        };
        assert!(base.validate().is_ok());

        let mut bad = base.clone();
        bad.name = "  ".to_string();
        assert!(bad.validate().is_err());

        let mut bad = base.clone();
        bad.category = String::new();
        assert!(bad.validate().is_err());

        let mut bad = base;
        bad.price = Money::zero();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn update_product_rejects_bad_fields_only_when_present() {
        assert!(UpdateProduct::default().validate().is_ok());

        let bad = UpdateProduct {
            price: Some(Money::zero()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn create_shop_requires_name() {
        let request = CreateShop {
            name: String::new(),
            address: "Main Road".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
