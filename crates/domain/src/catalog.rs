//! Dealer-side catalog management and farmer browsing.

use common::{ProductId, Role};
use record_store::{Product, ProductFilter, RecordStore};

use crate::error::WorkflowError;
use crate::principal::{Principal, authorize};
use crate::requests::{AddProduct, UpdateProduct};

/// Service for managing and browsing the product catalog.
///
/// Farmer-facing reads must never expose `warehouse_quantity`; the HTTP
/// layer strips it when rendering browse responses.
pub struct Catalog<S> {
    store: S,
}

impl<S: RecordStore> Catalog<S> {
    /// Creates a new catalog service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Adds a product to one of the dealer's approved shops.
    ///
    /// The warehouse counter defaults to the visible quantity when the
    /// request doesn't set one.
    #[tracing::instrument(skip(self, principal, request, image_url), fields(dealer = %principal.id))]
    pub async fn add_product(
        &self,
        principal: &Principal,
        request: AddProduct,
        image_url: Option<String>,
    ) -> Result<Product, WorkflowError> {
        authorize(principal, &[Role::Dealer])?;
        request.validate()?;

        let shop = self
            .store
            .shop(request.shop_id)
            .await?
            .filter(|shop| shop.owner_id == principal.id)
            .ok_or(WorkflowError::ShopNotFound)?;

        if !shop.is_approved() {
            return Err(WorkflowError::ShopNotApproved);
        }

        let mut product = Product::new(
            shop.id,
            principal.id,
            request.name,
            request.category,
            request.price,
            request.quantity,
        );
        product.description = request.description;
        product.unit = request.unit;
        if let Some(warehouse) = request.warehouse_quantity {
            product.warehouse_quantity = Some(warehouse);
        }
        product.is_published = request.is_published;
        product.image_url = image_url;

        tracing::info!(product_id = %product.id, shop_id = %shop.id, "product added");
        Ok(self.store.save_product(product).await?)
    }

    /// Applies a sparse update to one of the dealer's own products.
    ///
    /// Setting `quantity` re-derives `is_available`; an explicit
    /// `is_available` in the request wins over the derived value.
    #[tracing::instrument(skip(self, principal, request, image_url), fields(dealer = %principal.id))]
    pub async fn update_product(
        &self,
        principal: &Principal,
        product_id: ProductId,
        request: UpdateProduct,
        image_url: Option<String>,
    ) -> Result<Product, WorkflowError> {
        authorize(principal, &[Role::Dealer])?;
        request.validate()?;

        let mut product = self
            .store
            .product(product_id)
            .await?
            .filter(|product| product.dealer_id == principal.id)
            .ok_or(WorkflowError::ProductNotFound)?;

        if let Some(name) = request.name {
            product.name = name;
        }
        if let Some(category) = request.category {
            product.category = category;
        }
        if let Some(description) = request.description {
            product.description = description;
        }
        if let Some(unit) = request.unit {
            product.unit = unit;
        }
        if let Some(price) = request.price {
            product.price = price;
        }
        if let Some(quantity) = request.quantity {
            product.quantity = quantity;
            product.is_available = quantity > 0;
        }
        if let Some(warehouse) = request.warehouse_quantity {
            product.warehouse_quantity = Some(warehouse);
        }
        if let Some(is_published) = request.is_published {
            product.is_published = is_published;
        }
        if let Some(is_available) = request.is_available {
            product.is_available = is_available;
        }
        if let Some(url) = image_url {
            product.image_url = Some(url);
        }
        product.updated_at = chrono::Utc::now();

        Ok(self.store.save_product(product).await?)
    }

    /// Removes one of the dealer's own products from the catalog.
    ///
    /// Orders already placed keep their line snapshots; the workflow skips
    /// the missing product when it later restores stock.
    #[tracing::instrument(skip(self, principal), fields(dealer = %principal.id))]
    pub async fn delete_product(
        &self,
        principal: &Principal,
        product_id: ProductId,
    ) -> Result<(), WorkflowError> {
        authorize(principal, &[Role::Dealer])?;

        let product = self
            .store
            .product(product_id)
            .await?
            .filter(|product| product.dealer_id == principal.id)
            .ok_or(WorkflowError::ProductNotFound)?;

        self.store.delete_product(product.id).await?;
        tracing::info!(product_id = %product.id, "product deleted");
        Ok(())
    }

    /// Lists every product owned by the requesting dealer.
    pub async fn dealer_products(
        &self,
        principal: &Principal,
    ) -> Result<Vec<Product>, WorkflowError> {
        authorize(principal, &[Role::Dealer])?;
        Ok(self.store.products_by_dealer(principal.id).await?)
    }

    /// Lists the products a farmer can order right now.
    pub async fn browse(
        &self,
        principal: &Principal,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, WorkflowError> {
        authorize(principal, &[Role::Farmer])?;
        Ok(self.store.find_available(filter).await?)
    }
}
