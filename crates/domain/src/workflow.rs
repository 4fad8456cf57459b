//! The order workflow engine.
//!
//! Drives the order lifecycle end to end: validates a placement against
//! the catalog, reserves stock through the store's atomic conditional
//! decrement, creates the order with price snapshots, applies status
//! transitions along the forward lattice, and reverses reservations on
//! cancellation.

use chrono::Utc;
use common::{OrderId, Role};
use record_store::{Order, OrderLine, OrderStatus, RecordStore};

use crate::error::WorkflowError;
use crate::notify::Notifier;
use crate::principal::{Principal, authorize};
use crate::requests::{PlaceOrder, UpdateOrderStatus};

/// Service driving the order lifecycle.
pub struct OrderWorkflow<S> {
    store: S,
    notifier: Notifier<S>,
}

impl<S: RecordStore> OrderWorkflow<S> {
    /// Creates a new workflow engine over the given store.
    pub fn new(store: S) -> Self {
        Self {
            notifier: Notifier::new(store.clone()),
            store,
        }
    }

    /// Places an order for a farmer.
    ///
    /// Line reservations are all-or-nothing: each line goes through the
    /// store's atomic conditional decrement, and the first failure releases
    /// everything reserved so far before the error is returned. The unit
    /// price of each line is snapshotted from the product at reservation
    /// time and never changes afterwards.
    #[tracing::instrument(skip(self, principal, request), fields(farmer = %principal.id))]
    pub async fn place_order(
        &self,
        principal: &Principal,
        request: PlaceOrder,
    ) -> Result<Order, WorkflowError> {
        authorize(principal, &[Role::Farmer])?;
        request.validate()?;

        // Resolve the shop before touching stock so a bad shop id cannot
        // strand reserved quantities.
        let shop = self
            .store
            .shop(request.shop_id)
            .await?
            .ok_or(WorkflowError::ShopNotFound)?;

        let mut lines: Vec<OrderLine> = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            match self.store.reserve_stock(line.product_id, line.quantity).await {
                Ok(product) => {
                    lines.push(OrderLine::new(line.product_id, line.quantity, product.price));
                }
                Err(err) => {
                    self.rollback_reservations(&lines).await;
                    return Err(err.into());
                }
            }
        }

        let order = Order::new(
            principal.id,
            shop.owner_id,
            shop.id,
            lines,
            request.payment_mode,
            request.delivery_address,
        );

        if let Err(err) = self.store.save_order(order.clone()).await {
            self.rollback_reservations(&order.lines).await;
            return Err(err.into());
        }

        metrics::counter!("orders_placed_total").increment(1);
        metrics::histogram!("order_total_paise").record(order.total_amount.paise() as f64);

        self.notifier
            .order_placed(shop.owner_id, principal, &order)
            .await;

        tracing::info!(order_id = %order.id, total = %order.total_amount, "order placed");
        Ok(order)
    }

    /// Cancels an order on behalf of the farmer who placed it.
    ///
    /// An order id belonging to a different farmer is indistinguishable
    /// from a nonexistent one. Cancellation is only allowed while the order
    /// is `placed` or `assigned`; it restores exactly the quantities the
    /// order reserved.
    #[tracing::instrument(skip(self, principal), fields(farmer = %principal.id))]
    pub async fn cancel_order(
        &self,
        principal: &Principal,
        order_id: OrderId,
    ) -> Result<Order, WorkflowError> {
        authorize(principal, &[Role::Farmer])?;

        let mut order = self
            .store
            .order(order_id)
            .await?
            .filter(|order| order.farmer_id == principal.id)
            .ok_or(WorkflowError::OrderNotFound)?;

        if !order.status.farmer_can_cancel() {
            return Err(WorkflowError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        self.restore_stock(&order).await?;

        order.status = OrderStatus::Cancelled;
        order.updated_at = Utc::now();
        let order = self.store.save_order(order).await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(order_id = %order.id, "order cancelled by farmer");
        Ok(order)
    }

    /// Moves an order to a new status on behalf of its dealer.
    ///
    /// Transitions follow the forward lattice (stages may be skipped, never
    /// revisited); `cancelled` is reachable from any non-terminal state and
    /// restores the reserved stock. The farmer is notified of every change.
    #[tracing::instrument(skip(self, principal, request), fields(dealer = %principal.id))]
    pub async fn update_status(
        &self,
        principal: &Principal,
        order_id: OrderId,
        request: UpdateOrderStatus,
    ) -> Result<Order, WorkflowError> {
        authorize(principal, &[Role::Dealer])?;

        let mut order = self
            .store
            .order(order_id)
            .await?
            .filter(|order| order.dealer_id == principal.id)
            .ok_or(WorkflowError::OrderNotFound)?;

        let old = order.status;
        let new = request.status;
        if !old.can_advance_to(new) {
            return Err(WorkflowError::InvalidTransition { from: old, to: new });
        }

        // The lattice rejects cancelled -> cancelled, so stock can never be
        // restored twice.
        if new == OrderStatus::Cancelled {
            self.restore_stock(&order).await?;
        }

        order.status = new;
        order.updated_at = Utc::now();
        let order = self.store.save_order(order).await?;

        metrics::counter!("order_status_updates_total").increment(1);

        self.notifier
            .status_changed(order.farmer_id, &order, old, new)
            .await;

        tracing::info!(order_id = %order.id, from = %old, to = %new, "order status updated");
        Ok(order)
    }

    /// Lists the requesting farmer's orders, newest first.
    pub async fn farmer_orders(&self, principal: &Principal) -> Result<Vec<Order>, WorkflowError> {
        authorize(principal, &[Role::Farmer])?;
        Ok(self.store.orders_by_farmer(principal.id).await?)
    }

    /// Lists the requesting dealer's orders, newest first.
    pub async fn dealer_orders(&self, principal: &Principal) -> Result<Vec<Order>, WorkflowError> {
        authorize(principal, &[Role::Dealer])?;
        Ok(self.store.orders_by_dealer(principal.id).await?)
    }

    /// Lists all orders for an admin, optionally narrowed to one status.
    pub async fn all_orders(
        &self,
        principal: &Principal,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, WorkflowError> {
        authorize(principal, &[Role::Admin])?;
        Ok(self.store.all_orders(status).await?)
    }

    /// Releases every reservation in `lines` after a failed placement.
    ///
    /// Release failures are logged, not propagated: the caller is already
    /// returning the error that triggered the rollback.
    async fn rollback_reservations(&self, lines: &[OrderLine]) {
        for line in lines {
            if let Err(err) = self
                .store
                .release_stock(line.product_id, line.quantity)
                .await
            {
                tracing::error!(
                    product_id = %line.product_id,
                    error = %err,
                    "failed to roll back a reservation"
                );
            }
        }
    }

    /// Restores the stock an order reserved at placement time.
    ///
    /// Products deleted since placement are skipped silently.
    async fn restore_stock(&self, order: &Order) -> Result<(), WorkflowError> {
        for line in &order.lines {
            if self
                .store
                .release_stock(line.product_id, line.quantity)
                .await?
                .is_none()
            {
                tracing::debug!(
                    product_id = %line.product_id,
                    "product gone since placement, skipping stock restore"
                );
            }
        }
        Ok(())
    }
}
