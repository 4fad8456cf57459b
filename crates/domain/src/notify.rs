//! Fire-and-forget notification sink for workflow events.

use common::UserId;
use record_store::{Notification, Order, OrderStatus, RecordStore};

use crate::principal::Principal;

/// Records user-facing notifications as a side effect of workflow
/// transitions.
///
/// Delivery is fire-and-forget: a failed insert is logged and never fails
/// the operation that triggered it.
pub struct Notifier<S> {
    store: S,
}

impl<S: RecordStore> Notifier<S> {
    /// Creates a new notifier over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn deliver(&self, notification: Notification) {
        if let Err(err) = self.store.insert_notification(notification).await {
            tracing::warn!(error = %err, "failed to record notification");
        }
    }

    /// Notifies the dealer and every active admin about a new order.
    pub async fn order_placed(&self, dealer_id: UserId, farmer: &Principal, order: &Order) {
        self.deliver(Notification::order(
            dealer_id,
            format!(
                "New order #{} received from {}",
                order.id.short(),
                farmer.name
            ),
        ))
        .await;

        match self.store.active_admins().await {
            Ok(admins) => {
                for admin in admins {
                    self.deliver(Notification::order(
                        admin.id,
                        format!("Farmer {} placed a new order", farmer.name),
                    ))
                    .await;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to list admins for order notification");
            }
        }
    }

    /// Notifies the farmer that a dealer moved their order to a new status.
    pub async fn status_changed(
        &self,
        farmer_id: UserId,
        order: &Order,
        old: OrderStatus,
        new: OrderStatus,
    ) {
        self.deliver(Notification::order(
            farmer_id,
            format!(
                "Your order #{} status changed from {} to {}",
                order.id.short(),
                old,
                new
            ),
        ))
        .await;
    }
}
