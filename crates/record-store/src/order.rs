//! Order record, line items and the status state machine.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, ShopId, UserId};
use serde::{Deserialize, Serialize};

/// The state of an order in its lifecycle.
///
/// Transitions move forward only (stages may be skipped):
/// ```text
/// placed ──► assigned ──► ready ──► in_transit ──► delivered
///    │           │           │            │
///    └───────────┴───────────┴────────────┴──► cancelled
/// ```
/// `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been placed by a farmer.
    #[default]
    Placed,

    /// Dealer has assigned the order for fulfilment.
    Assigned,

    /// Order is packed and ready for pickup.
    Ready,

    /// Order is on its way to the farmer.
    InTransit,

    /// Order has been delivered (terminal state).
    Delivered,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Position in the forward lattice; `None` for `cancelled`, which sits
    /// outside the delivery progression.
    fn stage(&self) -> Option<u8> {
        match self {
            OrderStatus::Placed => Some(0),
            OrderStatus::Assigned => Some(1),
            OrderStatus::Ready => Some(2),
            OrderStatus::InTransit => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    /// Returns true if this is a terminal state (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns true if a dealer may still cancel the order in this state.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the ordering farmer may cancel in this state.
    ///
    /// Farmers lose the right to cancel once fulfilment has progressed past
    /// `assigned`.
    pub fn farmer_can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Placed | OrderStatus::Assigned)
    }

    /// Returns true if the order may move from this state to `next`.
    ///
    /// Forward moves may skip stages but never go backwards, the same
    /// status twice is rejected, and terminal states admit nothing.
    pub fn can_advance_to(&self, next: OrderStatus) -> bool {
        if next == OrderStatus::Cancelled {
            return self.can_cancel();
        }
        match (self.stage(), next.stage()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }

    /// Returns the status name as the snake_case string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Assigned => "assigned",
            OrderStatus::Ready => "ready",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "placed" => Ok(OrderStatus::Placed),
            "assigned" => Ok(OrderStatus::Assigned),
            "ready" => Ok(OrderStatus::Ready),
            "in_transit" => Ok(OrderStatus::InTransit),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// How the farmer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// Paid online at placement time.
    Online,

    /// Collect on delivery.
    #[default]
    Cod,
}

impl PaymentMode {
    /// Returns the payment mode as the lowercase string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Online => "online",
            PaymentMode::Cod => "cod",
        }
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(PaymentMode::Online),
            "cod" => Ok(PaymentMode::Cod),
            other => Err(format!("unknown payment mode: {other}")),
        }
    }
}

/// A line item captured into an order at placement time.
///
/// `unit_price` is a snapshot of the product's price at that moment and
/// never changes afterwards, regardless of later price edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The ordered product.
    pub product_id: ProductId,

    /// Units ordered.
    pub quantity: u32,

    /// Price per unit at placement time.
    pub unit_price: Money,
}

impl OrderLine {
    /// Creates a new order line.
    pub fn new(product_id: ProductId, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// Returns the total for this line (`unit_price × quantity`).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An order placed by a farmer against a dealer's shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,

    /// The farmer who placed the order.
    pub farmer_id: UserId,

    /// The dealer who owns the shop, resolved at placement time.
    pub dealer_id: UserId,

    /// The shop the order was placed against.
    pub shop_id: ShopId,

    /// Captured line items with price snapshots.
    pub lines: Vec<OrderLine>,

    /// Current lifecycle state.
    pub status: OrderStatus,

    /// How the farmer pays.
    pub payment_mode: PaymentMode,

    /// Delivery address snapshot taken at placement time.
    pub delivery_address: Option<String>,

    /// Sum of line totals, fixed at placement time.
    pub total_amount: Money,

    /// When the order was placed.
    pub created_at: DateTime<Utc>,

    /// When the order was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a newly placed order, computing the total from the lines.
    pub fn new(
        farmer_id: UserId,
        dealer_id: UserId,
        shop_id: ShopId,
        lines: Vec<OrderLine>,
        payment_mode: PaymentMode,
        delivery_address: Option<String>,
    ) -> Self {
        let total_amount = lines.iter().map(OrderLine::line_total).sum();
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            farmer_id,
            dealer_id,
            shop_id,
            lines,
            status: OrderStatus::Placed,
            payment_mode,
            delivery_address,
            total_amount,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
