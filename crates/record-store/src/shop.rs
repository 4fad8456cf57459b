//! Shop registry record.

use chrono::{DateTime, Utc};
use common::{ShopId, UserId};
use serde::{Deserialize, Serialize};

/// Review status of a dealer's shop.
///
/// Dealers can only attach products to approved shops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShopStatus {
    /// Awaiting admin review.
    #[default]
    Pending,

    /// Approved by an admin.
    Approved,

    /// Rejected by an admin.
    Rejected,
}

impl ShopStatus {
    /// Returns the status as the lowercase string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShopStatus::Pending => "pending",
            ShopStatus::Approved => "approved",
            ShopStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for ShopStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ShopStatus::Pending),
            "approved" => Ok(ShopStatus::Approved),
            "rejected" => Ok(ShopStatus::Rejected),
            other => Err(format!("unknown shop status: {other}")),
        }
    }
}

/// A dealer-owned shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    /// Unique shop identifier.
    pub id: ShopId,

    /// The dealer who owns this shop.
    pub owner_id: UserId,

    /// Display name.
    pub name: String,

    /// Street address shown to farmers.
    pub address: String,

    /// Admin review status.
    pub status: ShopStatus,

    /// When the shop was registered.
    pub created_at: DateTime<Utc>,
}

impl Shop {
    /// Creates a new shop pending admin review.
    pub fn new(owner_id: UserId, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: ShopId::new(),
            owner_id,
            name: name.into(),
            address: address.into(),
            status: ShopStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Returns true if the shop has passed admin review.
    pub fn is_approved(&self) -> bool {
        self.status == ShopStatus::Approved
    }
}
