//! Notification record.

use chrono::{DateTime, Utc};
use common::{NotificationId, UserId};
use serde::{Deserialize, Serialize};

/// Category tag for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Emitted by the order workflow.
    Order,

    /// Everything else.
    #[default]
    System,
}

impl NotificationKind {
    /// Returns the kind as the lowercase string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Order => "order",
            NotificationKind::System => "system",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(NotificationKind::Order),
            "system" => Ok(NotificationKind::System),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// A user-facing event record written by workflow transitions.
///
/// Only the `read` flag ever mutates after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,

    /// The user this notification targets.
    pub user_id: UserId,

    /// Category tag.
    pub kind: NotificationKind,

    /// Human-readable message.
    pub message: String,

    /// Whether the user has read it.
    pub read: bool,

    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification.
    pub fn new(user_id: UserId, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            kind,
            message: message.into(),
            read: false,
            created_at: Utc::now(),
        }
    }

    /// Creates an unread order-workflow notification.
    pub fn order(user_id: UserId, message: impl Into<String>) -> Self {
        Self::new(user_id, NotificationKind::Order, message)
    }
}
