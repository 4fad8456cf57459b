//! The authenticated actor and the role gate.

use common::{Role, UserId};
use record_store::User;

use crate::error::WorkflowError;

/// The authenticated actor making a request.
///
/// Produced by the HTTP layer's credential resolver from a live user
/// record; deactivated accounts never get this far.
#[derive(Debug, Clone)]
pub struct Principal {
    /// The user's id.
    pub id: UserId,

    /// Display name, used in notification messages.
    pub name: String,

    /// The user's role.
    pub role: Role,
}

impl Principal {
    /// Creates a principal directly; tests use this to skip the resolver.
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// The role gate: a pure, stateless predicate.
///
/// Fails with [`WorkflowError::Forbidden`] unless the principal's role is
/// in the allowed set.
pub fn authorize(principal: &Principal, allowed: &[Role]) -> Result<(), WorkflowError> {
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(WorkflowError::Forbidden {
            allowed: allowed
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}
