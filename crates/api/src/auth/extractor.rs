//! Bearer-token extractor: the principal resolver.
//!
//! Resolves the `Authorization` header to a live user record and yields a
//! [`Principal`]. Unknown tokens are 401; deactivated accounts are 403.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use common::UserId;
use domain::Principal;
use record_store::{RecordStore, UserStore};
use uuid::Uuid;

use crate::AppState;
use crate::auth::jwt::{JwtError, JwtService};
use crate::error::ApiError;

/// The authenticated caller, extracted from the bearer token.
///
/// Use this in protected handlers; the wrapped [`Principal`] feeds the
/// domain services.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl<S: RecordStore> FromRequestParts<Arc<AppState<S>>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthenticated("No token provided. Please login first.".to_string())
            })?;

        let token = JwtService::extract_from_header(header).ok_or_else(|| {
            ApiError::Unauthenticated("Invalid authorization header".to_string())
        })?;

        let claims = state.jwt.validate(token).map_err(|err| match err {
            JwtError::Expired => {
                ApiError::Unauthenticated("Token expired. Please login again.".to_string())
            }
            _ => ApiError::Unauthenticated("Invalid token. Please login again.".to_string()),
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map(UserId::from_uuid)
            .map_err(|_| {
                ApiError::Unauthenticated("Invalid token. Please login again.".to_string())
            })?;

        let user = state
            .store
            .user(user_id)
            .await
            .map_err(|err| ApiError::Internal(err.to_string()))?
            .ok_or_else(|| {
                ApiError::Unauthenticated("User not found. Please login again.".to_string())
            })?;

        if !user.is_active {
            return Err(ApiError::Forbidden(
                "Account is deactivated. Please contact support.".to_string(),
            ));
        }

        tracing::debug!(user_id = %user.id, role = %user.role, "request authenticated");
        Ok(CurrentUser(Principal::from(&user)))
    }
}
