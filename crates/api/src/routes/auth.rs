//! Registration and login endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{Role, UserId};
use record_store::{RecordStore, User, UserStore};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::password;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// -- Response types --

/// Sanitized user view; never includes the password hash.
#[derive(Serialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub role: Role,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            mobile: user.mobile.clone(),
            role: user.role,
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserView,
}

// -- Handlers --

/// POST /auth/register — create an account and issue a token.
#[tracing::instrument(skip(state, request))]
pub async fn register<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    if request.name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.mobile.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(ApiError::BadRequest(
            "Name, email, mobile, password, and role are required".to_string(),
        ));
    }

    let hash = password::hash_password(&request.password)
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let user = state
        .store
        .insert_user(User::new(
            request.name.trim(),
            request.email.trim(),
            request.mobile.trim(),
            request.role,
            hash,
        ))
        .await?;

    let token = state
        .jwt
        .issue(user.id)
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            token,
            user: UserView::from(&user),
        }),
    ))
}

/// POST /auth/login — verify credentials and issue a token.
///
/// Unknown emails and wrong passwords produce the same error so accounts
/// cannot be enumerated.
#[tracing::instrument(skip(state, request))]
pub async fn login<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let invalid = || ApiError::Unauthenticated("Invalid email or password".to_string());

    let user = state
        .store
        .user_by_email(request.email.trim())
        .await?
        .ok_or_else(invalid)?;

    let verified = password::verify_password(&request.password, &user.password_hash)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    if !verified {
        return Err(invalid());
    }

    if !user.is_active {
        return Err(ApiError::Forbidden(
            "Account is deactivated. Please contact support.".to_string(),
        ));
    }

    let token = state
        .jwt
        .issue(user.id)
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse {
        success: true,
        token,
        user: UserView::from(&user),
    }))
}
