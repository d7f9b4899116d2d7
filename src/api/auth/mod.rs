//! Authentication API endpoints
//!
//! Registration, login and bearer-token protected account endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::health;
use crate::api::middleware::RequireIdentity;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::credential::{Identity, Role};
use crate::infrastructure::auth::RotatePasswordRequest;

/// Create the authentication router, nested under `/auth`
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/password", post(change_password))
        .route("/me", get(get_current_user).delete(delete_current_user))
        .route("/health", get(health::health_check))
}

/// Username/password pair used by register and login
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: String,
    pub user: Identity,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// POST /auth/register
///
/// Self-registered accounts always get the `USER` role.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let record = state
        .auth_service
        .register(&request.username, &request.password)
        .await?;

    Ok(Json(RegisterResponse {
        user_id: record.id().to_string(),
        username: record.username().to_string(),
        role: record.role(),
    }))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let issued = state
        .auth_service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        expires_at: issued.expires_at.to_rfc3339(),
        user: issued.identity,
    }))
}

/// POST /auth/logout
///
/// Revokes the presented token; other tokens of the same user stay valid.
pub async fn logout(
    State(state): State<AppState>,
    auth: RequireIdentity,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service.logout(&auth.token).await?;

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// GET /auth/me
pub async fn get_current_user(auth: RequireIdentity) -> Json<Identity> {
    Json(auth.identity)
}

/// POST /auth/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: RequireIdentity,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth_service
        .rotate_password(
            &auth.identity.username,
            RotatePasswordRequest {
                current_password: request.current_password,
                new_password: request.new_password,
            },
        )
        .await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// DELETE /auth/me
///
/// Revokes the token used for the request, then deletes the account.
pub async fn delete_current_user(
    State(state): State<AppState>,
    auth: RequireIdentity,
) -> Result<StatusCode, ApiError> {
    state.auth_service.logout(&auth.token).await?;
    state
        .auth_service
        .delete_account(&auth.identity.username)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
