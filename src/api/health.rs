//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::api::types::Json;

use super::state::{AppState, SERVICE_NAME};

/// Service health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /auth/health
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Up,
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check: the credential store must answer
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.auth_service.check_store().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadyResponse {
                status: HealthStatus::Up,
                message: None,
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    status: HealthStatus::Down,
                    message: Some("Credential store unavailable".to_string()),
                }),
            )
        }
    }
}

/// Liveness check - returns 200 if the process is running
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::{state_with_store, test_state};
    use crate::domain::credential::MockCredentialStore;
    use axum::response::Response;
    use std::sync::Arc;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "UP");
        assert_eq!(body["service"], "auth-service");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_ready_check_up() {
        let response = ready_check(State(test_state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "UP");
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_ready_check_down() {
        let store = Arc::new(MockCredentialStore::new());
        store.set_should_fail(true).await;

        let response = ready_check(State(state_with_store(store)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["status"], "DOWN");
    }

    #[tokio::test]
    async fn test_live_check() {
        let response = live_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
