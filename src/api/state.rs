//! Application state shared by all handlers

use std::sync::Arc;

use crate::infrastructure::auth::AuthService;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "auth-service";

#[derive(Debug, Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>) -> Self {
        Self { auth_service }
    }
}
