//! API middleware components

pub mod bearer_auth;
pub mod logging;
pub mod security;

pub use bearer_auth::{extract_bearer_token, RequireIdentity};
pub use logging::logging_middleware;
pub use security::security_headers_middleware;
