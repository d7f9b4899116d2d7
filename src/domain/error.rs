use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User '{username}' already exists")]
    DuplicateUser { username: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Credential store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn duplicate_user(username: impl Into<String>) -> Self {
        Self::DuplicateUser {
            username: username.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable snake_case name of the error kind, used as the API error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateUser { .. } => "duplicate_user",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidToken { .. } => "invalid_token",
            Self::ExpiredToken => "expired_token",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::Validation { .. } => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Whether a client may retry the same request later with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}
