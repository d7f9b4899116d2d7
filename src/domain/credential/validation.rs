//! Credential validation utilities

use thiserror::Error;

/// Errors that can occur while validating registration input
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CredentialValidationError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Username is too short. Minimum length is {0} characters")]
    UsernameTooShort(usize),

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Username contains invalid character: '{0}'. Only alphanumeric characters, underscores, and hyphens are allowed")]
    InvalidUsernameCharacter(char),

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a username
///
/// Rules:
/// - Cannot be empty
/// - 3 to 50 characters
/// - Only ASCII alphanumeric characters, underscores, and hyphens
pub fn validate_username(username: &str) -> Result<(), CredentialValidationError> {
    if username.is_empty() {
        return Err(CredentialValidationError::EmptyUsername);
    }

    if username.len() < MIN_USERNAME_LENGTH {
        return Err(CredentialValidationError::UsernameTooShort(MIN_USERNAME_LENGTH));
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(CredentialValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    if let Some(c) = username
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-')
    {
        return Err(CredentialValidationError::InvalidUsernameCharacter(c));
    }

    Ok(())
}

/// Validate a password: 8 to 128 characters
pub fn validate_password(password: &str) -> Result<(), CredentialValidationError> {
    let len = password.chars().count();

    if len < MIN_PASSWORD_LENGTH {
        return Err(CredentialValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if len > MAX_PASSWORD_LENGTH {
        return Err(CredentialValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}
