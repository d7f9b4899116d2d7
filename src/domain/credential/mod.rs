//! Credential domain
//!
//! Credential records, the identities they authenticate as, registration
//! input validation and the store trait.

mod entity;
mod store;
mod validation;

pub use entity::{CredentialRecord, Identity, Role, UserId};
pub use store::CredentialStore;
pub use validation::{validate_password, validate_username, CredentialValidationError};

#[cfg(test)]
pub use store::mock::MockCredentialStore;
