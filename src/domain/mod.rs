//! Domain layer - credential types, store trait and error taxonomy

pub mod credential;
pub mod error;

pub use credential::{CredentialRecord, CredentialStore, Identity, Role, UserId};
pub use error::DomainError;
