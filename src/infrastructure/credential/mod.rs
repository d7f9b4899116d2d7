//! Credential infrastructure module
//!
//! Password hashing with Argon2 and the in-memory and PostgreSQL credential stores.

mod memory_store;
mod password;
mod postgres_store;

pub use memory_store::InMemoryCredentialStore;
pub use password::{Argon2Hasher, PasswordDigest, PasswordHasher};
pub use postgres_store::{PostgresCredentialStore, PostgresStoreConfig};
