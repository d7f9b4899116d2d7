//! In-memory credential store implementation

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::credential::{CredentialRecord, CredentialStore};
use crate::domain::DomainError;

/// In-memory implementation of CredentialStore
///
/// Records are keyed by username; `create` checks and inserts under one write
/// lock, which is the uniqueness constraint for this backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    records: Arc<RwLock<HashMap<String, CredentialRecord>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_records(records: Vec<CredentialRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.username().to_string(), r))
            .collect();

        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(username).cloned())
    }

    async fn create(&self, record: CredentialRecord) -> Result<CredentialRecord, DomainError> {
        let mut records = self.records.write().await;

        match records.entry(record.username().to_string()) {
            Entry::Occupied(_) => Err(DomainError::duplicate_user(record.username())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update_password(&self, record: &CredentialRecord) -> Result<(), DomainError> {
        let mut records = self.records.write().await;

        match records.get_mut(record.username()) {
            Some(existing) if existing.id() == record.id() => {
                existing.rotate_password(record.password_hash(), record.salt());
                Ok(())
            }
            _ => Err(DomainError::not_found(format!(
                "User '{}' not found",
                record.username()
            ))),
        }
    }

    async fn delete(&self, username: &str) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        Ok(records.remove(username).is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.records.read().await.len())
    }
}
