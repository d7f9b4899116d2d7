//! Credential store trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::CredentialRecord;
use crate::domain::DomainError;

/// Storage for credential records, keyed by username
///
/// Implementations must enforce username uniqueness inside `create` itself:
/// concurrent creates for the same username resolve to one success and
/// `DomainError::DuplicateUser` for the rest.
#[async_trait]
pub trait CredentialStore: Send + Sync + Debug {
    /// Look up a record by username
    async fn get_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, DomainError>;

    /// Insert a new record
    async fn create(&self, record: CredentialRecord) -> Result<CredentialRecord, DomainError>;

    /// Persist a rotated password hash and salt for an existing record
    async fn update_password(&self, record: &CredentialRecord) -> Result<(), DomainError>;

    /// Delete a record, returning whether it existed
    async fn delete(&self, username: &str) -> Result<bool, DomainError>;

    /// Number of stored records
    async fn count(&self) -> Result<usize, DomainError>;

    /// Check whether a username is taken
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_username(username).await?.is_some())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock credential store for testing
    #[derive(Debug, Default)]
    pub struct MockCredentialStore {
        records: Arc<RwLock<HashMap<String, CredentialRecord>>>,
        should_fail: Arc<RwLock<bool>>,
    }

    impl MockCredentialStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent operation fail with `StoreUnavailable`
        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.write().await = fail;
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            if *self.should_fail.read().await {
                return Err(DomainError::store_unavailable(
                    "Mock store configured to fail",
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CredentialStore for MockCredentialStore {
        async fn get_by_username(
            &self,
            username: &str,
        ) -> Result<Option<CredentialRecord>, DomainError> {
            self.check_should_fail().await?;
            Ok(self.records.read().await.get(username).cloned())
        }

        async fn create(&self, record: CredentialRecord) -> Result<CredentialRecord, DomainError> {
            self.check_should_fail().await?;
            let mut records = self.records.write().await;

            if records.contains_key(record.username()) {
                return Err(DomainError::duplicate_user(record.username()));
            }

            records.insert(record.username().to_string(), record.clone());
            Ok(record)
        }

        async fn update_password(&self, record: &CredentialRecord) -> Result<(), DomainError> {
            self.check_should_fail().await?;
            let mut records = self.records.write().await;

            match records.get_mut(record.username()) {
                Some(existing) => {
                    *existing = record.clone();
                    Ok(())
                }
                None => Err(DomainError::not_found(format!(
                    "User '{}' not found",
                    record.username()
                ))),
            }
        }

        async fn delete(&self, username: &str) -> Result<bool, DomainError> {
            self.check_should_fail().await?;
            Ok(self.records.write().await.remove(username).is_some())
        }

        async fn count(&self) -> Result<usize, DomainError> {
            self.check_should_fail().await?;
            Ok(self.records.read().await.len())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::domain::credential::Role;

        fn create_test_record(username: &str) -> CredentialRecord {
            CredentialRecord::new(username, "hash", "salt", Role::User)
        }

        #[tokio::test]
        async fn test_create_and_get() {
            let store = MockCredentialStore::new();

            store.create(create_test_record("alice")).await.unwrap();

            let found = store.get_by_username("alice").await.unwrap();
            assert_eq!(found.unwrap().username(), "alice");
            assert!(store.username_exists("alice").await.unwrap());
            assert!(!store.username_exists("bob").await.unwrap());
        }

        #[tokio::test]
        async fn test_failure_switch() {
            let store = MockCredentialStore::new();
            store.set_should_fail(true).await;

            let result = store.count().await;
            assert!(matches!(result, Err(DomainError::StoreUnavailable { .. })));

            store.set_should_fail(false).await;
            assert_eq!(store.count().await.unwrap(), 0);
        }
    }
}
