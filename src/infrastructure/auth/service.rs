//! Credential issuer/verifier: registration, login and token verification

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::domain::credential::{
    validate_password, validate_username, CredentialRecord, CredentialStore, Identity, Role,
};
use crate::domain::DomainError;
use crate::infrastructure::credential::PasswordHasher;

use super::denylist::TokenDenylist;
use super::jwt::{IssuedToken, TokenClaims, TokenIssuer};

/// Password rotation request
#[derive(Debug, Clone)]
pub struct RotatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Authentication service over a credential store, a password hasher and a token issuer
#[derive(Debug)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    denylist: TokenDenylist,
    /// Hash verified against when the username is unknown
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        denylist: TokenDenylist,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            denylist,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Register a regular account
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CredentialRecord, DomainError> {
        self.create_account(username, password, Role::User).await
    }

    /// Create an account with an explicit role
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<CredentialRecord, DomainError> {
        validate_username(username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(password).map_err(|e| DomainError::validation(e.to_string()))?;

        // skips hashing for the common duplicate case; `create` stays authoritative
        if self.store.username_exists(username).await? {
            return Err(DomainError::duplicate_user(username));
        }

        let digest = self.hasher.hash(password)?;
        let record = CredentialRecord::new(username, digest.hash, digest.salt, role);

        let record = self.store.create(record).await?;
        info!(username = %record.username(), role = %record.role(), "Account created");

        Ok(record)
    }

    /// Check a username/password pair and issue a bearer token
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, DomainError> {
        let record = match self.store.get_by_username(username).await? {
            Some(record) => record,
            None => {
                self.verify_dummy(password);
                warn!(username = %username, "Login failed: unknown user");
                return Err(DomainError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(password, record.password_hash()) {
            warn!(username = %username, "Login failed: password mismatch");
            return Err(DomainError::InvalidCredentials);
        }

        let issued = self.tokens.issue(&record)?;
        info!(
            username = %record.username(),
            token_id = %issued.token_id,
            expires_at = %issued.expires_at,
            "Token issued"
        );

        Ok(issued)
    }

    /// Verify a bearer token and recover its identity
    pub fn verify(&self, token: &str) -> Result<Identity, DomainError> {
        self.verify_claims(token).map(|claims| claims.identity())
    }

    /// Revoke a token until it would have expired
    pub async fn logout(&self, token: &str) -> Result<Identity, DomainError> {
        let claims = self.verify_claims(token)?;
        self.denylist.revoke(&claims.jti).await;

        info!(username = %claims.sub, token_id = %claims.jti, "Token revoked");
        Ok(claims.identity())
    }

    /// Replace the password of an account after checking the current one
    pub async fn rotate_password(
        &self,
        username: &str,
        request: RotatePasswordRequest,
    ) -> Result<(), DomainError> {
        let mut record = self
            .store
            .get_by_username(username)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if !self
            .hasher
            .verify(&request.current_password, record.password_hash())
        {
            return Err(DomainError::InvalidCredentials);
        }

        validate_password(&request.new_password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let digest = self.hasher.hash(&request.new_password)?;
        record.rotate_password(digest.hash, digest.salt);
        self.store.update_password(&record).await?;

        info!(username = %username, "Password rotated");
        Ok(())
    }

    /// Delete an account
    pub async fn delete_account(&self, username: &str) -> Result<(), DomainError> {
        if !self.store.delete(username).await? {
            return Err(DomainError::not_found(format!("User '{}' not found", username)));
        }

        info!(username = %username, "Account deleted");
        Ok(())
    }

    /// Create an administrator when the store holds no accounts yet
    pub async fn bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<CredentialRecord>, DomainError> {
        if self.store.count().await? > 0 {
            debug!("Credential store not empty, skipping admin bootstrap");
            return Ok(None);
        }

        self.create_account(username, password, Role::Admin)
            .await
            .map(Some)
    }

    /// Readiness check of the credential store
    pub async fn check_store(&self) -> Result<(), DomainError> {
        self.store.count().await.map(|_| ())
    }

    /// Lifetime of issued tokens
    pub fn token_ttl(&self) -> chrono::Duration {
        self.tokens.ttl()
    }

    fn verify_claims(&self, token: &str) -> Result<TokenClaims, DomainError> {
        let claims = self.tokens.verify(token)?;

        if self.denylist.is_revoked(&claims.jti) {
            return Err(DomainError::invalid_token("Token has been revoked"));
        }

        Ok(claims)
    }

    /// Spend one hash verification so unknown users cost the same as wrong passwords
    fn verify_dummy(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hasher.hash("unknown-user-password").map(|d| d.hash));

        if let Ok(hash) = dummy {
            let _ = self.hasher.verify(password, hash);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credential::MockCredentialStore;
    use crate::infrastructure::auth::jwt::{JwtConfig, JwtService};
    use crate::infrastructure::credential::{Argon2Hasher, InMemoryCredentialStore};
    use chrono::{Duration, Utc};

    fn create_jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new(JwtConfig::new("service-test-secret", 15)))
    }

    fn create_service_with(store: Arc<dyn CredentialStore>, jwt: Arc<JwtService>) -> AuthService {
        AuthService::new(
            store,
            Arc::new(Argon2Hasher::new()),
            jwt,
            TokenDenylist::new(std::time::Duration::from_secs(15 * 60)),
        )
    }

    fn create_service() -> AuthService {
        create_service_with(Arc::new(InMemoryCredentialStore::new()), create_jwt())
    }

    #[tokio::test]
    async fn test_register() {
        let service = create_service();

        let record = service.register("alice", "secure_password123").await.unwrap();
        assert_eq!(record.username(), "alice");
        assert_eq!(record.role(), Role::User);
        assert!(record.password_hash().starts_with("$argon2id$"));
        assert_ne!(record.password_hash(), "secure_password123");
    }

    #[tokio::test]
    async fn test_register_duplicate_user() {
        let service = create_service();

        service.register("alice", "secure_password123").await.unwrap();

        let result = service.register("alice", "other_password456").await;
        assert!(matches!(result, Err(DomainError::DuplicateUser { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_register_single_winner() {
        let service = Arc::new(create_service());
        let mut tasks = tokio::task::JoinSet::new();

        for _ in 0..4 {
            let service = service.clone();
            tasks.spawn(async move { service.register("contested", "secure_password123").await });
        }

        let mut successes = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined.unwrap() {
                Ok(_) => successes += 1,
                Err(DomainError::DuplicateUser { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = create_service();

        let short_name = service.register("ab", "secure_password123").await;
        assert!(matches!(short_name, Err(DomainError::Validation { .. })));

        let short_password = service.register("alice", "short").await;
        assert!(matches!(short_password, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_login_then_verify() {
        let service = create_service();
        service.register("alice", "secure_password123").await.unwrap();

        let issued = service.login("alice", "secure_password123").await.unwrap();
        let identity = service.verify(&issued.token).unwrap();

        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, Role::User);
        assert_eq!(issued.identity, identity);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = create_service();
        service.register("alice", "secure_password123").await.unwrap();

        let result = service.login("alice", "wrong_password").await;
        assert!(matches!(result, Err(DomainError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let service = create_service();

        let result = service.login("nobody", "secure_password123").await;
        assert!(matches!(result, Err(DomainError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_verify_expired_token() {
        let jwt = create_jwt();
        let service = create_service_with(Arc::new(InMemoryCredentialStore::new()), jwt.clone());
        let record = service.register("alice", "secure_password123").await.unwrap();

        let stale = jwt.issue_at(&record, Utc::now() - Duration::minutes(16)).unwrap();

        let result = service.verify(&stale.token);
        assert!(matches!(result, Err(DomainError::ExpiredToken)));
    }

    #[tokio::test]
    async fn test_verify_tampered_token() {
        let service = create_service();
        service.register("alice", "secure_password123").await.unwrap();
        let issued = service.login("alice", "secure_password123").await.unwrap();

        let (head, signature) = issued.token.rsplit_once('.').unwrap();
        let forged = format!("{}.{}", head, signature.chars().rev().collect::<String>());

        let result = service.verify(&forged);
        assert!(matches!(result, Err(DomainError::InvalidToken { .. })));
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let service = create_service();
        service.register("alice", "secure_password123").await.unwrap();
        let issued = service.login("alice", "secure_password123").await.unwrap();
        let other = service.login("alice", "secure_password123").await.unwrap();

        service.logout(&issued.token).await.unwrap();

        let result = service.verify(&issued.token);
        assert!(matches!(result, Err(DomainError::InvalidToken { .. })));

        // other sessions are untouched
        assert!(service.verify(&other.token).is_ok());
    }

    #[tokio::test]
    async fn test_rotate_password() {
        let service = create_service();
        service.register("alice", "old_password123").await.unwrap();

        service
            .rotate_password(
                "alice",
                RotatePasswordRequest {
                    current_password: "old_password123".to_string(),
                    new_password: "new_password456".to_string(),
                },
            )
            .await
            .unwrap();

        let old = service.login("alice", "old_password123").await;
        assert!(matches!(old, Err(DomainError::InvalidCredentials)));
        assert!(service.login("alice", "new_password456").await.is_ok());
    }

    #[tokio::test]
    async fn test_rotate_password_wrong_current() {
        let service = create_service();
        service.register("alice", "old_password123").await.unwrap();

        let result = service
            .rotate_password(
                "alice",
                RotatePasswordRequest {
                    current_password: "not_the_password".to_string(),
                    new_password: "new_password456".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_delete_account() {
        let service = create_service();
        service.register("alice", "secure_password123").await.unwrap();

        service.delete_account("alice").await.unwrap();

        let login = service.login("alice", "secure_password123").await;
        assert!(matches!(login, Err(DomainError::InvalidCredentials)));

        let again = service.delete_account("alice").await;
        assert!(matches!(again, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_only_when_empty() {
        let service = create_service();

        let admin = service.bootstrap_admin("admin", "admin_password1").await.unwrap();
        assert_eq!(admin.unwrap().role(), Role::Admin);

        let second = service.bootstrap_admin("root", "root_password1").await.unwrap();
        assert!(second.is_none());

        let issued = service.login("admin", "admin_password1").await.unwrap();
        assert_eq!(service.verify(&issued.token).unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn test_store_unavailable() {
        let store = Arc::new(MockCredentialStore::new());
        let service = create_service_with(store.clone(), create_jwt());
        store.set_should_fail(true).await;

        let login = service.login("alice", "secure_password123").await;
        assert!(matches!(login, Err(DomainError::StoreUnavailable { .. })));

        let register = service.register("alice", "secure_password123").await;
        assert!(matches!(register, Err(DomainError::StoreUnavailable { .. })));

        assert!(service.check_store().await.is_err());

        store.set_should_fail(false).await;
        assert!(service.check_store().await.is_ok());
    }

    #[test]
    fn test_token_ttl() {
        let service = create_service();
        assert_eq!(service.token_ttl(), Duration::minutes(15));
    }
}
