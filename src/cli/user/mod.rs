//! Create-user command - provisions an account without going through the API

use clap::Args;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::domain::credential::Role;
use crate::infrastructure::auth::AuthService;
use crate::infrastructure::logging;

#[derive(Debug, Args)]
pub struct CreateUserArgs {
    /// Username of the new account
    pub username: String,

    /// Password of the new account
    #[arg(long, env = "AUTH_NEW_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Grant the ADMIN role
    #[arg(long)]
    pub admin: bool,
}

impl CreateUserArgs {
    fn role(&self) -> Role {
        if self.admin { Role::Admin } else { Role::User }
    }
}

/// Create the account in the configured credential store
pub async fn run(args: CreateUserArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;
    ensure_persistent_store(&config)?;

    let service = crate::create_auth_service(&config).await?;
    create_user(&service, &args).await
}

/// An in-memory store dies with this process, so the account would never reach a server
fn ensure_persistent_store(config: &AppConfig) -> anyhow::Result<()> {
    match config.storage.backend {
        StorageBackend::Memory => anyhow::bail!(
            "create-user needs a persistent credential store; \
            set storage.backend = \"postgres\" (APP__STORAGE__BACKEND=postgres)"
        ),
        StorageBackend::Postgres => Ok(()),
    }
}

async fn create_user(service: &AuthService, args: &CreateUserArgs) -> anyhow::Result<()> {
    let record = service
        .create_account(&args.username, &args.password, args.role())
        .await?;

    info!(
        user_id = %record.id(),
        username = %record.username(),
        role = %record.role(),
        "User created"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::test_support::test_state;
    use crate::domain::DomainError;

    fn args(username: &str, admin: bool) -> CreateUserArgs {
        CreateUserArgs {
            username: username.to_string(),
            password: "secure_password123".to_string(),
            admin,
        }
    }

    #[test]
    fn test_memory_backend_is_refused() {
        let config = AppConfig::default();

        let err = ensure_persistent_store(&config).unwrap_err();
        assert!(err.to_string().contains("persistent credential store"));
    }

    #[test]
    fn test_postgres_backend_is_accepted() {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Postgres;

        assert!(ensure_persistent_store(&config).is_ok());
    }

    #[tokio::test]
    async fn test_create_admin_user() {
        let state = test_state();

        create_user(&state.auth_service, &args("root", true))
            .await
            .unwrap();

        let issued = state
            .auth_service
            .login("root", "secure_password123")
            .await
            .unwrap();
        assert_eq!(issued.identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_create_duplicate_user() {
        let state = test_state();

        create_user(&state.auth_service, &args("alice", false))
            .await
            .unwrap();
        let err = create_user(&state.auth_service, &args("alice", false))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::DuplicateUser { .. })
        ));
    }
}
