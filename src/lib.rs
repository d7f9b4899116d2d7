//! Auth Service
//!
//! Credential issuer and verifier:
//! - Account registration with Argon2id password hashing
//! - Login issuing signed, expiring bearer tokens
//! - Token verification and revocation
//! - In-memory or PostgreSQL credential storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use config::StorageBackend;
use domain::credential::CredentialStore;
use infrastructure::{
    auth::{AuthService, JwtConfig, JwtService, TokenDenylist},
    credential::{
        Argon2Hasher, InMemoryCredentialStore, PostgresCredentialStore, PostgresStoreConfig,
    },
};
use std::io::Write;

use rand::Rng;
use tracing::{info, warn};

/// Create the application state, bootstrapping the administrator account
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let auth_service = create_auth_service(config).await?;
    bootstrap_admin(&auth_service, config).await?;

    Ok(AppState::new(auth_service))
}

/// Wire the authentication service from configuration
pub async fn create_auth_service(config: &AppConfig) -> anyhow::Result<Arc<AuthService>> {
    config.validate()?;

    let store = create_credential_store(config).await?;
    let jwt_config = JwtConfig::new(resolve_jwt_secret(config), config.auth.token_ttl_minutes)
        .with_issuer(config.auth.issuer.clone());

    let denylist = TokenDenylist::new(std::time::Duration::from_secs(
        config.auth.token_ttl_minutes * 60,
    ));

    Ok(Arc::new(AuthService::new(
        store,
        Arc::new(Argon2Hasher::new()),
        Arc::new(JwtService::new(jwt_config)),
        denylist,
    )))
}

async fn create_credential_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory credential store");
            Ok(Arc::new(InMemoryCredentialStore::new()))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .storage
                .database_url
                .clone()
                .or_else(|| std::env::var("DATABASE_URL").ok())
                .ok_or_else(|| {
                    anyhow::anyhow!("storage.database_url or DATABASE_URL is required for postgres")
                })?;

            info!("Connecting to PostgreSQL...");
            let store_config = PostgresStoreConfig::new(database_url)
                .with_max_connections(config.storage.max_connections);
            let store = PostgresCredentialStore::connect(&store_config).await?;
            info!("PostgreSQL connection established");

            Ok(Arc::new(store))
        }
    }
}

/// Signing secret from config, then `JWT_SECRET`, then a random one
fn resolve_jwt_secret(config: &AppConfig) -> String {
    config
        .auth
        .jwt_secret
        .clone()
        .or_else(|| std::env::var("JWT_SECRET").ok())
        .filter(|secret| !secret.is_empty())
        .unwrap_or_else(|| {
            warn!(
                "No JWT_SECRET configured. Generating random secret. \
                Tokens will NOT survive restarts."
            );
            generate_random_string(64)
        })
}

fn generate_random_string(len: usize) -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Create the administrator if the store holds no accounts yet
async fn bootstrap_admin(service: &AuthService, config: &AppConfig) -> anyhow::Result<()> {
    let configured = config
        .auth
        .admin_password
        .clone()
        .or_else(|| std::env::var("ADMIN_DEFAULT_PASSWORD").ok())
        .filter(|p| !p.is_empty());

    let is_configured = configured.is_some();
    let password = configured.unwrap_or_else(|| generate_random_string(16));

    let Some(admin) = service
        .bootstrap_admin(&config.auth.admin_username, &password)
        .await?
    else {
        return Ok(());
    };

    info!(username = %admin.username(), "Initial admin user created");

    if is_configured {
        info!("Admin password set via configuration or ADMIN_DEFAULT_PASSWORD");
    } else {
        // generated passwords go to the terminal only, never into the log stream
        write_generated_password(&mut std::io::stderr(), admin.username(), &password)?;
    }

    Ok(())
}

fn write_generated_password(
    out: &mut impl Write,
    username: &str,
    password: &str,
) -> std::io::Result<()> {
    writeln!(out, "===========================================")?;
    writeln!(out, "Initial admin user created!")?;
    writeln!(out, "Username: {}", username)?;
    writeln!(out, "Password: {}", password)?;
    writeln!(out, "Please change this password after first login.")?;
    writeln!(out, "===========================================")
}
