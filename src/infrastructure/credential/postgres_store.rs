//! PostgreSQL credential store implementation

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use crate::domain::credential::{CredentialRecord, CredentialStore, Role, UserId};
use crate::domain::DomainError;

/// PostgreSQL connection settings for the credential store
#[derive(Debug, Clone)]
pub struct PostgresStoreConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl PostgresStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

/// PostgreSQL implementation of CredentialStore
///
/// Username uniqueness is enforced by the `UNIQUE` constraint on
/// `credentials.username`.
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool and make sure the schema exists
    pub async fn connect(config: &PostgresStoreConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::store_unavailable(format!("Failed to connect to PostgreSQL: {}", e)))?;

        let store = Self::new(pool);
        store.migrate().await?;

        Ok(store)
    }

    /// Create the credentials table if it does not exist yet
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS credentials (
                id UUID PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                salt TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "create credentials table"))?;

        info!("Credential schema ready");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn get_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, salt, role, created_at, updated_at
            FROM credentials
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "get credential by username"))?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn create(&self, record: CredentialRecord) -> Result<CredentialRecord, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO credentials (id, username, password_hash, salt, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.username())
        .bind(record.password_hash())
        .bind(record.salt())
        .bind(record.role().as_str())
        .bind(record.created_at())
        .bind(record.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::duplicate_user(record.username())
            } else {
                map_sqlx_error(e, "create credential")
            }
        })?;

        Ok(record)
    }

    async fn update_password(&self, record: &CredentialRecord) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE credentials
            SET password_hash = $2, salt = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.password_hash())
        .bind(record.salt())
        .bind(record.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "update password"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "User '{}' not found",
                record.username()
            )));
        }

        Ok(())
    }

    async fn delete(&self, username: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM credentials WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "delete credential"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credentials")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "count credentials"))?;

        Ok(count as usize)
    }
}

fn row_to_record(row: &PgRow) -> Result<CredentialRecord, DomainError> {
    let decode = |e: sqlx::Error| map_sqlx_error(e, "decode credential row");

    let id: Uuid = row.try_get("id").map_err(decode)?;
    let username: String = row.try_get("username").map_err(decode)?;
    let password_hash: String = row.try_get("password_hash").map_err(decode)?;
    let salt: String = row.try_get("salt").map_err(decode)?;
    let role: String = row.try_get("role").map_err(decode)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(decode)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(decode)?;

    Ok(CredentialRecord::restore(
        UserId::from_uuid(id),
        username,
        password_hash,
        salt,
        Role::from_str_lossy(&role),
        created_at,
        updated_at,
    ))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

/// Connectivity failures become `StoreUnavailable`; anything else is internal
fn map_sqlx_error(err: sqlx::Error, context: &str) -> DomainError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => {
            DomainError::store_unavailable(format!("Failed to {}: {}", context, err))
        }
        other => DomainError::internal(format!("Failed to {}: {}", context, other)),
    }
}
