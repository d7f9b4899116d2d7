//! Credential record and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a credential record, returned to clients as `userId`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role granted to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular account created through self-registration
    #[default]
    User,
    /// Administrative account, created only by bootstrap or the CLI
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    /// Parse a stored role name. Unknown names fall back to the least privileged role.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "ADMIN" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored credentials for one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    id: UserId,
    /// Unique login name
    username: String,
    /// Argon2id PHC string - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    /// Salt the hash was derived with
    #[serde(skip_serializing)]
    salt: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Create a new record with a fresh identifier
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        salt: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: UserId::generate(),
            username: username.into(),
            password_hash: password_hash.into(),
            salt: salt.into(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a record from persisted columns
    pub fn restore(
        id: UserId,
        username: String,
        password_hash: String,
        salt: String,
        role: Role,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            password_hash,
            salt,
            role,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the password hash and salt. This is the only mutation a record allows.
    pub fn rotate_password(&mut self, password_hash: impl Into<String>, salt: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.salt = salt.into();
        self.updated_at = Utc::now();
    }

    /// The identity this record authenticates as
    pub fn identity(&self) -> Identity {
        Identity {
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// Identity recovered from a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}
