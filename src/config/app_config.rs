use serde::Deserialize;

/// Longest accepted token lifetime
pub const MAX_TOKEN_TTL_MINUTES: u64 = 7 * 24 * 60;

/// Application configuration, loaded once at startup and passed down explicitly
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC signing secret; falls back to `JWT_SECRET`, then to a random secret
    pub jwt_secret: Option<String>,
    pub token_ttl_minutes: u64,
    pub issuer: String,
    /// Administrator created when the store is empty
    pub admin_username: String,
    /// Password for the bootstrap administrator; falls back to `ADMIN_DEFAULT_PASSWORD`
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Falls back to `DATABASE_URL`
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_minutes: 15,
            issuer: "auth-service".to_string(),
            admin_username: "admin".to_string(),
            admin_password: None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[hidden]"))
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("issuer", &self.issuer)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "[hidden]"))
            .finish()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 10,
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("database_url", &self.database_url.as_ref().map(|_| "[hidden]"))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:4200".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://127.0.0.1:4200".to_string(),
            ],
            allow_credentials: true,
        }
    }
}

impl AppConfig {
    /// Load from `config/default`, `config/local` and `APP__*` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Reject values the service cannot start with
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.auth.token_ttl_minutes == 0 {
            return Err(config::ConfigError::Message(
                "auth.token_ttl_minutes must be greater than zero".to_string(),
            ));
        }

        if self.auth.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            return Err(config::ConfigError::Message(format!(
                "auth.token_ttl_minutes must not exceed {} (7 days)",
                MAX_TOKEN_TTL_MINUTES
            )));
        }

        if self.cors.allowed_origins.iter().any(|origin| origin.trim() == "*") {
            return Err(config::ConfigError::Message(
                "cors.allowed_origins must list explicit origins, '*' is not allowed".to_string(),
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(config::ConfigError::Message(
                "storage.max_connections must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
