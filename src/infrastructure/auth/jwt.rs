//! JWT bearer token issuing and verification

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

use crate::domain::credential::{CredentialRecord, Identity, Role};
use crate::domain::DomainError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Role of the subject at issue time
    pub role: Role,
    /// Token ID, the denylist key
    pub jti: String,
    /// Issuer
    pub iss: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl TokenClaims {
    /// Create claims for a record, valid for `ttl` from `issued_at`
    pub fn new(
        record: &CredentialRecord,
        issuer: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: record.username().to_string(),
            role: record.role(),
            jti: Uuid::new_v4().to_string(),
            iss: issuer.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// A token is expired from its `exp` second onwards
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn identity(&self) -> Identity {
        Identity {
            username: self.sub.clone(),
            role: self.role,
        }
    }
}

/// A freshly issued bearer token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
    pub identity: Identity,
}

/// Configuration for the JWT service
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC secret used for signing and verification
    pub secret: String,
    /// Token lifetime in minutes
    pub ttl_minutes: u64,
    /// Value of the `iss` claim, checked on verification
    pub issuer: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, ttl_minutes: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_minutes,
            issuer: "auth-service".to_string(),
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

impl Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[hidden]")
            .field("ttl_minutes", &self.ttl_minutes)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Issues and verifies signed bearer tokens
pub trait TokenIssuer: Send + Sync + Debug {
    /// Issue a token for a record, valid from now for `ttl()`
    fn issue(&self, record: &CredentialRecord) -> Result<IssuedToken, DomainError>;

    /// Verify signature, issuer and expiry and return the claims
    fn verify(&self, token: &str) -> Result<TokenClaims, DomainError>;

    /// Lifetime of issued tokens
    fn ttl(&self) -> Duration;
}

/// HS256 JWT service
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Issue a token as if it had been issued at `issued_at`
    pub fn issue_at(
        &self,
        record: &CredentialRecord,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, DomainError> {
        let claims = TokenClaims::new(record, &self.config.issuer, issued_at, self.ttl());

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
            identity: claims.identity(),
            token_id: claims.jti,
        })
    }
}

impl TokenIssuer for JwtService {
    fn issue(&self, record: &CredentialRecord) -> Result<IssuedToken, DomainError> {
        self.issue_at(record, Utc::now())
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, DomainError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => DomainError::ExpiredToken,
                _ => DomainError::invalid_token(e.to_string()),
            })?
            .claims;

        // the library accepts `now == exp`; a token is only valid strictly before expiry
        if claims.is_expired_at(Utc::now()) {
            return Err(DomainError::ExpiredToken);
        }

        Ok(claims)
    }

    fn ttl(&self) -> Duration {
        Duration::minutes(self.config.ttl_minutes as i64)
    }
}
