//! Authentication infrastructure module
//!
//! Token issuing and verification, token revocation and the service that
//! ties them to the credential store.

mod denylist;
mod jwt;
mod service;

pub use denylist::TokenDenylist;
pub use jwt::{IssuedToken, JwtConfig, JwtService, TokenClaims, TokenIssuer};
pub use service::{AuthService, RotatePasswordRequest};
