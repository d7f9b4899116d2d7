//! Infrastructure layer - implementations of domain traits

pub mod auth;
pub mod credential;
pub mod logging;
