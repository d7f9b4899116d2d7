//! CLI module for the auth service
//!
//! - `serve`: run the HTTP server
//! - `create-user`: create an account directly in the configured store

pub mod serve;
pub mod user;

use clap::{Parser, Subcommand};

/// Auth Service - credential issuer and verifier
#[derive(Parser)]
#[command(name = "auth-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Create an account in the configured credential store
    CreateUser(user::CreateUserArgs),
}
