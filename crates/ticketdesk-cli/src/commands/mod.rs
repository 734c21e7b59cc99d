//! CLI command definitions and dispatch.

pub mod health;
pub mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ticketdesk_client::{ClientConfig, PortalClient};

use crate::output::OutputFormat;

/// TicketDesk portal client
#[derive(Debug, Parser)]
#[command(name = "ticketdesk", version, about, long_about = None)]
pub struct Cli {
    /// Portal base URL
    #[arg(short, long, default_value = "http://localhost:8080")]
    pub server: String,

    /// File holding a remembered refresh token
    #[arg(long, default_value = ".ticketdesk/session.json")]
    pub credentials: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in
    Login(session::LoginArgs),
    /// Show the signed-in user, renewing the session if needed
    Whoami,
    /// Sign out and forget stored credentials
    Logout,
    /// Check server health
    Health,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> anyhow::Result<()> {
        let client = self.client()?;

        match &self.command {
            Commands::Login(args) => session::login(&client, args, self.format).await,
            Commands::Whoami => session::whoami(&client, self.format).await,
            Commands::Logout => session::logout(&client).await,
            Commands::Health => health::execute(&client, self.format).await,
        }
    }

    fn client(&self) -> anyhow::Result<PortalClient> {
        let config =
            ClientConfig::new(self.server.clone()).with_credential_file(self.credentials.clone());
        Ok(PortalClient::new(&config)?)
    }
}
