//! Session CLI commands.

use anyhow::Context;
use clap::Args;
use dialoguer::Password;
use ticketdesk_client::{PortalClient, UserInfo};

use crate::output::{self, OutputFormat};

/// Arguments for login
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username
    pub username: String,

    /// Keep the session across restarts
    #[arg(long)]
    pub remember: bool,
}

/// Prompt for a password and sign in.
pub async fn login(
    client: &PortalClient,
    args: &LoginArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let password = Password::new()
        .with_prompt(format!("Password for {}", args.username))
        .interact()
        .context("Failed to read password")?;

    let user = client
        .login(&args.username, &password, args.remember)
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&user),
        OutputFormat::Text => {
            output::print_success(&format!("Signed in as {}", user.username));
            if !args.remember {
                output::print_warning(
                    "Session was not remembered and ends with this command; use --remember to keep it",
                );
            }
        }
    }
    Ok(())
}

/// Show the current user.
pub async fn whoami(client: &PortalClient, format: OutputFormat) -> anyhow::Result<()> {
    let user = client.me().await.context("Not signed in")?;
    print_user(&user, format);
    Ok(())
}

/// Sign out. Always clears local credentials.
pub async fn logout(client: &PortalClient) -> anyhow::Result<()> {
    if !client.is_authenticated() {
        output::print_warning("No stored session");
        return Ok(());
    }
    client.logout().await;
    output::print_success("Signed out");
    Ok(())
}

fn print_user(user: &UserInfo, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(user),
        OutputFormat::Text => {
            output::print_kv("Username", &user.username);
            output::print_kv("Display name", &user.display_name);
            output::print_kv("Role", &user.role);
            output::print_kv("ID", &user.id);
        }
    }
}
