//! Server health check.

use serde_json::Value;
use ticketdesk_client::PortalClient;

use crate::output::{self, OutputFormat};

/// Query `/api/health`.
pub async fn execute(client: &PortalClient, format: OutputFormat) -> anyhow::Result<()> {
    let health: Value = client.get_json("/api/health").await?;

    match format {
        OutputFormat::Json => output::print_json(&health),
        OutputFormat::Text => {
            let status = health["status"].as_str().unwrap_or("unknown");
            let version = health["version"].as_str().unwrap_or("unknown");
            output::print_kv("Status", status);
            output::print_kv("Version", version);
        }
    }
    Ok(())
}
