//! # ticketdesk-client
//!
//! Client side of the TicketDesk session lifecycle.
//!
//! [`PortalClient`] decorates a `reqwest::Client`: every call carries the
//! current access token, and an expired access token triggers one shared
//! renewal that all concurrently failing calls wait on before replaying.
//!
//! ## Modules
//!
//! - `config`: client settings
//! - `token_store`: scoped credential storage (in-memory and file)
//! - `renewal`: single-flight renewal gate
//! - `client`: the request decorator, login and logout
//! - `events`: session notifications for UI-side code

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod renewal;
pub mod token_store;
pub mod types;

pub use client::PortalClient;
pub use config::ClientConfig;
pub use error::{ClientError, RenewalFailure};
pub use events::SessionEvent;
pub use token_store::{CredentialSnapshot, TokenStore};
pub use types::{LoginResponse, TokenResponse, UserInfo};
