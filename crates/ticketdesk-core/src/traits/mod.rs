//! Core traits defined in `ticketdesk-core` and implemented by other crates.

pub mod identity;
pub mod revocation;

pub use identity::{Identity, IdentityProvider, Role, StoredCredentials};
pub use revocation::{RefreshRecord, RevocationStore};
