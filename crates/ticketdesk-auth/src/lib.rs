//! # ticketdesk-auth
//!
//! Server-side credential lifecycle for the TicketDesk portal.
//!
//! ## Modules
//!
//! - `jwt`: signed access/refresh credential encoding and verification
//! - `password`: Argon2id password hashing for primary login
//! - `directory`: in-memory identity directory
//! - `revocation`: refresh record stores (memory, Redis) and the prune sweeper
//! - `session`: issuance, rotation, termination, and request authentication

pub mod directory;
pub mod jwt;
pub mod password;
pub mod revocation;
pub mod session;

pub use directory::MemoryIdentityDirectory;
pub use jwt::{Claims, CredentialCodec, TokenType};
pub use password::PasswordHasher;
pub use revocation::{MemoryRevocationStore, RevocationSweeper};
pub use session::{
    AuthFailure, LoginResult, RotationRejection, RotationService, SessionIssuer, SessionManager,
    SessionTerminator, TokenPair,
};
