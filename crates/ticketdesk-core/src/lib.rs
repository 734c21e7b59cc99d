//! # ticketdesk-core
//!
//! Core crate for the TicketDesk session subsystem. Contains the store and
//! identity traits, configuration schemas, typed identifiers, the clock
//! abstraction, session events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TicketDesk crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AppError;
pub use result::AppResult;
