//! Domain events emitted by TicketDesk session operations.
//!
//! Events are recorded as structured `tracing` events under the
//! `ticketdesk::session` target so audit sinks can filter on them.

pub mod session;

pub use session::SessionEvent;
