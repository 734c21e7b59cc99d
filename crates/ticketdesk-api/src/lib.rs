//! # ticketdesk-api
//!
//! HTTP API layer for TicketDesk built on Axum.
//!
//! Provides the session endpoints (login, refresh, logout, me), the request
//! authenticator (extractor and blanket layer), middleware (CORS, logging),
//! DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use state::AppState;
