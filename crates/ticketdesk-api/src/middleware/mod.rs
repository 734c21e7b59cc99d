//! Custom middleware layers.

pub mod auth;
pub mod cors;
pub mod logging;
