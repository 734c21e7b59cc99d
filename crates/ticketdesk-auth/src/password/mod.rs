//! Password hashing for primary login.

pub mod hasher;

pub use hasher::PasswordHasher;
