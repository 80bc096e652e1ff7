//! # Tokengate Shared Library
//!
//! This crate contains the bearer-token authentication subsystem used by the
//! Tokengate API server and by any service that needs to verify its tokens.
//!
//! ## Module Organization
//!
//! - `auth`: token issuance, verification, extraction and transport adapters

pub mod auth;

/// Current version of the Tokengate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
