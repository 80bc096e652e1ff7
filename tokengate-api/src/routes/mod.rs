/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Token endpoints (whoami, refresh)

pub mod auth;
pub mod health;
