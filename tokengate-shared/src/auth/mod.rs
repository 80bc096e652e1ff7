/// Bearer-token authentication
///
/// This module provides the dual-token (access/refresh) subsystem:
///
/// # Modules
///
/// - [`config`]: immutable [`SigningContext`](config::SigningContext) and the
///   process-wide one-time store
/// - [`path`]: skip-path matching (exact and wildcard patterns)
/// - [`extract`]: bearer token extraction from HTTP requests and gRPC metadata
/// - [`claims`]: token types and claim layout
/// - [`issuer`]: signing access/refresh pairs
/// - [`parser`]: verification, token-type enforcement, identity extraction
/// - [`error`]: [`AuthError`](error::AuthError) and its kinds
/// - [`middleware`]: Axum adapters
/// - [`grpc`]: tonic interceptor
///
/// # Security Features
///
/// - **Signing**: HS256 with a shared secret; HS384/HS512 are accepted on
///   verification
/// - **Type Separation**: access and refresh tokens differ only in
///   `token_type`, which every purpose-bound parse path checks
/// - **Stateless**: no server-side token records, so no revocation
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use std::sync::Arc;
/// use tokengate_shared::auth::config::{with_identity_key, SigningContext};
/// use tokengate_shared::auth::issuer::TokenIssuer;
/// use tokengate_shared::auth::parser::TokenParser;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = Arc::new(
///     SigningContext::new("s3cr3t!!", Duration::hours(2), Duration::hours(168))
///         .with_option(with_identity_key("sub")),
/// );
///
/// let pair = TokenIssuer::new(ctx.clone()).sign("user-42")?;
/// let identity = TokenParser::new(ctx).parse_identity(&pair.access_token, b"s3cr3t!!")?;
/// assert_eq!(identity, "user-42");
/// # Ok(())
/// # }
/// ```

pub mod claims;
pub mod config;
pub mod error;
pub mod extract;
pub mod grpc;
pub mod issuer;
pub mod middleware;
pub mod parser;
pub mod path;

pub use claims::TokenType;
pub use config::SigningContext;
pub use error::{AuthError, AuthResult, ErrorKind};
pub use extract::{BearerSource, HttpCall, RpcCall};
pub use issuer::{TokenIssuer, TokenPair};
pub use middleware::AuthContext;
pub use parser::TokenParser;
