/// Error types for bearer-token operations
///
/// Every failure the token subsystem can produce is an [`AuthError`]
/// variant. Adapters that turn failures into transport responses should
/// branch on [`AuthError::kind`], which groups the variants into a small
/// closed set.
///
/// # Example
///
/// ```
/// use tokengate_shared::auth::error::{AuthError, ErrorKind};
///
/// let err = AuthError::NotAccessToken;
/// assert_eq!(err.kind(), ErrorKind::TypeMismatch);
/// assert_eq!(err.to_string(), "token is not an access token");
/// ```

use serde::{Deserialize, Serialize};

/// Result alias for token operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Coarse classification of an [`AuthError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The signing secret is not set
    Configuration,

    /// Empty token, missing or garbled Authorization header
    MalformedInput,

    /// Signature verification failed or the algorithm is not accepted
    Signature,

    /// Token is expired or not yet valid
    Expiry,

    /// Identity or token_type claim is missing or has the wrong shape
    ClaimShape,

    /// Access token used where a refresh token is required, or vice versa
    TypeMismatch,

    /// The RPC layer could not supply a bearer credential
    Transport,
}

impl ErrorKind {
    /// Gets the kind as a stable snake_case string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::MalformedInput => "malformed_input",
            ErrorKind::Signature => "signature",
            ErrorKind::Expiry => "expiry",
            ErrorKind::ClaimShape => "claim_shape",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::Transport => "transport",
        }
    }
}

/// Error type for token issuance, extraction and verification
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No signing secret has been configured
    #[error("signing secret is not configured")]
    MissingSecret,

    /// Encoding a token failed
    #[error("failed to sign {which} token: {reason}")]
    SigningFailed { which: &'static str, reason: String },

    #[error("token is empty")]
    EmptyToken,

    #[error("authorization header is empty")]
    EmptyAuthHeader,

    #[error("malformed authorization header")]
    MalformedAuthHeader,

    /// Handler asked for an identity on a route that was not authenticated
    #[error("request was not authenticated")]
    MissingAuthContext,

    /// Token is not a well-formed three-part compact token
    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("invalid token signature: {0}")]
    InvalidSignature(String),

    #[error("unexpected signing method: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token has expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("missing identity key in token")]
    MissingIdentity,

    #[error("invalid identity key in token")]
    InvalidIdentity,

    #[error("missing token type in claims")]
    MissingTokenType,

    #[error("invalid token type")]
    InvalidTokenType,

    #[error("invalid token claims")]
    InvalidClaims,

    #[error("token is not an access token")]
    NotAccessToken,

    #[error("token is not a refresh token")]
    NotRefreshToken,

    /// RPC metadata did not carry a usable bearer credential
    #[error("invalid auth token: {0}")]
    Unauthenticated(String),
}

impl AuthError {
    /// Classifies the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingSecret => ErrorKind::Configuration,
            AuthError::SigningFailed { .. } => ErrorKind::Configuration,
            AuthError::EmptyToken
            | AuthError::EmptyAuthHeader
            | AuthError::MalformedAuthHeader
            | AuthError::MissingAuthContext
            | AuthError::MalformedToken(_) => ErrorKind::MalformedInput,
            AuthError::InvalidSignature(_) | AuthError::UnsupportedAlgorithm(_) => {
                ErrorKind::Signature
            }
            AuthError::Expired | AuthError::NotYetValid => ErrorKind::Expiry,
            AuthError::MissingIdentity
            | AuthError::InvalidIdentity
            | AuthError::MissingTokenType
            | AuthError::InvalidTokenType
            | AuthError::InvalidClaims => ErrorKind::ClaimShape,
            AuthError::NotAccessToken | AuthError::NotRefreshToken => ErrorKind::TypeMismatch,
            AuthError::Unauthenticated(_) => ErrorKind::Transport,
        }
    }

    /// True for errors caused by the caller's credential rather than by
    /// server configuration
    pub fn is_client_error(&self) -> bool {
        self.kind() != ErrorKind::Configuration
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as JwtKind;

        match err.kind() {
            JwtKind::ExpiredSignature => AuthError::Expired,
            JwtKind::ImmatureSignature => AuthError::NotYetValid,
            JwtKind::InvalidSignature => AuthError::InvalidSignature(err.to_string()),
            JwtKind::InvalidAlgorithm | JwtKind::InvalidAlgorithmName | JwtKind::MissingAlgorithm => {
                AuthError::UnsupportedAlgorithm(err.to_string())
            }
            JwtKind::InvalidToken
            | JwtKind::Base64(_)
            | JwtKind::Json(_)
            | JwtKind::Utf8(_) => AuthError::MalformedToken(err.to_string()),
            _ => AuthError::InvalidSignature(err.to_string()),
        }
    }
}
