/// Token verification
///
/// [`TokenParser`] verifies signature and time claims, reads the token type
/// and returns the identity. Access and refresh tokens share key and claim
/// shape, so every entry point that trusts a token for a purpose checks
/// `token_type` first:
///
/// - [`TokenParser::parse_request`] accepts access tokens only
/// - [`TokenParser::parse_refresh_token`] accepts refresh tokens only
///
/// # Verification
///
/// - **Algorithms**: HMAC family (HS256, HS384, HS512)
/// - **Time claims**: `exp` and `nbf` are checked when present, with no leeway
/// - **Structure**: header and payload segments must decode to JSON objects
///   or the token is a `MalformedInput` failure; whatever follows the second
///   dot is the signature segment, and any damage there is a `Signature`
///   failure
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use std::sync::Arc;
/// use tokengate_shared::auth::config::{with_identity_key, SigningContext};
/// use tokengate_shared::auth::error::AuthError;
/// use tokengate_shared::auth::issuer::TokenIssuer;
/// use tokengate_shared::auth::parser::TokenParser;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = Arc::new(
///     SigningContext::new("s3cr3t!!", Duration::hours(2), Duration::hours(168))
///         .with_option(with_identity_key("sub")),
/// );
/// let pair = TokenIssuer::new(ctx.clone()).sign("user-42")?;
/// let parser = TokenParser::new(ctx);
///
/// assert_eq!(parser.parse_refresh_token(&pair.refresh_token)?, "user-42");
/// assert_eq!(
///     parser.parse_refresh_token(&pair.access_token),
///     Err(AuthError::NotRefreshToken)
/// );
/// # Ok(())
/// # }
/// ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use std::sync::Arc;

use super::claims::{identity_of, token_type_of, ClaimMap, TokenType};
use super::config::{self, SigningContext};
use super::error::{AuthError, AuthResult};
use super::extract::BearerSource;
use super::path::should_skip_path;

const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Verifies tokens under a [`SigningContext`]
#[derive(Debug, Clone)]
pub struct TokenParser {
    context: Arc<SigningContext>,
}

impl TokenParser {
    pub fn new(context: Arc<SigningContext>) -> Self {
        Self { context }
    }

    /// Parser over the process-wide context
    pub fn from_global() -> Self {
        Self::new(config::current())
    }

    pub fn context(&self) -> &SigningContext {
        &self.context
    }

    /// Verifies `token` under `key` and returns its identity
    ///
    /// The identity claim name comes from the context. When no identity key
    /// is configured the identity is empty and the call succeeds.
    ///
    /// # Errors
    ///
    /// - `MalformedInput`: empty or garbled token
    /// - `Configuration`: empty key
    /// - `Signature`: wrong key, tampering, unsupported algorithm
    /// - `Expiry`: expired or not yet valid
    /// - `ClaimShape`: identity claim missing or not a non-empty string
    pub fn parse_identity(&self, token: &str, key: &[u8]) -> AuthResult<String> {
        let claims = verify(token, key)?;
        identity_of(&claims, self.context.identity_key())
    }

    /// Reads the `token_type` of a token verified under the context secret
    ///
    /// Tokens without a recognized `token_type`, such as those produced by
    /// [`TokenIssuer::sign_with_claims`](super::issuer::TokenIssuer::sign_with_claims),
    /// fail with a `ClaimShape` error.
    pub fn get_token_type(&self, token: &str) -> AuthResult<TokenType> {
        let claims = self.claims(token)?;
        token_type_of(&claims)
    }

    /// Authenticates an inbound call with an access token
    ///
    /// Returns an empty identity without looking at credentials when the
    /// call's path matches a skip pattern. Only HTTP-style sources report a
    /// path; RPC calls are never skipped.
    ///
    /// # Errors
    ///
    /// Extraction errors from `source`, `AuthError::NotAccessToken` for any
    /// other token type, then the errors of [`TokenParser::parse_identity`].
    pub fn parse_request<S>(&self, source: &S) -> AuthResult<String>
    where
        S: BearerSource + ?Sized,
    {
        if let Some(path) = source.request_path() {
            if should_skip_path(path, self.context.skip_patterns()) {
                return Ok(String::new());
            }
        }

        self.parse_request_ignore_skip(source)
    }

    /// [`TokenParser::parse_request`] without the skip-path bypass
    pub fn parse_request_ignore_skip<S>(&self, source: &S) -> AuthResult<String>
    where
        S: BearerSource + ?Sized,
    {
        let token = source.extract_bearer_token()?;
        self.parse_typed(&token, TokenType::Access)
    }

    /// Verifies a refresh token and returns its identity
    ///
    /// Used only by the token-refresh endpoint. Access tokens fail with
    /// `AuthError::NotRefreshToken`.
    pub fn parse_refresh_token(&self, token: &str) -> AuthResult<String> {
        self.parse_typed(token, TokenType::Refresh)
    }

    /// Verifies signature and time claims only
    pub fn parse(&self, token: &str) -> AuthResult<()> {
        self.claims(token).map(|_| ())
    }

    /// Verified claim map under the context secret
    pub fn claims(&self, token: &str) -> AuthResult<ClaimMap> {
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        verify(token, self.context.secret())
    }

    pub fn is_access_token(&self, token: &str) -> bool {
        matches!(self.get_token_type(token), Ok(TokenType::Access))
    }

    pub fn is_refresh_token(&self, token: &str) -> bool {
        matches!(self.get_token_type(token), Ok(TokenType::Refresh))
    }

    fn parse_typed(&self, token: &str, required: TokenType) -> AuthResult<String> {
        let claims = self.claims(token)?;
        if token_type_of(&claims)? != required {
            return Err(required.mismatch_error());
        }
        identity_of(&claims, self.context.identity_key())
    }
}

/// Verified claim map under an explicit key
pub fn parse_with_key(token: &str, key: &[u8]) -> AuthResult<ClaimMap> {
    verify(token, key)
}

fn verify(token: &str, key: &[u8]) -> AuthResult<ClaimMap> {
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }
    if key.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    check_structure(token)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.required_spec_claims.clear();
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let data = decode::<ClaimMap>(token, &DecodingKey::from_secret(key), &validation).map_err(
        |e| match AuthError::from(e) {
            // header and payload already decoded, so this is the signature segment
            AuthError::MalformedToken(reason) => AuthError::InvalidSignature(reason),
            other => other,
        },
    )?;

    Ok(data.claims)
}

fn check_structure(token: &str) -> AuthResult<()> {
    // everything after the second dot belongs to the signature segment
    let segments: Vec<&str> = token.splitn(3, '.').collect();
    if segments.len() != 3 {
        return Err(AuthError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    for (name, segment) in [("header", segments[0]), ("claims", segments[1])] {
        let bytes = URL_SAFE_NO_PAD
            .decode(segment)
            .map_err(|e| AuthError::MalformedToken(format!("{} segment: {}", name, e)))?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(_)) => {}
            Ok(_) if name == "claims" => return Err(AuthError::InvalidClaims),
            Ok(_) => {
                return Err(AuthError::MalformedToken(format!(
                    "{} segment is not a JSON object",
                    name
                )))
            }
            Err(e) => return Err(AuthError::MalformedToken(format!("{} segment: {}", name, e))),
        }
    }

    if segments[2].is_empty() {
        return Err(AuthError::InvalidSignature("missing signature".to_string()));
    }

    Ok(())
}
