/// Token issuance
///
/// [`TokenIssuer`] signs access/refresh pairs with HS256 under the context
/// secret. Both tokens of a pair share `iat`/`nbf`; only `token_type` and
/// `exp` differ.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use std::sync::Arc;
/// use tokengate_shared::auth::config::{with_identity_key, SigningContext};
/// use tokengate_shared::auth::issuer::TokenIssuer;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = SigningContext::new("s3cr3t!!", Duration::hours(2), Duration::hours(168))
///     .with_option(with_identity_key("sub"));
/// let issuer = TokenIssuer::new(Arc::new(ctx));
///
/// let pair = issuer.sign("user-42")?;
/// assert!(pair.refresh_expires_at > pair.access_expires_at);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use std::sync::Arc;

use super::claims::{ClaimMap, TokenClaims, TokenType};
use super::config::{self, SigningContext};
use super::error::{AuthError, AuthResult};

/// A freshly signed access/refresh pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Signs tokens under a [`SigningContext`]
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    context: Arc<SigningContext>,
}

impl TokenIssuer {
    pub fn new(context: Arc<SigningContext>) -> Self {
        Self { context }
    }

    /// Issuer over the process-wide context
    pub fn from_global() -> Self {
        Self::new(config::current())
    }

    pub fn context(&self) -> &SigningContext {
        &self.context
    }

    /// Signs an access/refresh pair for `identity`
    ///
    /// The identity is written under the configured identity key; with no
    /// identity key, or an empty identity, the claim is omitted.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingSecret` if the context has no secret
    /// - `AuthError::SigningFailed` if encoding fails
    pub fn sign(&self, identity: &str) -> AuthResult<TokenPair> {
        self.sign_at(identity, Utc::now())
    }

    fn sign_at(&self, identity: &str, now: DateTime<Utc>) -> AuthResult<TokenPair> {
        let key = self.encoding_key()?;
        let identity = Some(identity.to_string()).filter(|i| !i.is_empty());

        let access_expires_at = now + self.context.access_expiration();
        let refresh_expires_at = now + self.context.refresh_expiration();

        let access = TokenClaims::new(TokenType::Access, identity.clone(), now, access_expires_at);
        let refresh = TokenClaims::new(TokenType::Refresh, identity, now, refresh_expires_at);

        let identity_key = self.context.identity_key();
        let access_token = encode_claims(&access.to_map(identity_key), &key).map_err(|e| {
            AuthError::SigningFailed {
                which: "access",
                reason: e.to_string(),
            }
        })?;
        let refresh_token = encode_claims(&refresh.to_map(identity_key), &key).map_err(|e| {
            AuthError::SigningFailed {
                which: "refresh",
                reason: e.to_string(),
            }
        })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// Signs an arbitrary claim set with the access lifetime
    ///
    /// `nbf`, `iat` and `exp` are filled in when absent. No `token_type` is
    /// added, so the result is rejected by every type-checked parse path.
    ///
    /// # Errors
    ///
    /// Same as [`TokenIssuer::sign`].
    pub fn sign_with_claims(&self, custom: ClaimMap) -> AuthResult<(String, DateTime<Utc>)> {
        let key = self.encoding_key()?;

        let now = Utc::now();
        let expires_at = now + self.context.access_expiration();

        let mut claims = custom;
        claims
            .entry("nbf")
            .or_insert_with(|| Value::from(now.timestamp()));
        claims
            .entry("iat")
            .or_insert_with(|| Value::from(now.timestamp()));
        claims
            .entry("exp")
            .or_insert_with(|| Value::from(expires_at.timestamp()));

        let token = encode_claims(&claims, &key).map_err(|e| AuthError::SigningFailed {
            which: "custom",
            reason: e.to_string(),
        })?;

        Ok((token, expires_at))
    }

    fn encoding_key(&self) -> AuthResult<EncodingKey> {
        if !self.context.has_secret() {
            return Err(AuthError::MissingSecret);
        }
        Ok(EncodingKey::from_secret(self.context.secret()))
    }
}

fn encode_claims(claims: &ClaimMap, key: &EncodingKey) -> jsonwebtoken::errors::Result<String> {
    encode(&Header::new(Algorithm::HS256), claims, key)
}
