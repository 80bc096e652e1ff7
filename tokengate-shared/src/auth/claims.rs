/// Token claim types
///
/// Tokens carry a flat JSON claim object. The identity claim's name is
/// chosen at configuration time, so claims are assembled into a
/// [`ClaimMap`] rather than serialized from a fixed struct.
///
/// # Claim Layout
///
/// - `token_type`: `"access"` or `"refresh"`
/// - `iat`, `nbf`: issue time (Unix seconds)
/// - `exp`: expiration time (Unix seconds)
/// - `<identity key>`: caller identity, present only when an identity key is
///   configured and a non-empty identity was given

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::error::AuthError;

/// Raw claim object of a token
pub type ClaimMap = Map<String, Value>;

/// Name of the claim that discriminates access and refresh tokens
pub const TOKEN_TYPE_CLAIM: &str = "token_type";

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token that authorizes resource access
    Access,

    /// Long-lived token that may only be exchanged for a new pair
    Refresh,
}

impl TokenType {
    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }

    /// Error returned when a token of another type is presented where
    /// this type is required
    pub fn mismatch_error(&self) -> AuthError {
        match self {
            TokenType::Access => AuthError::NotAccessToken,
            TokenType::Refresh => AuthError::NotRefreshToken,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenType::Access),
            "refresh" => Ok(TokenType::Refresh),
            _ => Err(AuthError::InvalidTokenType),
        }
    }
}

/// Claims of a token produced by the issuer's primary path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub token_type: TokenType,

    /// Caller identity, written under the configured identity key
    pub identity: Option<String>,

    /// Issued at (Unix timestamp)
    pub issued_at: i64,

    /// Not before (Unix timestamp)
    pub not_before: i64,

    /// Expiration time (Unix timestamp)
    pub expires_at: i64,
}

impl TokenClaims {
    /// Creates claims issued at `now` that expire at `expires_at`
    pub fn new(
        token_type: TokenType,
        identity: Option<String>,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token_type,
            identity,
            issued_at: now.timestamp(),
            not_before: now.timestamp(),
            expires_at: expires_at.timestamp(),
        }
    }

    /// Builds the JSON claim object
    ///
    /// The identity is only written when `identity_key` is set and the
    /// identity is non-empty.
    pub fn to_map(&self, identity_key: Option<&str>) -> ClaimMap {
        let mut map = ClaimMap::new();
        map.insert(
            TOKEN_TYPE_CLAIM.to_string(),
            Value::String(self.token_type.as_str().to_string()),
        );
        map.insert("nbf".to_string(), Value::from(self.not_before));
        map.insert("iat".to_string(), Value::from(self.issued_at));
        map.insert("exp".to_string(), Value::from(self.expires_at));

        if let (Some(key), Some(identity)) = (identity_key, self.identity.as_deref()) {
            if !key.is_empty() && !identity.is_empty() {
                map.insert(key.to_string(), Value::String(identity.to_string()));
            }
        }

        map
    }
}

/// Reads the `token_type` claim
///
/// # Errors
///
/// - `AuthError::MissingTokenType` if the claim is absent
/// - `AuthError::InvalidTokenType` if it is not `"access"` or `"refresh"`
pub fn token_type_of(claims: &ClaimMap) -> Result<TokenType, AuthError> {
    match claims.get(TOKEN_TYPE_CLAIM) {
        None => Err(AuthError::MissingTokenType),
        Some(Value::String(s)) => s.parse(),
        Some(_) => Err(AuthError::InvalidTokenType),
    }
}

/// Reads the identity claim stored under `identity_key`
///
/// Returns an empty string when no identity key is configured.
///
/// # Errors
///
/// - `AuthError::MissingIdentity` if the claim is absent
/// - `AuthError::InvalidIdentity` if it is not a non-empty string
pub fn identity_of(claims: &ClaimMap, identity_key: Option<&str>) -> Result<String, AuthError> {
    let key = match identity_key {
        Some(key) if !key.is_empty() => key,
        _ => return Ok(String::new()),
    };

    match claims.get(key) {
        None => Err(AuthError::MissingIdentity),
        Some(Value::String(identity)) if !identity.is_empty() => Ok(identity.clone()),
        Some(_) => Err(AuthError::InvalidIdentity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_token_type_parse() {
        assert_eq!("access".parse::<TokenType>().unwrap(), TokenType::Access);
        assert_eq!("refresh".parse::<TokenType>().unwrap(), TokenType::Refresh);
        assert_eq!(
            "Access".parse::<TokenType>().unwrap_err(),
            AuthError::InvalidTokenType
        );
        assert_eq!(TokenType::Refresh.to_string(), "refresh");
    }

    #[test]
    fn test_to_map_with_identity() {
        let now = Utc::now();
        let claims = TokenClaims::new(
            TokenType::Access,
            Some("user-42".to_string()),
            now,
            now + Duration::hours(2),
        );

        let map = claims.to_map(Some("sub"));
        assert_eq!(map["token_type"], json!("access"));
        assert_eq!(map["sub"], json!("user-42"));
        assert_eq!(map["iat"], map["nbf"]);
        assert_eq!(map["exp"], json!(now.timestamp() + 7200));
    }

    #[test]
    fn test_to_map_omits_identity() {
        let now = Utc::now();
        let with_empty = TokenClaims::new(TokenType::Refresh, Some(String::new()), now, now);
        assert!(!with_empty.to_map(Some("sub")).contains_key("sub"));

        let without_key = TokenClaims::new(TokenType::Refresh, Some("u".into()), now, now);
        let map = without_key.to_map(None);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_token_type_of() {
        let map = json!({ "token_type": "refresh" });
        assert_eq!(token_type_of(map.as_object().unwrap()), Ok(TokenType::Refresh));

        let missing = json!({ "sub": "x" });
        assert_eq!(
            token_type_of(missing.as_object().unwrap()),
            Err(AuthError::MissingTokenType)
        );

        let numeric = json!({ "token_type": 1 });
        assert_eq!(
            token_type_of(numeric.as_object().unwrap()),
            Err(AuthError::InvalidTokenType)
        );
    }

    #[test]
    fn test_identity_of() {
        let map = json!({ "sub": "user-42", "n": 7, "e": "" });
        let map = map.as_object().unwrap();

        assert_eq!(identity_of(map, Some("sub")), Ok("user-42".to_string()));
        assert_eq!(identity_of(map, None), Ok(String::new()));
        assert_eq!(identity_of(map, Some("uid")), Err(AuthError::MissingIdentity));
        assert_eq!(identity_of(map, Some("n")), Err(AuthError::InvalidIdentity));
        assert_eq!(identity_of(map, Some("e")), Err(AuthError::InvalidIdentity));
    }
}
