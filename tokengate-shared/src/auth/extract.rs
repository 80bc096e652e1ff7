/// Bearer token extraction
///
/// [`BearerSource`] is the seam between transports and the parser. Two
/// adapters implement it:
///
/// - [`HttpCall`]: reads `Authorization: Bearer <token>` from HTTP headers and
///   reports the request path so skip patterns can apply
/// - [`RpcCall`]: reads the bearer credential from gRPC call metadata; it has
///   no path, so RPC calls are never skipped
///
/// # Example
///
/// ```
/// use axum::http::Request;
/// use tokengate_shared::auth::extract::{BearerSource, HttpCall};
///
/// let req = Request::builder()
///     .uri("/api/v1/users")
///     .header("Authorization", "Bearer abc.def.ghi")
///     .body(())
///     .unwrap();
///
/// let call = HttpCall::from_request(&req);
/// assert_eq!(call.request_path(), Some("/api/v1/users"));
/// assert_eq!(call.extract_bearer_token().unwrap(), "abc.def.ghi");
/// ```

use axum::http::{header, request::Parts, HeaderMap, Request};
use tonic::metadata::MetadataMap;

use super::error::{AuthError, AuthResult};

const BEARER_SCHEME: &str = "Bearer";

/// Anything that can supply a raw bearer token
pub trait BearerSource {
    /// Returns the raw token string
    fn extract_bearer_token(&self) -> AuthResult<String>;

    /// Path of the inbound request, when the transport has one
    fn request_path(&self) -> Option<&str> {
        None
    }
}

impl<T: BearerSource + ?Sized> BearerSource for &T {
    fn extract_bearer_token(&self) -> AuthResult<String> {
        (**self).extract_bearer_token()
    }

    fn request_path(&self) -> Option<&str> {
        (**self).request_path()
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP-style call: headers plus request path
#[derive(Debug, Clone, Copy)]
pub struct HttpCall<'a> {
    headers: &'a HeaderMap,
    path: &'a str,
}

impl<'a> HttpCall<'a> {
    pub fn new(headers: &'a HeaderMap, path: &'a str) -> Self {
        Self { headers, path }
    }

    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        Self::new(req.headers(), req.uri().path())
    }

    pub fn from_parts(parts: &'a Parts) -> Self {
        Self::new(&parts.headers, parts.uri.path())
    }
}

impl BearerSource for HttpCall<'_> {
    fn extract_bearer_token(&self) -> AuthResult<String> {
        let value = match self.headers.get(header::AUTHORIZATION) {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AuthError::EmptyAuthHeader),
        };

        let value = value.to_str().map_err(|_| AuthError::MalformedAuthHeader)?;
        parse_authorization_header(value)
    }

    fn request_path(&self) -> Option<&str> {
        Some(self.path)
    }
}

/// Parses an `Authorization` header value of the form `Bearer <token>`
///
/// The scheme is case-sensitive and exactly one token segment must follow
/// it.
///
/// # Errors
///
/// `AuthError::MalformedAuthHeader` for any other shape, including a bare
/// `Bearer ` with no token.
pub fn parse_authorization_header(value: &str) -> AuthResult<String> {
    let rest = value
        .strip_prefix(BEARER_SCHEME)
        .ok_or(AuthError::MalformedAuthHeader)?;

    if !rest.starts_with(char::is_whitespace) {
        return Err(AuthError::MalformedAuthHeader);
    }

    let mut segments = rest.split_whitespace();
    let token = segments.next().ok_or(AuthError::MalformedAuthHeader)?;
    if segments.next().is_some() {
        return Err(AuthError::MalformedAuthHeader);
    }

    Ok(token.to_string())
}

// ============================================================================
// RPC
// ============================================================================

/// RPC-style call: gRPC metadata only
#[derive(Debug, Clone, Copy)]
pub struct RpcCall<'a> {
    metadata: &'a MetadataMap,
}

impl<'a> RpcCall<'a> {
    pub fn new(metadata: &'a MetadataMap) -> Self {
        Self { metadata }
    }

    pub fn from_request<T>(req: &'a tonic::Request<T>) -> Self {
        Self::new(req.metadata())
    }
}

impl BearerSource for RpcCall<'_> {
    /// Follows the usual gRPC auth convention: an `authorization` entry of
    /// the form `<scheme> <token>` with a case-insensitive `bearer` scheme.
    /// The token itself may be empty; the parser rejects it.
    fn extract_bearer_token(&self) -> AuthResult<String> {
        let value = self
            .metadata
            .get(header::AUTHORIZATION.as_str())
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| unauthenticated("Request unauthenticated with bearer"))?;

        let (scheme, token) = value
            .split_once(' ')
            .ok_or_else(|| unauthenticated("Bad authorization string"))?;

        if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
            return Err(unauthenticated("Request unauthenticated with bearer"));
        }

        Ok(token.to_string())
    }
}

fn unauthenticated(message: &str) -> AuthError {
    AuthError::Unauthenticated(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::error::ErrorKind;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        map
    }

    fn metadata(value: &'static str) -> MetadataMap {
        let mut map = MetadataMap::new();
        map.insert("authorization", value.parse().unwrap());
        map
    }

    #[test]
    fn test_parse_authorization_header() {
        assert_eq!(parse_authorization_header("Bearer abc"), Ok("abc".to_string()));
        assert_eq!(parse_authorization_header("Bearer   abc  "), Ok("abc".to_string()));

        for bad in ["Bearer", "Bearer ", "Bearerabc", "bearer abc", "Basic abc", "Bearer a b", ""] {
            assert_eq!(
                parse_authorization_header(bad),
                Err(AuthError::MalformedAuthHeader),
                "header {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_http_missing_header() {
        let empty = HeaderMap::new();
        let call = HttpCall::new(&empty, "/");
        assert_eq!(call.extract_bearer_token(), Err(AuthError::EmptyAuthHeader));

        let blank = headers("");
        let call = HttpCall::new(&blank, "/");
        assert_eq!(call.extract_bearer_token(), Err(AuthError::EmptyAuthHeader));
    }

    #[test]
    fn test_http_extract() {
        let map = headers("Bearer token-value");
        let call = HttpCall::new(&map, "/api/v1/users");
        assert_eq!(call.extract_bearer_token(), Ok("token-value".to_string()));
        assert_eq!(call.request_path(), Some("/api/v1/users"));

        let map = headers("Bearer ");
        let call = HttpCall::new(&map, "/");
        assert_eq!(
            call.extract_bearer_token().unwrap_err().kind(),
            ErrorKind::MalformedInput
        );
    }

    #[test]
    fn test_http_from_parts() {
        let (parts, _) = Request::builder()
            .uri("/admin/users?page=2")
            .header("authorization", "Bearer xyz")
            .body(())
            .unwrap()
            .into_parts();

        let call = HttpCall::from_parts(&parts);
        assert_eq!(call.request_path(), Some("/admin/users"));
        assert_eq!(call.extract_bearer_token(), Ok("xyz".to_string()));
    }

    #[test]
    fn test_rpc_extract() {
        let map = metadata("Bearer token-value");
        let call = RpcCall::new(&map);
        assert_eq!(call.extract_bearer_token(), Ok("token-value".to_string()));
        assert_eq!(call.request_path(), None);

        let map = metadata("bearer token-value");
        assert_eq!(
            RpcCall::new(&map).extract_bearer_token(),
            Ok("token-value".to_string())
        );

        // empty credential is passed through for the parser to reject
        let map = metadata("Bearer ");
        assert_eq!(RpcCall::new(&map).extract_bearer_token(), Ok(String::new()));
    }

    #[test]
    fn test_rpc_extract_failures() {
        let empty = MetadataMap::new();
        let err = RpcCall::new(&empty).extract_bearer_token().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(
            err.to_string(),
            "invalid auth token: Request unauthenticated with bearer"
        );

        let map = metadata("Bearer");
        assert_eq!(
            RpcCall::new(&map).extract_bearer_token(),
            Err(AuthError::Unauthenticated("Bad authorization string".into()))
        );

        let map = metadata("Basic dXNlcjpwYXNz");
        assert_eq!(
            RpcCall::new(&map).extract_bearer_token().unwrap_err().kind(),
            ErrorKind::Transport
        );
    }

    #[test]
    fn test_rpc_from_request() {
        let mut req = tonic::Request::new(());
        req.metadata_mut()
            .insert("authorization", "Bearer abc".parse().unwrap());
        assert_eq!(
            RpcCall::from_request(&req).extract_bearer_token(),
            Ok("abc".to_string())
        );
    }
}
