/// Authentication interceptor for tonic
///
/// [`AuthInterceptor`] runs the access-token check over gRPC call metadata
/// and attaches an [`AuthContext`] to the request extensions. Handlers read it
/// back through [`AuthContextExt`].
///
/// All credential failures map to `Status::unauthenticated`; a missing
/// signing secret maps to `Status::internal`.
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use std::sync::Arc;
/// use tokengate_shared::auth::config::SigningContext;
/// use tokengate_shared::auth::grpc::{AuthContextExt, AuthInterceptor};
/// use tokengate_shared::auth::parser::TokenParser;
/// use tonic::{Request, Status};
///
/// let ctx = SigningContext::new("your-jwt-secret", Duration::hours(2), Duration::hours(168));
/// let interceptor = AuthInterceptor::new(Arc::new(TokenParser::new(Arc::new(ctx))));
///
/// fn handler(request: Request<()>) -> Result<String, Status> {
///     Ok(request.auth_context()?.identity.clone())
/// }
/// ```

use std::sync::Arc;
use tonic::service::Interceptor;
use tonic::{Request, Status};

use super::claims::TokenType;
use super::error::{AuthError, ErrorKind};
use super::extract::RpcCall;
use super::middleware::AuthContext;
use super::parser::TokenParser;

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        match err.kind() {
            ErrorKind::Configuration => Status::internal("authentication is not configured"),
            _ => Status::unauthenticated(err.to_string()),
        }
    }
}

/// Server-side interceptor that accepts access tokens only
#[derive(Debug, Clone)]
pub struct AuthInterceptor {
    parser: Arc<TokenParser>,
}

impl AuthInterceptor {
    pub fn new(parser: Arc<TokenParser>) -> Self {
        Self { parser }
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let identity = self
            .parser
            .parse_request(&RpcCall::from_request(&request))
            .map_err(|err| {
                tracing::debug!(kind = err.kind().as_str(), "rejecting call: {}", err);
                Status::from(err)
            })?;

        tracing::debug!(identity = %identity, "access token accepted");
        request
            .extensions_mut()
            .insert(AuthContext::new(identity, TokenType::Access));

        Ok(request)
    }
}

/// Access to the [`AuthContext`] attached by [`AuthInterceptor`]
pub trait AuthContextExt {
    fn auth_context(&self) -> Result<&AuthContext, Status>;
}

impl<T> AuthContextExt for Request<T> {
    fn auth_context(&self) -> Result<&AuthContext, Status> {
        self.extensions()
            .get::<AuthContext>()
            .ok_or_else(|| Status::unauthenticated("missing authentication context"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::config::{with_identity_key, with_skip_paths, SigningContext};
    use crate::auth::issuer::{TokenIssuer, TokenPair};
    use chrono::Duration;
    use tonic::Code;

    fn setup() -> (AuthInterceptor, TokenPair) {
        let ctx = Arc::new(
            SigningContext::new("grpc-secret", Duration::hours(2), Duration::hours(168))
                .with_options([with_identity_key("sub"), with_skip_paths(["*"])]),
        );
        let pair = TokenIssuer::new(ctx.clone()).sign("user-42").unwrap();
        (AuthInterceptor::new(Arc::new(TokenParser::new(ctx))), pair)
    }

    fn request_with(authorization: &str) -> Request<()> {
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert("authorization", authorization.parse().unwrap());
        request
    }

    #[test]
    fn test_access_token_attaches_context() {
        let (mut interceptor, pair) = setup();

        let request = interceptor
            .call(request_with(&format!("Bearer {}", pair.access_token)))
            .unwrap();
        let auth = request.auth_context().unwrap();
        assert_eq!(auth.identity, "user-42");
        assert_eq!(auth.token_type, TokenType::Access);
    }

    #[test]
    fn test_refresh_token_unauthenticated() {
        let (mut interceptor, pair) = setup();

        let status = interceptor
            .call(request_with(&format!("Bearer {}", pair.refresh_token)))
            .unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
        assert_eq!(status.message(), "token is not an access token");
    }

    #[test]
    fn test_missing_metadata_not_skipped() {
        // skip patterns only apply to HTTP paths
        let (mut interceptor, _) = setup();

        let status = interceptor.call(Request::new(())).unwrap_err();
        assert_eq!(status.code(), Code::Unauthenticated);
        assert!(status.message().starts_with("invalid auth token"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(Status::from(AuthError::MissingSecret).code(), Code::Internal);
        assert_eq!(Status::from(AuthError::Expired).code(), Code::Unauthenticated);
        assert!(Request::new(()).auth_context().is_err());
    }
}
