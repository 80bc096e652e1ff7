/// Authentication middleware for Axum
///
/// Runs the token parser once per request and adds an [`AuthContext`] to the
/// request extensions.
///
/// # Middleware Types
///
/// - **Access Middleware**: accepts access tokens only; honors skip paths
/// - **Refresh Middleware**: accepts refresh tokens only; for the
///   token-refresh endpoint
///
/// Failures become an [`AuthRejection`]: `401 Unauthorized` with a JSON body,
/// or `500` when signing is not configured.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use chrono::Duration;
/// use std::sync::Arc;
/// use tokengate_shared::auth::config::SigningContext;
/// use tokengate_shared::auth::middleware::{create_access_middleware, AuthContext};
/// use tokengate_shared::auth::parser::TokenParser;
///
/// async fn protected_handler(auth: AuthContext) -> String {
///     format!("Hello, {}!", auth.identity)
/// }
///
/// let ctx = SigningContext::new("your-jwt-secret", Duration::hours(2), Duration::hours(168));
/// let parser = Arc::new(TokenParser::new(Arc::new(ctx)));
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn(create_access_middleware(parser)));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::claims::TokenType;
use super::error::{AuthError, ErrorKind};
use super::extract::{BearerSource, HttpCall};
use super::parser::TokenParser;

/// Authentication context added to request extensions
///
/// Handlers can take it as an extractor, or through `Extension`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Verified identity; empty when no identity key is configured
    pub identity: String,

    /// Type of the token that authenticated the call
    pub token_type: TokenType,
}

impl AuthContext {
    pub fn new(identity: impl Into<String>, token_type: TokenType) -> Self {
        Self {
            identity: identity.into(),
            token_type,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthRejection(AuthError::MissingAuthContext))
    }
}

/// HTTP rejection wrapping an [`AuthError`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRejection(pub AuthError);

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl AuthRejection {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(json!({
            "error": self.0.kind().as_str(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Access-token middleware
///
/// Requests whose path matches a skip pattern pass through without an
/// [`AuthContext`].
pub async fn access_auth_middleware(
    parser: Arc<TokenParser>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    if parser.context().is_path_skipped(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let identity = parser
        .parse_request_ignore_skip(&HttpCall::from_request(&req))
        .map_err(reject)?;

    tracing::debug!(identity = %identity, "access token accepted");
    req.extensions_mut()
        .insert(AuthContext::new(identity, TokenType::Access));

    Ok(next.run(req).await)
}

/// Refresh-token middleware
///
/// Skip patterns do not apply.
pub async fn refresh_auth_middleware(
    parser: Arc<TokenParser>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let token = HttpCall::from_request(&req)
        .extract_bearer_token()
        .map_err(reject)?;
    let identity = parser.parse_refresh_token(&token).map_err(reject)?;

    tracing::debug!(identity = %identity, "refresh token accepted");
    req.extensions_mut()
        .insert(AuthContext::new(identity, TokenType::Refresh));

    Ok(next.run(req).await)
}

fn reject(err: AuthError) -> AuthRejection {
    tracing::debug!(kind = err.kind().as_str(), "rejecting request: {}", err);
    AuthRejection(err)
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Result<Response, AuthRejection>> + Send>>;

/// Creates an access-token middleware closure for `middleware::from_fn`
pub fn create_access_middleware(
    parser: Arc<TokenParser>,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    move |req, next| {
        let parser = parser.clone();
        Box::pin(access_auth_middleware(parser, req, next))
    }
}

/// Creates a refresh-token middleware closure for `middleware::from_fn`
pub fn create_refresh_middleware(
    parser: Arc<TokenParser>,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    move |req, next| {
        let parser = parser.clone();
        Box::pin(refresh_auth_middleware(parser, req, next))
    }
}
