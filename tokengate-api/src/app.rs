/// Application state and router builder
///
/// This module is the composition root: it turns [`Config`] into one
/// immutable signing context, builds the issuer and parser over it and mounts
/// the authentication middleware on the router.
///
/// # Example
///
/// ```no_run
/// use tokengate_api::{app::AppState, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(config)?;
/// let app = tokengate_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokengate_shared::auth::{
    issuer::TokenIssuer,
    middleware::{create_access_middleware, create_refresh_middleware},
    parser::TokenParser,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Signs token pairs
    pub issuer: Arc<TokenIssuer>,

    /// Verifies tokens
    pub parser: Arc<TokenParser>,
}

impl AppState {
    /// Creates new application state
    ///
    /// # Errors
    ///
    /// Returns an error if a configured lifetime does not fit a signed
    /// duration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let context = Arc::new(config.signing_context()?);

        Ok(Self {
            config: Arc::new(config),
            issuer: Arc::new(TokenIssuer::new(context.clone())),
            parser: Arc::new(TokenParser::new(context)),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                   # Health check (public via skip paths)
/// └── /v1/auth/
///     ├── GET  /whoami          # Access token required
///     └── POST /refresh         # Refresh token required
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (access or refresh, per route group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Everything here goes through the access middleware; /health passes
    // because it is on the skip list
    let access_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/v1/auth/whoami", get(routes::auth::whoami))
        .layer(middleware::from_fn(create_access_middleware(
            state.parser.clone(),
        )));

    let refresh_routes = Router::new()
        .route("/v1/auth/refresh", post(routes::auth::refresh))
        .layer(middleware::from_fn(create_refresh_middleware(
            state.parser.clone(),
        )));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(access_routes)
        .merge(refresh_routes)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
