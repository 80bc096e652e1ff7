/// Common test utilities for integration tests
///
/// - Config built in memory (no environment)
/// - Router over a fresh signing context
/// - Token pair for a test identity
/// - Request helpers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::time::Duration;
use tokengate_api::app::{build_router, AppState};
use tokengate_api::config::{ApiConfig, AuthConfig, Config, JwtConfig};
use tokengate_shared::auth::issuer::TokenPair;
use tower::Service as _;

pub const TEST_IDENTITY: &str = "user-42";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
    pub tokens: TokenPair,
}

impl TestContext {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> anyhow::Result<Self> {
        let state = AppState::new(config)?;
        let tokens = state.issuer.sign(TEST_IDENTITY)?;
        let app = build_router(state.clone());

        Ok(TestContext { app, state, tokens })
    }

    /// Returns authorization header value for the access token
    pub fn access_header(&self) -> String {
        format!("Bearer {}", self.tokens.access_token)
    }

    /// Returns authorization header value for the refresh token
    pub fn refresh_header(&self) -> String {
        format!("Bearer {}", self.tokens.refresh_token)
    }

    /// Sends a request and returns status plus parsed JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        authorization: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };

        (status, json)
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_expiration: Duration::from_secs(2 * 3600),
            refresh_expiration: Duration::from_secs(168 * 3600),
            identity_key: "sub".to_string(),
        },
        auth: AuthConfig {
            skip_paths: vec!["/public/*".to_string()],
            common_skip_paths: true,
        },
    }
}
