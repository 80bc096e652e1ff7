/// Token endpoints
///
/// # Endpoints
///
/// - `GET /v1/auth/whoami` - Echo the verified identity (access token)
/// - `POST /v1/auth/refresh` - Trade a refresh token for a new pair

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tokengate_shared::auth::{claims::TokenType, middleware::AuthContext};

/// Refresh response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token
    pub access_token: String,

    /// New refresh token
    pub refresh_token: String,

    /// Access token expiry (unix seconds)
    pub expire_at: i64,

    /// Refresh token expiry (unix seconds)
    pub refresh_expire_at: i64,
}

/// Whoami response
#[derive(Debug, Serialize, Deserialize)]
pub struct WhoamiResponse {
    /// Identity carried by the access token
    pub identity: String,

    /// Always `access`
    pub token_type: TokenType,
}

/// Refresh endpoint
///
/// Mounted behind the refresh middleware, so only a valid refresh token gets
/// here. Issues a fresh pair for the same identity.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/refresh
/// Authorization: Bearer <refresh token>
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "refresh_token": "eyJ...",
///   "expire_at": 1700007200,
///   "refresh_expire_at": 1700604800
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing, invalid or non-refresh token
/// - `500 Internal Server Error`: Signing failed
pub async fn refresh(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<RefreshResponse>> {
    let pair = state.issuer.sign(&auth.identity).map_err(|e| {
        tracing::error!(error = %e, "Failed to sign refreshed token pair");
        ApiError::InternalError(e.to_string())
    })?;

    tracing::debug!(identity = %auth.identity, "Issued refreshed token pair");

    Ok(Json(RefreshResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expire_at: pair.access_expires_at.timestamp(),
        refresh_expire_at: pair.refresh_expires_at.timestamp(),
    }))
}

/// Whoami endpoint
pub async fn whoami(auth: AuthContext) -> Json<WhoamiResponse> {
    Json(WhoamiResponse {
        identity: auth.identity,
        token_type: auth.token_type,
    })
}
