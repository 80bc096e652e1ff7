/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `JWT_SECRET`: Secret key for token signing (required)
/// - `JWT_ACCESS_EXPIRATION`: Access token lifetime, e.g. `2h` (default: 2h)
/// - `JWT_REFRESH_EXPIRATION`: Refresh token lifetime (default: 168h)
/// - `JWT_IDENTITY_KEY`: Claim carrying the identity (default: sub)
/// - `AUTH_SKIP_PATHS`: Comma-separated paths exempt from authentication
/// - `AUTH_COMMON_SKIP_PATHS`: Also skip health/metrics paths (default: true)
/// - `RUST_LOG`: Log level (default: info)
///
/// # Example
///
/// ```no_run
/// use tokengate_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}:{}", config.api.host, config.api.port);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tokengate_shared::auth::config::{
    with_common_skip_paths, with_identity_key, with_skip_paths, SigningContext, SigningOption,
};

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_SECRET_LENGTH: usize = 6;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Authentication bypass configuration
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` is permissive
    pub cors_origins: Vec<String>,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// IMPORTANT: This must be kept secret.
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    /// Access token lifetime
    pub access_expiration: Duration,

    /// Refresh token lifetime
    pub refresh_expiration: Duration,

    /// Claim name carrying the identity; empty disables identity checks
    pub identity_key: String,
}

/// Authentication bypass configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Exact or wildcard paths exempt from authentication
    pub skip_paths: Vec<String>,

    /// Whether to add the common health/metrics paths
    pub common_skip_paths: bool,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    /// - Lifetimes are inconsistent (see [`Config::validate`])
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = lookup("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()?;
        let cors_origins = lookup("API_CORS_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|| vec!["*".to_string()]);

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        let access_expiration = parse_duration(
            "JWT_ACCESS_EXPIRATION",
            lookup("JWT_ACCESS_EXPIRATION").as_deref().unwrap_or("2h"),
        )?;
        let refresh_expiration = parse_duration(
            "JWT_REFRESH_EXPIRATION",
            lookup("JWT_REFRESH_EXPIRATION").as_deref().unwrap_or("168h"),
        )?;
        let identity_key = lookup("JWT_IDENTITY_KEY").unwrap_or_else(|| "sub".to_string());

        let skip_paths = lookup("AUTH_SKIP_PATHS")
            .map(|v| split_list(&v))
            .unwrap_or_default();
        let common_skip_paths = match lookup("AUTH_COMMON_SKIP_PATHS") {
            Some(v) => v.parse::<bool>().map_err(|_| {
                anyhow::anyhow!("AUTH_COMMON_SKIP_PATHS must be true or false, got {:?}", v)
            })?,
            None => true,
        };

        let config = Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_expiration,
                refresh_expiration,
                identity_key,
            },
            auth: AuthConfig {
                skip_paths,
                common_skip_paths,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks secret length and token lifetimes
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_SECRET_LENGTH
            );
        }
        if self.jwt.access_expiration.is_zero() {
            anyhow::bail!("JWT_ACCESS_EXPIRATION must be positive");
        }
        if self.jwt.refresh_expiration.is_zero() {
            anyhow::bail!("JWT_REFRESH_EXPIRATION must be positive");
        }
        if self.jwt.refresh_expiration < self.jwt.access_expiration {
            anyhow::bail!(
                "JWT_REFRESH_EXPIRATION must be greater than or equal to JWT_ACCESS_EXPIRATION"
            );
        }
        Ok(())
    }

    /// Builds the immutable signing context shared by issuer and parser
    pub fn signing_context(&self) -> anyhow::Result<SigningContext> {
        let access = chrono::Duration::from_std(self.jwt.access_expiration)?;
        let refresh = chrono::Duration::from_std(self.jwt.refresh_expiration)?;

        let mut options: Vec<SigningOption> = vec![
            with_identity_key(self.jwt.identity_key.clone()),
            with_skip_paths(self.auth.skip_paths.iter().cloned()),
        ];
        if self.auth.common_skip_paths {
            options.push(with_common_skip_paths());
        }

        Ok(SigningContext::new(&self.jwt.secret, access, refresh).with_options(options))
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_duration(name: &str, value: &str) -> anyhow::Result<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| anyhow::anyhow!("{} is not a valid duration ({:?}): {}", name, value, e))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
