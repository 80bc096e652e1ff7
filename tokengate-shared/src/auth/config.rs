/// Signing configuration
///
/// [`SigningContext`] holds everything the issuer and parser need: the HMAC
/// secret, the identity claim name, both token lifetimes and the skip-path
/// patterns. It is immutable once built; the composition root builds one and
/// hands an `Arc` of it to [`TokenIssuer`](super::issuer::TokenIssuer) and
/// [`TokenParser`](super::parser::TokenParser).
///
/// For code that cannot thread the context through, this module also keeps a
/// process-wide store guarded by a one-time latch: the first [`init`] commits
/// its values and every later call is ignored until [`reset`].
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use tokengate_shared::auth::config::{with_identity_key, with_skip_paths, SigningContext};
///
/// let ctx = SigningContext::new("s3cr3t!!", Duration::hours(2), Duration::hours(168))
///     .with_options([with_identity_key("sub"), with_skip_paths(["/health", "/admin/*"])]);
///
/// assert!(ctx.is_identity_required());
/// assert!(ctx.is_path_skipped("/admin/users"));
/// ```

use chrono::Duration;
use std::fmt;
use std::sync::{Arc, RwLock};

use super::path::should_skip_path;

/// Default access token lifetime (2 hours)
pub const DEFAULT_ACCESS_EXPIRATION_SECS: i64 = 2 * 60 * 60;

/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_EXPIRATION_SECS: i64 = 7 * 24 * 60 * 60;

/// Health, readiness and metrics paths added by [`with_common_skip_paths`]
pub const COMMON_SKIP_PATHS: &[&str] = &[
    "/health",
    "/healthz",
    "/health/*",
    "/ready",
    "/readiness",
    "/live",
    "/liveness",
    "/metrics",
    "/prometheus",
    "/status",
    "/ping",
    "/version",
    "/info",
    "/favicon.ico",
    "/robots.txt",
];

/// Optional setting applied on top of the secret and lifetimes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningOption {
    /// Claim name carrying the identity; empty disables identity extraction
    IdentityKey(String),

    /// Patterns appended to the skip list
    SkipPaths(Vec<String>),

    /// Appends [`COMMON_SKIP_PATHS`]
    CommonSkipPaths,
}

/// Sets the identity claim name
pub fn with_identity_key(key: impl Into<String>) -> SigningOption {
    SigningOption::IdentityKey(key.into())
}

/// Appends exact or wildcard skip-path patterns
pub fn with_skip_paths<I, S>(paths: I) -> SigningOption
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SigningOption::SkipPaths(paths.into_iter().map(Into::into).collect())
}

/// Appends the common health/metrics skip paths
pub fn with_common_skip_paths() -> SigningOption {
    SigningOption::CommonSkipPaths
}

/// Immutable signing configuration
#[derive(Clone, PartialEq, Eq)]
pub struct SigningContext {
    secret: Vec<u8>,
    identity_key: Option<String>,
    access_expiration: Duration,
    refresh_expiration: Duration,
    skip_paths: Vec<String>,
}

impl SigningContext {
    /// Creates a context with the given secret and lifetimes
    ///
    /// Lifetimes are taken as given, so a negative lifetime yields tokens
    /// that are already expired. An empty secret leaves signing unconfigured.
    pub fn new(secret: impl AsRef<[u8]>, access: Duration, refresh: Duration) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            access_expiration: access,
            refresh_expiration: refresh,
            ..Self::default()
        }
    }

    /// Applies one option
    pub fn with_option(mut self, option: SigningOption) -> Self {
        match option {
            SigningOption::IdentityKey(key) => {
                self.identity_key = if key.is_empty() { None } else { Some(key) };
            }
            SigningOption::SkipPaths(paths) => self.skip_paths.extend(paths),
            SigningOption::CommonSkipPaths => self
                .skip_paths
                .extend(COMMON_SKIP_PATHS.iter().map(|p| p.to_string())),
        }
        self
    }

    /// Applies options in order
    pub fn with_options(self, options: impl IntoIterator<Item = SigningOption>) -> Self {
        options.into_iter().fold(self, Self::with_option)
    }

    /// The HMAC secret; empty when unset
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Claim name the identity is stored under, if any
    pub fn identity_key(&self) -> Option<&str> {
        self.identity_key.as_deref()
    }

    /// Whether tokens must carry an identity claim
    pub fn is_identity_required(&self) -> bool {
        self.identity_key.is_some()
    }

    pub fn access_expiration(&self) -> Duration {
        self.access_expiration
    }

    pub fn refresh_expiration(&self) -> Duration {
        self.refresh_expiration
    }

    /// Copy of the skip-path patterns
    pub fn skip_paths(&self) -> Vec<String> {
        self.skip_paths.clone()
    }

    pub(crate) fn skip_patterns(&self) -> &[String] {
        &self.skip_paths
    }

    /// Whether `path` is exempt from authentication
    pub fn is_path_skipped(&self, path: &str) -> bool {
        should_skip_path(path, &self.skip_paths)
    }
}

impl Default for SigningContext {
    fn default() -> Self {
        Self {
            secret: Vec::new(),
            identity_key: None,
            access_expiration: Duration::seconds(DEFAULT_ACCESS_EXPIRATION_SECS),
            refresh_expiration: Duration::seconds(DEFAULT_REFRESH_EXPIRATION_SECS),
            skip_paths: Vec::new(),
        }
    }
}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("secret", &"<redacted>")
            .field("identity_key", &self.identity_key)
            .field("access_expiration", &self.access_expiration)
            .field("refresh_expiration", &self.refresh_expiration)
            .field("skip_paths", &self.skip_paths)
            .finish()
    }
}

// ============================================================================
// Process-wide store
// ============================================================================

static STORE: RwLock<Option<Arc<SigningContext>>> = RwLock::new(None);

/// Commits the process-wide signing context
///
/// Only the first call after process start (or after [`reset`]) has any
/// effect; later calls are ignored and return `false`. Non-positive
/// lifetimes and an empty secret keep their defaults.
pub fn init(
    secret: impl AsRef<[u8]>,
    access: Duration,
    refresh: Duration,
    options: impl IntoIterator<Item = SigningOption>,
) -> bool {
    let mut guard = STORE.write().unwrap_or_else(|e| e.into_inner());
    if guard.is_some() {
        tracing::debug!("signing context already initialized, ignoring init");
        return false;
    }

    let defaults = SigningContext::default();
    let access = if access > Duration::zero() {
        access
    } else {
        defaults.access_expiration
    };
    let refresh = if refresh > Duration::zero() {
        refresh
    } else {
        defaults.refresh_expiration
    };

    let context = SigningContext::new(secret, access, refresh).with_options(options);
    tracing::debug!(
        identity_required = context.is_identity_required(),
        skip_paths = context.skip_paths.len(),
        "signing context initialized"
    );

    *guard = Some(Arc::new(context));
    true
}

/// Reopens the latch and restores defaults
///
/// Intended for tests.
pub fn reset() {
    let mut guard = STORE.write().unwrap_or_else(|e| e.into_inner());
    *guard = None;
}

/// The current process-wide context, or defaults if nothing is committed
pub fn current() -> Arc<SigningContext> {
    let guard = STORE.read().unwrap_or_else(|e| e.into_inner());
    match guard.as_ref() {
        Some(context) => Arc::clone(context),
        None => Arc::new(SigningContext::default()),
    }
}

pub fn get_access_expiration() -> Duration {
    current().access_expiration()
}

pub fn get_refresh_expiration() -> Duration {
    current().refresh_expiration()
}

pub fn is_identity_required() -> bool {
    current().is_identity_required()
}

pub fn get_skip_paths() -> Vec<String> {
    current().skip_paths()
}

pub fn is_path_skipped(path: &str) -> bool {
    current().is_path_skipped(path)
}

/// Serializes tests that touch the process-wide store
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
