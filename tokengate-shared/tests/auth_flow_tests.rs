/// Integration tests for the process-wide authentication flow
///
/// These go through `config::init` and the `from_global` constructors, so
/// every test holds `STORE_LOCK` while it touches the store.

use axum::http::{HeaderMap, HeaderValue};
use chrono::Duration;
use std::sync::Mutex;
use tokengate_shared::auth::config::{self, with_identity_key, with_skip_paths};
use tokengate_shared::auth::extract::HttpCall;
use tokengate_shared::auth::{ErrorKind, TokenIssuer, TokenParser, TokenType};

static STORE_LOCK: Mutex<()> = Mutex::new(());

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "authorization",
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

#[test]
fn test_sign_and_parse_through_global_store() {
    let _guard = STORE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    config::reset();
    assert!(config::init(
        "s3cr3t!!",
        Duration::hours(2),
        Duration::hours(168),
        [with_identity_key("sub")],
    ));

    let pair = TokenIssuer::from_global().sign("user-42").unwrap();
    let parser = TokenParser::from_global();

    assert_eq!(
        parser.parse_identity(&pair.access_token, b"s3cr3t!!").unwrap(),
        "user-42"
    );
    assert_eq!(
        parser.get_token_type(&pair.access_token).unwrap(),
        TokenType::Access
    );
    assert_eq!(
        parser.get_token_type(&pair.refresh_token).unwrap(),
        TokenType::Refresh
    );
    assert_eq!(
        parser
            .parse_refresh_token(&pair.access_token)
            .unwrap_err()
            .kind(),
        ErrorKind::TypeMismatch
    );
    assert_eq!(
        parser.parse_refresh_token(&pair.refresh_token).unwrap(),
        "user-42"
    );

    config::reset();
}

#[test]
fn test_http_request_through_global_store() {
    let _guard = STORE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    config::reset();
    config::init(
        "s3cr3t!!",
        Duration::hours(2),
        Duration::hours(168),
        [with_identity_key("sub"), with_skip_paths(["/health"])],
    );

    let pair = TokenIssuer::from_global().sign("user-42").unwrap();
    let parser = TokenParser::from_global();

    let headers = bearer(&pair.access_token);
    let call = HttpCall::new(&headers, "/api/v1/users");
    assert_eq!(parser.parse_request(&call).unwrap(), "user-42");

    let headers = bearer(&pair.refresh_token);
    let call = HttpCall::new(&headers, "/api/v1/users");
    assert_eq!(
        parser.parse_request(&call).unwrap_err().kind(),
        ErrorKind::TypeMismatch
    );

    let empty = HeaderMap::new();
    let call = HttpCall::new(&empty, "/health");
    assert_eq!(parser.parse_request(&call).unwrap(), "");

    config::reset();
}

#[test]
fn test_second_init_keeps_first_secret() {
    let _guard = STORE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    config::reset();

    assert!(config::init(
        "first-secret",
        Duration::hours(2),
        Duration::hours(168),
        [with_identity_key("sub")],
    ));
    assert!(!config::init(
        "second-secret",
        Duration::hours(1),
        Duration::hours(24),
        [],
    ));

    let pair = TokenIssuer::from_global().sign("user-42").unwrap();
    let parser = TokenParser::from_global();
    assert!(parser.parse_identity(&pair.access_token, b"first-secret").is_ok());
    assert_eq!(
        parser
            .parse_identity(&pair.access_token, b"second-secret")
            .unwrap_err()
            .kind(),
        ErrorKind::Signature
    );
    assert_eq!(config::get_access_expiration(), Duration::hours(2));

    config::reset();
    assert!(config::init(
        "second-secret",
        Duration::hours(1),
        Duration::hours(24),
        [],
    ));
    assert_eq!(config::get_access_expiration(), Duration::hours(1));
    assert!(!config::is_identity_required());

    config::reset();
}

#[test]
fn test_sign_without_init_is_configuration_error() {
    let _guard = STORE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    config::reset();

    let err = TokenIssuer::from_global().sign("user-42").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
