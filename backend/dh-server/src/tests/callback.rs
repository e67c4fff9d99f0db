use crate::{ApiError, ForwardedRequest};
use crate::api::callback::{check_secret, request_id_from_url, resolve_subject};

use std::collections::HashMap;

use dh_auth::{Claims, JwtValidator};
use dh_sse::LOCAL_USER_SUBJECT;
use googletest::prelude::*;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

const SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";
const COOKIE: &str = "access_token";

fn token_for(sub: &str) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
        iat: chrono::Utc::now().timestamp(),
        roles: Vec::new(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

fn forwarded(headers: &[(&str, &str)]) -> ForwardedRequest {
    ForwardedRequest {
        url: "/events?request_id=req-1".to_string(),
        headers: headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    }
}

#[test]
fn given_relative_url_when_request_id_parsed_then_returned() {
    let id = request_id_from_url("/events?foo=1&request_id=abc-123").unwrap();

    assert_that!(id, eq("abc-123"));
}

#[test]
fn given_absolute_url_when_request_id_parsed_then_returned() {
    let id = request_id_from_url("https://dash.example.com/sse?request_id=r9").unwrap();

    assert_that!(id, eq("r9"));
}

#[test]
fn given_missing_request_id_when_parsed_then_bad_request() {
    let result = request_id_from_url("/events?other=1");

    assert!(matches!(result, Err(ApiError::BadRequest { .. })));
}

#[test]
fn given_empty_request_id_when_parsed_then_bad_request() {
    let result = request_id_from_url("/events?request_id=");

    assert!(matches!(result, Err(ApiError::BadRequest { .. })));
}

#[test]
fn given_request_id_with_colon_when_parsed_then_bad_request() {
    let result = request_id_from_url("/events?request_id=a%3Ab");

    assert!(matches!(result, Err(ApiError::BadRequest { .. })));
}

#[test]
fn given_development_when_secret_checked_then_always_accepted() {
    assert!(check_secret(false, Some("s3cret"), None).is_ok());
    assert!(check_secret(false, None, Some("anything")).is_ok());
}

#[test]
fn given_production_without_configured_secret_when_checked_then_unauthorized() {
    let result = check_secret(true, None, Some("guess"));

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn given_production_with_wrong_secret_when_checked_then_unauthorized() {
    assert!(matches!(
        check_secret(true, Some("s3cret"), Some("wrong")),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        check_secret(true, Some("s3cret"), None),
        Err(ApiError::Unauthorized { .. })
    ));
}

#[test]
fn given_production_with_matching_secret_when_checked_then_accepted() {
    assert!(check_secret(true, Some("s3cret"), Some("s3cret")).is_ok());
}

#[test]
fn given_auth_disabled_when_subject_resolved_then_local_user() {
    let subject = resolve_subject(false, None, COOKIE, &forwarded(&[]));

    assert_that!(subject, some(eq(LOCAL_USER_SUBJECT)));
}

#[test]
fn given_bearer_header_when_subject_resolved_then_token_subject() {
    let validator = JwtValidator::with_hs256(SECRET);
    let bearer = format!("Bearer {}", token_for("alice"));

    let subject = resolve_subject(
        true,
        Some(&validator),
        COOKIE,
        &forwarded(&[("Authorization", bearer.as_str())]),
    );

    assert_that!(subject, some(eq("alice")));
}

#[test]
fn given_session_cookie_when_subject_resolved_then_token_subject() {
    let validator = JwtValidator::with_hs256(SECRET);
    let cookie = format!("theme=dark; {COOKIE}={}", token_for("bob"));

    let subject = resolve_subject(
        true,
        Some(&validator),
        COOKIE,
        &forwarded(&[("cookie", cookie.as_str())]),
    );

    assert_that!(subject, some(eq("bob")));
}

#[test]
fn given_invalid_token_when_subject_resolved_then_unbound() {
    let validator = JwtValidator::with_hs256(SECRET);

    let subject = resolve_subject(
        true,
        Some(&validator),
        COOKIE,
        &forwarded(&[("authorization", "Bearer not.a.jwt")]),
    );

    assert_that!(subject, none());
}

#[test]
fn given_auth_enabled_without_validator_when_subject_resolved_then_unbound() {
    let subject = resolve_subject(true, None, COOKIE, &forwarded(&[]));

    assert_that!(subject, none());
}
