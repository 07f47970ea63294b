//! Extractors
//!
//! Wrappers around axum's extractors whose rejections are reported through
//! [`AppError`], so malformed bodies and ids get the same JSON error shape as
//! every other failure.

use axum::extract::rejection::PathRejection;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;

use crate::error::AppError;

/// JSON body extractor
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameter extractor
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Read the expected version from an `If-Match` header.
///
/// Accepts both `3` and the quoted ETag form `"3"`. A missing header or `*`
/// means no precondition. Weak tags never match under `If-Match`, so they are
/// rejected.
pub fn expected_version(headers: &HeaderMap) -> Result<Option<i64>, AppError> {
    let Some(value) = headers.get(axum::http::header::IF_MATCH) else {
        return Ok(None);
    };

    let invalid = || AppError::InvalidRequest("If-Match must carry a strong tour version".to_string());

    let tag = value.to_str().map_err(|_| invalid())?.trim();
    if tag == "*" {
        return Ok(None);
    }
    if tag.starts_with("W/") {
        return Err(invalid());
    }

    tag.trim_matches('"')
        .parse::<i64>()
        .map(Some)
        .map_err(|_| invalid())
}

/// ETag value for a tour version
pub fn version_etag(version: i64) -> String {
    format!("\"{}\"", version)
}
