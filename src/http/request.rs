//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Derive the site name from the Host header or the request authority
//! - Collect named fields from the query string and form body
//! - Translate an HTTP request into a dispatch request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Body size limits are enforced by the limit layer before the body is read
//! - Only urlencoded form bodies are read; other bodies are left untouched

use std::collections::HashMap;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::dispatch::request::{Request as DispatchRequest, User};

/// Header carrying the correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Generates a fresh UUID v4 for requests that arrive without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID header value, if present and valid UTF-8.
pub fn request_id_of(headers: &HeaderMap) -> Option<&str> {
    headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
}

/// Site name from the Host header: port stripped, lowercased.
///
/// HTTP/2 clients send the authority in the URI instead of a Host header,
/// so the URI host is used when the header is absent. Falls back to an
/// empty name, which only a default site accepts.
pub fn site_name_of(headers: &HeaderMap, uri: &Uri) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or_default();

    // Authority may carry userinfo: "user@host:port"
    let host = host.rsplit('@').next().unwrap_or_default();

    let name = if let Some(rest) = host.strip_prefix('[') {
        // IPv6 literal: "[::1]:8080"
        rest.split(']').next().unwrap_or_default()
    } else {
        host.split(':').next().unwrap_or_default()
    };

    name.trim().to_ascii_lowercase()
}

/// Whether the body is an urlencoded form.
pub fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

/// Decode urlencoded pairs into `fields`. Later pairs overwrite earlier ones.
pub fn collect_fields(fields: &mut HashMap<String, String>, encoded: &[u8]) {
    for (name, value) in url::form_urlencoded::parse(encoded) {
        fields.insert(name.into_owned(), value.into_owned());
    }
}

/// Translate an HTTP request into a dispatch request.
///
/// The caller's identity is read from the `User` extension placed by the
/// identity middleware; without it the caller is anonymous. Form fields
/// override query fields of the same name.
pub async fn into_dispatch_request(request: Request<Body>) -> Result<DispatchRequest, Response> {
    let (parts, body) = request.into_parts();

    let site_name = site_name_of(&parts.headers, &parts.uri);
    let mut fields = HashMap::new();
    if let Some(query) = parts.uri.query() {
        collect_fields(&mut fields, query.as_bytes());
    }

    if is_form(&parts.headers) {
        let bytes = axum::body::to_bytes(body, usize::MAX).await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to read form body");
            (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response()
        })?;
        collect_fields(&mut fields, &bytes);
    }

    let user = parts
        .extensions
        .get::<User>()
        .cloned()
        .unwrap_or_else(User::anonymous);

    let mut request = DispatchRequest::from_path(parts.method.clone(), site_name, parts.uri.path())
        .with_fields(fields)
        .with_user(user);
    if let Some(id) = request_id_of(&parts.headers) {
        request = request.with_request_id(id);
    }

    Ok(request)
}
