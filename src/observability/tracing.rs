//! Request spans.
//!
//! # Responsibilities
//! - Create one span per HTTP request carrying its correlation ID
//!
//! # Design Decisions
//! - The request ID is assigned by the request-id layer before the span
//!   is created, so every log line inside the request carries it

use axum::{body::Body, http::Request};
use tracing::Span;

use crate::http::request::request_id_of;

/// Span factory for `TraceLayer::make_span_with`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id_of(request.headers()).unwrap_or("unknown"),
        method = %request.method(),
        path = %request.uri().path(),
    )
}
