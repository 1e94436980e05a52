//! In-flight request limit.
//!
//! Uses a semaphore to enforce `max_connections`. When the limit is reached,
//! new requests wait until a slot becomes available.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Semaphore;

pub async fn concurrency_limit(
    State(limit): State<Arc<Semaphore>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let _permit = match limit.acquire_owned().await {
        Ok(permit) => permit,
        // Only happens once the semaphore is closed during shutdown.
        Err(_) => return (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response(),
    };

    next.run(req).await
}
