//! Response transformation.
//!
//! # Responsibilities
//! - Map a dispatch outcome to an HTTP response
//! - Stream static files back with a content type
//!
//! # Design Decisions
//! - Error responses carry a short fixed body; the underlying cause is
//!   logged, never sent to the client

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::dispatch::response::Outcome;
use crate::dispatch::static_files::StaticFiles;

/// Convert an outcome into the HTTP response sent to the client.
pub async fn into_http_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Body { content, content_type } => {
            ([(header::CONTENT_TYPE, content_type)], content).into_response()
        }
        Outcome::File(path) => match tokio::fs::read(&path).await {
            Ok(bytes) => {
                ([(header::CONTENT_TYPE, StaticFiles::content_type(&path))], bytes).into_response()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read static file");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        },
        Outcome::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        Outcome::NotAllowed => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
        Outcome::BadRequest(cause) => {
            tracing::debug!(error = %cause, "Request data rejected");
            (StatusCode::BAD_REQUEST, "Bad Request").into_response()
        }
        Outcome::InternalError(cause) => {
            tracing::debug!(error = %cause, "Request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::binder::BindError;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_body_outcome() {
        let response = into_http_response(Outcome::Body {
            content: "{\"id\":1}".into(),
            content_type: "application/json".into(),
        })
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_text(response).await, "{\"id\":1}");
    }

    #[tokio::test]
    async fn test_file_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "<h1>hi</h1>").unwrap();

        let response = into_http_response(Outcome::File(path)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(body_text(response).await, "<h1>hi</h1>");

        let missing = into_http_response(Outcome::File(dir.path().join("gone.txt"))).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_errors_do_not_leak_cause() {
        let response = into_http_response(Outcome::InternalError("database password is hunter2".into())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Internal Server Error");

        let response = into_http_response(Outcome::BadRequest(BindError::CompositePositional {
            parameter: "address".into(),
        }))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Bad Request");

        assert_eq!(into_http_response(Outcome::NotAllowed).await.status(), StatusCode::FORBIDDEN);
        assert_eq!(into_http_response(Outcome::NotFound).await.status(), StatusCode::NOT_FOUND);
    }
}
