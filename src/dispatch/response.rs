//! Write-once response sink.
//!
//! # Responsibilities
//! - Record exactly one terminal outcome per request
//! - Map outcomes to HTTP status codes
//!
//! # Design Decisions
//! - First write wins; later writes are dropped and logged
//! - A sink nobody wrote to becomes an internal error, so every request
//!   still ends in one terminal response

use std::error::Error;
use std::path::PathBuf;

use axum::http::StatusCode;

use crate::dispatch::binder::BindError;

/// The terminal result of dispatching one request.
#[derive(Debug)]
pub enum Outcome {
    /// Rendered view content.
    Body { content: String, content_type: String },
    /// A static file to stream back.
    File(PathBuf),
    NotFound,
    NotAllowed,
    /// Request data could not be bound to the action's parameters.
    BadRequest(BindError),
    /// The action or its view failed; the cause is kept for logging.
    InternalError(Box<dyn Error + Send + Sync>),
}

impl Outcome {
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Body { .. } | Outcome::File(_) => StatusCode::OK,
            Outcome::NotFound => StatusCode::NOT_FOUND,
            Outcome::NotAllowed => StatusCode::FORBIDDEN,
            Outcome::BadRequest(_) => StatusCode::BAD_REQUEST,
            Outcome::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Body { .. } => "body",
            Outcome::File(_) => "file",
            Outcome::NotFound => "not_found",
            Outcome::NotAllowed => "not_allowed",
            Outcome::BadRequest(_) => "bad_request",
            Outcome::InternalError(_) => "internal_error",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("request finished without a response")]
struct NoOutcome;

/// Response sink handed down the pipeline.
#[derive(Debug, Default)]
pub struct Response {
    outcome: Option<Outcome>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_body(&mut self, content: impl Into<String>, content_type: impl Into<String>) {
        self.finish(Outcome::Body {
            content: content.into(),
            content_type: content_type.into(),
        });
    }

    pub fn write_file(&mut self, path: impl Into<PathBuf>) {
        self.finish(Outcome::File(path.into()));
    }

    pub fn not_found(&mut self) {
        self.finish(Outcome::NotFound);
    }

    pub fn not_allowed(&mut self) {
        self.finish(Outcome::NotAllowed);
    }

    pub fn bad_request(&mut self, cause: BindError) {
        self.finish(Outcome::BadRequest(cause));
    }

    pub fn internal_error(&mut self, cause: Box<dyn Error + Send + Sync>) {
        self.finish(Outcome::InternalError(cause));
    }

    pub fn is_written(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn into_outcome(self) -> Outcome {
        self.outcome
            .unwrap_or_else(|| Outcome::InternalError(Box::new(NoOutcome)))
    }

    fn finish(&mut self, outcome: Outcome) {
        match &self.outcome {
            Some(existing) => {
                tracing::error!(
                    existing = existing.label(),
                    discarded = outcome.label(),
                    "Response already written, discarding second outcome"
                );
            }
            None => self.outcome = Some(outcome),
        }
    }
}
