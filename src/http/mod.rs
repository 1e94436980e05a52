//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (one listener per site port)
//!     → server.rs (Axum setup, layers: request ID, trace, timeout, body limit)
//!     → middleware/ (concurrency limit, caller identity)
//!     → request.rs (Host → site name, path → controller/action/values, fields)
//!     → dispatch::Host (on the blocking pool)
//!     → response.rs (Outcome → status, headers, body)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeUuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
