//! Request middleware.
//!
//! # Data Flow
//! ```text
//! Request
//!     → concurrency.rs (wait for an in-flight slot)
//!     → identity.rs (attach the caller's User)
//!     → dispatch handler
//! ```

pub mod concurrency;
pub mod identity;

pub use concurrency::concurrency_limit;
pub use identity::{identity_middleware, IdentityState};
