//! Multi-site HTTP host with convention-based controller dispatch.

pub mod config;
pub mod controllers;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::HostConfig;
pub use dispatch::{Host, Request, Response, WebSite};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
