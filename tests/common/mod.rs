//! Shared utilities for integration tests.

use std::path::Path;
use std::time::Duration;

use site_host::config::{parse_config, HostConfig};
use site_host::controllers;
use site_host::http::HttpServer;
use site_host::lifecycle::{build_host, Shutdown};

/// Host configuration with two named sites on `port` and a static default.
#[allow(dead_code)]
pub fn config(port: u16, static_root: &Path) -> HostConfig {
    let text = format!(
        r#"
        [listener]
        bind_host = "127.0.0.1"

        [security]
        trust_identity_headers = true
        max_body_size = 1024

        [[sites]]
        name = "shop"
        port = {port}
        view = "json"
        controllers = ["ItemsController"]

        [[sites]]
        name = "people"
        port = {port}
        view = "text"
        controllers = ["UsersController"]

        [[sites]]
        name = "fallback"
        port = {port}
        priority = "low"
        default = true
        static_root = '{root}'
        "#,
        port = port,
        root = static_root.display(),
    );
    parse_config(&text).unwrap()
}

/// Build the host from `config` and serve it until the returned handle is triggered.
#[allow(dead_code)]
pub async fn start_host(config: HostConfig) -> Shutdown {
    let catalog = controllers::catalog().unwrap();
    let host = build_host(&config, &catalog).unwrap();
    let server = HttpServer::new(host, config);
    let listeners = server.bind().await.unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listeners, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown
}

/// Client that never reuses connections or goes through a proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
