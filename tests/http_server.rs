//! Live HTTP tests: real listeners, real client.

use std::fs;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HOST};
use reqwest::StatusCode;
use site_host::config::parse_config;

mod common;

#[tokio::test]
async fn test_routes_by_host_header() {
    let root = tempfile::tempdir().unwrap();
    let shutdown = common::start_host(common::config(28301, root.path())).await;
    let client = common::client();

    let res = client
        .get("http://127.0.0.1:28301/Items/Get/1")
        .header(HOST, "Shop:28301")
        .send()
        .await
        .expect("host unreachable");
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    assert!(res.headers().contains_key("x-request-id"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["name"], "Widget");

    let res = client
        .get("http://127.0.0.1:28301/Users/Greet/Ann/30")
        .header(HOST, "people")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Hello, Ann! You are 30.");

    shutdown.trigger();
}

#[tokio::test]
async fn test_default_site_serves_static_files() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("index.html"), "<h1>home</h1>").unwrap();
    let shutdown = common::start_host(common::config(28302, root.path())).await;
    let client = common::client();

    let res = client
        .get("http://127.0.0.1:28302/index.html")
        .header(HOST, "unknown.example")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(res.text().await.unwrap(), "<h1>home</h1>");

    let res = client
        .get("http://127.0.0.1:28302/..%2Fsecret.txt")
        .header(HOST, "unknown.example")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    shutdown.trigger();
}

#[tokio::test]
async fn test_form_post_and_roles() {
    let root = tempfile::tempdir().unwrap();
    let shutdown = common::start_host(common::config(28303, root.path())).await;
    let client = common::client();
    let form = "item.Name=Lamp&item.Price=12.50";

    let res = client
        .post("http://127.0.0.1:28303/Items/Create")
        .header(HOST, "shop")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post("http://127.0.0.1:28303/Items/Create")
        .header(HOST, "shop")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-user", "ann")
        .header("x-user-roles", "Viewer, Editor")
        .body(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "id": 3, "name": "Lamp", "price": "12.50" }));

    shutdown.trigger();
}

#[tokio::test]
async fn test_error_statuses() {
    let root = tempfile::tempdir().unwrap();
    let shutdown = common::start_host(common::config(28304, root.path())).await;
    let client = common::client();

    // Binding failure
    let res = client
        .get("http://127.0.0.1:28304/Users/Greet/Ann/old")
        .header(HOST, "people")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await.unwrap(), "Bad Request");

    // Known controller, unknown action
    let res = client
        .get("http://127.0.0.1:28304/Items/Delete/1")
        .header(HOST, "shop")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Body over the configured limit
    let res = client
        .post("http://127.0.0.1:28304/Items/Get")
        .header(HOST, "shop")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(format!("name={}", "x".repeat(4096)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unroutable_without_default_site() {
    let config = parse_config(
        r#"
        [listener]
        bind_host = "127.0.0.1"

        [[sites]]
        name = "shop"
        port = 28305
        controllers = ["ItemsController"]
        "#,
    )
    .unwrap();
    let shutdown = common::start_host(config).await;

    let res = common::client()
        .get("http://127.0.0.1:28305/Items/List")
        .header(HOST, "blog")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "No matching site");

    shutdown.trigger();
}

#[tokio::test]
async fn test_identity_headers_ignored_when_untrusted() {
    let root = tempfile::tempdir().unwrap();
    let mut config = common::config(28306, root.path());
    config.security.trust_identity_headers = false;
    let shutdown = common::start_host(config).await;

    let res = common::client()
        .post("http://127.0.0.1:28306/Items/Create")
        .header(HOST, "shop")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-user", "mallory")
        .header("x-user-roles", "Admin")
        .body("item.Name=Lamp&item.Price=1")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(100)).await;
}
