//! Gateway tests against a wiremock upstream.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use pretty_assertions::{assert_eq, assert_ne};
use std::sync::Arc;
use std::time::Duration;
use swr_cache::MemoryCacheStorage;
use swr_core::ports::{CacheStorage, Fetcher};
use swr_gateway::handlers::proxy::SOURCE_HEADER;
use swr_gateway::{AppState, GatewayConfig, HttpFetcher, build_worker, create_router};
use swr_router::ServiceWorker;
use swr_tests::{SwitchableFetcher, init_test_logging};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Gateway {
    app: Router,
    worker: Arc<ServiceWorker>,
    fetcher: Arc<SwitchableFetcher>,
}

struct Reply {
    status: StatusCode,
    source: Option<String>,
    content_type: Option<String>,
    body: String,
}

async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html>shell</html>"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/assets/app.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/javascript")
                .set_body_string("console.log('app')"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_string(r#"{"status":"operational"}"#),
        )
        .mount(server)
        .await;
}

async fn start_gateway(server: &MockServer) -> Gateway {
    init_test_logging();
    let config = GatewayConfig {
        upstream: Url::parse(&format!("{}/", server.uri())).unwrap(),
        ..Default::default()
    };
    let http = Arc::new(HttpFetcher::new(Duration::from_secs(5)).unwrap()) as Arc<dyn Fetcher>;
    let fetcher = Arc::new(SwitchableFetcher::new(http));
    let storage = Arc::new(MemoryCacheStorage::new()) as Arc<dyn CacheStorage>;

    let worker = build_worker(&config, storage, Arc::clone(&fetcher) as Arc<dyn Fetcher>).await;
    let state = Arc::new(AppState::new(Arc::clone(&worker), config.upstream.clone()));

    Gateway {
        app: create_router(state),
        worker,
        fetcher,
    }
}

async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let header_value = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let source = header_value(SOURCE_HEADER);
    let content_type = header_value(header::CONTENT_TYPE.as_str());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    Reply {
        status,
        source,
        content_type,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = MockServer::start().await;
    let gateway = start_gateway(&server).await;

    let reply = send(&gateway.app, get("/health")).await;
    assert_eq!(reply.status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_startup_installs_and_activates() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let gateway = start_gateway(&server).await;

    assert!(gateway.worker.is_controlling());

    let reply = send(&gateway.app, get("/__swr/stats")).await;
    let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(body["state"], "activated");
    assert_eq!(body["controlling"], true);
}

#[tokio::test]
async fn test_serves_cached_content_when_upstream_unreachable() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let gateway = start_gateway(&server).await;

    let asset = send(&gateway.app, get("/assets/app.js")).await;
    assert_eq!(asset.status, StatusCode::OK);
    assert_eq!(asset.source.as_deref(), Some("network"));
    let status = send(&gateway.app, get("/api/status")).await;
    assert_eq!(status.status, StatusCode::OK);

    gateway.fetcher.set_offline(true);

    let asset = send(&gateway.app, get("/assets/app.js")).await;
    assert_eq!(asset.status, StatusCode::OK);
    assert_eq!(asset.source.as_deref(), Some("cache"));
    assert_eq!(asset.body, "console.log('app')");

    let status = send(&gateway.app, get("/api/status")).await;
    assert_eq!(status.source.as_deref(), Some("cache"));
    assert_eq!(status.body, r#"{"status":"operational"}"#);

    let unknown_api = send(&gateway.app, get("/api/incidents")).await;
    assert_eq!(unknown_api.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(unknown_api.content_type.as_deref(), Some("application/json"));
    assert_eq!(unknown_api.body, r#"{"error":"Service unavailable"}"#);

    let page = send(&gateway.app, get("/demo/dashboard")).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body, "<html>shell</html>");
}

#[tokio::test]
async fn test_post_is_forwarded_without_caching() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .and(body_string(r#"{"email":"ops@example.com"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_string("queued"))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = start_gateway(&server).await;

    let reply = send(
        &gateway.app,
        post_json(
            "/api/contact",
            serde_json::json!({"email": "ops@example.com"}),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body, "queued");

    let snapshot = gateway.worker.router().stats().snapshot();
    assert_eq!(snapshot.passthrough, 1);
    assert_eq!(snapshot.cache_hits + snapshot.cache_misses, 0);
}

#[tokio::test]
async fn test_post_upstream_unreachable_is_bad_gateway() {
    let server = MockServer::start().await;
    let gateway = start_gateway(&server).await;
    gateway.fetcher.set_offline(true);

    let reply = send(
        &gateway.app,
        post_json("/api/contact", serde_json::json!({})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_clear_cache_message() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let gateway = start_gateway(&server).await;

    let reply = send(
        &gateway.app,
        post_json("/__swr/message", serde_json::json!({"type": "CLEAR_CACHE"})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(body["outcome"], "cleared");
    assert!(
        body["deleted"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("swr-static-v1"))
    );

    gateway.fetcher.set_offline(true);
    let page = send(&gateway.app, get("/demo/dashboard")).await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert_eq!(page.body, "Page not available offline");
}

#[tokio::test]
async fn test_malformed_message_rejected() {
    let server = MockServer::start().await;
    let gateway = start_gateway(&server).await;

    let reply = send(
        &gateway.app,
        post_json("/__swr/message", serde_json::json!({"payload": {}})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = MockServer::start().await;
    let gateway = start_gateway(&server).await;

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = gateway.app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-42"
    );
}

#[tokio::test]
async fn test_protocol_relative_path_stays_on_upstream() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let other = MockServer::start().await;
    Mock::given(path("/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OTHER HOST"))
        .mount(&other)
        .await;
    let gateway = start_gateway(&server).await;

    let other_authority = other.address().to_string();
    let uri = format!("//{}/secret", other_authority);

    let reply = send(&gateway.app, get(&uri)).await;
    assert_ne!(reply.body, "OTHER HOST");

    let request = Request::builder()
        .method("POST")
        .uri(&uri)
        .body(Body::from("payload"))
        .unwrap();
    let reply = send(&gateway.app, request).await;
    assert_ne!(reply.body, "OTHER HOST");

    let reached_other = other.received_requests().await.unwrap_or_default();
    assert!(reached_other.is_empty());
}
