use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{Request, StatusCode, header},
};
use rating_badge::{
    AppState, RouteLimiters, build_router,
    config::Config,
    middleware::{ManualClock, REJECTION_MESSAGE},
};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestApp {
    router: Router,
    clock: Arc<ManualClock>,
}

fn test_app(config: Config) -> TestApp {
    let clock = Arc::new(ManualClock::new());
    let limiters = RouteLimiters::with_clock(&config, clock.clone());
    let state = AppState::new(config).expect("valid test config");
    TestApp {
        router: build_router(state, &limiters),
        clock,
    }
}

fn app_for(server: &MockServer) -> TestApp {
    test_app(Config {
        dmoj_api_base: server.uri(),
        codeforces_api_base: server.uri(),
        upstream_timeout_secs: 2,
        ..Config::default()
    })
}

async fn get(app: &TestApp, uri: &str, client: [u8; 4]) -> (StatusCode, Option<String>, String) {
    let mut req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    req.extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((client, 40000))));

    let response = app.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_dmoj_rating_badge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"object": {"username": "alice", "rating": 1550}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, content_type, body) = get(&app, "/dmoj/alice", [10, 0, 0, 1]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
    assert!(body.contains("<title>DMOJ: 1550</title>"), "body: {}", body);
    // [1500, 1800) 是紫色
    assert!(body.contains(r##"fill="#94E""##));
    assert!(body.contains("data:image/svg+xml;base64,"));
}

#[tokio::test]
async fn test_dmoj_blue_tier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/carol"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"object": {"rating": 1350}}
        })))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, _, body) = get(&app, "/dmoj/carol", [10, 0, 0, 1]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>DMOJ: 1350</title>"));
    assert!(body.contains(r##"fill="#08C""##));
}

#[tokio::test]
async fn test_zero_rating_shows_unrated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user.info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "result": [{"handle": "fresh", "rating": 0}]
        })))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, _, body) = get(&app, "/codeforces/fresh", [10, 0, 0, 1]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Codeforces: unrated</title>"));
    assert!(body.contains(r##"fill="#999""##));
}

#[tokio::test]
async fn test_dmoj_malformed_body_is_unrated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, _, body) = get(&app, "/dmoj/alice", [10, 0, 0, 1]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>DMOJ: unrated</title>"));
    // grey
    assert!(body.contains(r##"fill="#999""##));
}

#[tokio::test]
async fn test_dmoj_missing_user_is_unrated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": 404, "message": "user not found"}
        })))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, _, body) = get(&app, "/dmoj/ghost", [10, 0, 0, 1]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>DMOJ: unrated</title>"));
}

#[tokio::test]
async fn test_codeforces_red_tier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user.info"))
        .and(query_param("handles", "bob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "result": [{"handle": "bob", "rating": 2450}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, content_type, body) = get(&app, "/codeforces/bob", [10, 0, 0, 1]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
    assert!(body.contains("<title>Codeforces: 2450</title>"));
    // red, not the A31C0F band
    assert!(body.contains(r##"fill="#E43""##));
    assert!(!body.contains("A31C0F"));
    assert!(body.contains(r#"<image x="40" y="35" width="150""#));
}

#[tokio::test]
async fn test_codeforces_unknown_handle_is_unrated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user.info"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "status": "FAILED",
            "comment": "handles: User with handle nobody not found"
        })))
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, _, body) = get(&app, "/codeforces/nobody", [10, 0, 0, 1]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Codeforces: unrated</title>"));
}

#[tokio::test]
async fn test_username_is_escaped_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/a%20b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"object": {"rating": 1000}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let (status, _, body) = get(&app, "/dmoj/a%20b", [10, 0, 0, 1]).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>DMOJ: 1000</title>"));
}

#[tokio::test]
async fn test_dmoj_per_client_limit_stops_upstream_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/user/x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {"object": {"rating": 1200}}
        })))
        .expect(11)
        .mount(&server)
        .await;

    let app = app_for(&server);
    for i in 0..10 {
        let (status, _, _) = get(&app, "/dmoj/x", [10, 0, 0, 1]).await;
        assert_eq!(status, StatusCode::OK, "request {}", i + 1);
        app.clock.advance(Duration::from_secs(5));
    }

    let (status, _, body) = get(&app, "/dmoj/x", [10, 0, 0, 1]).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, REJECTION_MESSAGE);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 10);

    // 其他客户端仍可访问
    let (status, _, _) = get(&app, "/dmoj/x", [10, 0, 0, 2]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(server.received_requests().await.unwrap().len(), 11);
}

#[tokio::test]
async fn test_codeforces_global_limit_per_second() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user.info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": [{"rating": 1500}]
        })))
        .mount(&server)
        .await;

    let app = app_for(&server);
    for i in 0..5u8 {
        let (status, _, _) = get(&app, "/codeforces/x", [10, 0, 0, i % 2]).await;
        assert_eq!(status, StatusCode::OK, "request {}", i + 1);
    }

    let (status, _, _) = get(&app, "/codeforces/x", [10, 0, 0, 7]).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(server.received_requests().await.unwrap().len(), 5);

    // 下一秒恢复
    app.clock.advance(Duration::from_secs(1));
    let (status, _, _) = get(&app, "/codeforces/x", [10, 0, 0, 7]).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_route_groups_are_limited_separately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let app = app_for(&server);
    for _ in 0..5 {
        get(&app, "/codeforces/x", [10, 0, 0, 1]).await;
    }
    let (status, _, _) = get(&app, "/codeforces/x", [10, 0, 0, 1]).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _, _) = get(&app, "/dmoj/x", [10, 0, 0, 1]).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_transport_error_returns_bad_gateway_badge() {
    // 端口 1 上没有服务，连接会被拒绝
    let app = test_app(Config {
        dmoj_api_base: "http://127.0.0.1:1".into(),
        ..Config::default()
    });

    let (status, content_type, body) = get(&app, "/dmoj/alice", [10, 0, 0, 1]).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
    assert!(body.contains("<title>DMOJ: unavailable</title>"));
    assert!(body.contains(r##"fill="#999""##));
}

#[tokio::test]
async fn test_slow_upstream_returns_gateway_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user.info"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"result": [{"rating": 1500}]}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let app = test_app(Config {
        codeforces_api_base: server.uri(),
        upstream_timeout_secs: 1,
        ..Config::default()
    });

    let (status, _, body) = get(&app, "/codeforces/slow", [10, 0, 0, 1]).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body.contains("<title>Codeforces: unavailable</title>"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = MockServer::start().await;
    let app = app_for(&server);

    let (status, _, _) = get(&app, "/topcoder/alice", [10, 0, 0, 1]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(server.received_requests().await.unwrap().is_empty());
}
