use api_composer::history::MemoryStore;
use api_composer::proxy::ReqwestClient;
use api_composer::{router, AppState, Config};
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tower::ServiceExt;

/// Remote origin the proxy forwards to.
async fn spawn_remote() -> SocketAddr {
    let app = Router::new()
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))) }),
        )
        .route("/text", get(|| async { "plain hello" }))
        .route(
            "/echo",
            any(|method: Method, headers: HeaderMap, body: String| async move {
                let header = |name: &str| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                };
                Json(json!({
                    "method": method.as_str(),
                    "authorization": header("authorization"),
                    "contentType": header("content-type"),
                    "custom": header("x-custom"),
                    "body": body,
                }))
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late".into_response()
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn app_with(config: Config) -> Router {
    let client = ReqwestClient::arc(config.request_timeout).unwrap();
    router(AppState::new(config, client, Box::new(MemoryStore::new())))
}

fn app() -> Router {
    app_with(Config {
        environment: "production".into(),
        ..Config::default()
    })
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, bytes.to_vec())
}

async fn call_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, bytes) = call(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_environment() {
    let (status, body) = call_json(&app(), Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "production");
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn remote_error_status_is_relayed() {
    let remote = spawn_remote().await;
    let (status, body) = call_json(
        &app(),
        Method::POST,
        "/api/request",
        Some(json!({
            "endPoint": format!("http://{}/missing", remote),
            "httpMethod": "GET",
            "headers": {"Accept": "application/json"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "not found"}));
}

#[tokio::test]
async fn text_responses_are_relayed_as_text() {
    let remote = spawn_remote().await;
    let (status, headers, body) = call(
        &app(),
        Method::POST,
        "/api/request",
        Some(json!({
            "endPoint": format!("http://{}/text", remote),
            "httpMethod": "get",
            "headers": {"Accept": "*/*"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(body, b"plain hello");
}

#[tokio::test]
async fn headers_body_and_token_are_forwarded() {
    let remote = spawn_remote().await;
    let (status, body) = call_json(
        &app(),
        Method::POST,
        "/api/request",
        Some(json!({
            "endPoint": format!("http://{}/echo", remote),
            "httpMethod": "POST",
            "headers": {"X-Custom": 7},
            "body": {"title": "foo"},
            "authToken": "s3cret"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "POST");
    assert_eq!(body["custom"], "7");
    assert_eq!(body["authorization"], "Bearer s3cret");
    assert_eq!(body["contentType"], "application/json");
    assert_eq!(body["body"], r#"{"title":"foo"}"#);
}

#[tokio::test]
async fn get_requests_carry_no_body() {
    let remote = spawn_remote().await;
    let (_, body) = call_json(
        &app(),
        Method::POST,
        "/api/request",
        Some(json!({
            "endPoint": format!("http://{}/echo", remote),
            "httpMethod": "GET",
            "headers": {"X-Custom": "1"},
            "body": {"dropped": true}
        })),
    )
    .await;

    assert_eq!(body["method"], "GET");
    assert_eq!(body["body"], "");
    assert_eq!(body["contentType"], "");
}

#[tokio::test]
async fn validation_failures_are_bad_requests() {
    let app = app();
    let cases = [
        (json!({"httpMethod": "GET", "headers": {"A": "B"}}), "Missing required fields"),
        (
            json!({"endPoint": "not-a-url", "httpMethod": "GET", "headers": {"A": "B"}}),
            "Invalid endpoint URL",
        ),
        (
            json!({"endPoint": "https://x.io", "httpMethod": "TRACE", "headers": {"A": "B"}}),
            "Invalid HTTP method",
        ),
        (
            json!({"endPoint": "https://x.io", "httpMethod": "GET", "headers": {}}),
            "Invalid headers",
        ),
        (
            json!({"endPoint": "https://x.io", "httpMethod": "GET", "headers": {"A": {"b": 1}}}),
            "Invalid headers",
        ),
    ];

    for (request, reason) in cases {
        let (status, body) = call_json(&app, Method::POST, "/api/request", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": reason}));
    }
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (status, body) = call_json(&app(), Method::POST, "/api/request", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid request body"}));
}

#[tokio::test]
async fn unreachable_host_is_generic_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (status, body) = call_json(
        &app(),
        Method::POST,
        "/api/request",
        Some(json!({
            "endPoint": format!("http://{}/", addr),
            "httpMethod": "GET",
            "headers": {"Accept": "*/*"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "An error occurred while processing the request");
    assert_eq!(body["code"], "CONNECTION_FAILED");
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn slow_remote_times_out() {
    let remote = spawn_remote().await;
    let app = app_with(Config {
        environment: "development".into(),
        request_timeout: Duration::from_millis(200),
        ..Config::default()
    });

    let (status, body) = call_json(
        &app,
        Method::POST,
        "/api/request",
        Some(json!({
            "endPoint": format!("http://{}/slow", remote),
            "httpMethod": "GET",
            "headers": {"Accept": "*/*"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "TIMEOUT");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn curl_parse_and_generate() {
    let app = app();
    let (status, body) = call_json(
        &app,
        Method::POST,
        "/api/curl/parse",
        Some(json!({
            "command": r#"curl -X POST https://api.example.com/items -H "Content-Type: application/json" -d '{"a":1}'"#
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "request": {
                "method": "POST",
                "url": "https://api.example.com/items",
                "headers": [{"key": "Content-Type", "value": "application/json"}],
                "body": {"a": 1}
            }
        })
    );

    let (status, generated) =
        call_json(&app, Method::POST, "/api/curl/generate", Some(body["request"].clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        generated["command"],
        r#"curl -X POST 'https://api.example.com/items' -H "Content-Type: application/json" -d '{"a":1}'"#
    );
}

#[tokio::test]
async fn curl_parse_failure_is_inline() {
    let (status, body) = call_json(
        &app(),
        Method::POST,
        "/api/curl/parse",
        Some(json!({"command": "curl 'https://unterminated"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "Error parsing curl command");
    assert_eq!(body["request"]["method"], "GET");
    assert_eq!(body["request"]["url"], "");
}

#[tokio::test]
async fn history_round_trip() {
    let app = app();

    for n in 0..12 {
        let (status, entry) = call_json(
            &app,
            Method::POST,
            "/api/history",
            Some(json!({
                "method": "GET",
                "url": format!("https://api.example.com/{}", n),
                "headers": [{"key": "Accept", "value": "*/*"}],
                "authToken": "never-stored"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry["authToken"], Value::Null);
    }

    let (status, list) = call_json(&app, Method::GET, "/api/history", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 10);
    assert_eq!(list[0]["url"], "https://api.example.com/11");
    assert_eq!(list[9]["url"], "https://api.example.com/2");

    let (status, _) = call_json(&app, Method::DELETE, "/api/history", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, list) = call_json(&app, Method::GET, "/api/history", None).await;
    assert_eq!(list, json!([]));
}
