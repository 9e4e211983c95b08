//! End-to-end tests of the composed HTTP application.

#![cfg(feature = "http")]

use axum::{Router, body::Body};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

use sum_mcp_server::core::transport::{HttpConfig, McpApp, http::HttpTransport};
use sum_mcp_server::core::{Config, McpServer};

fn local_transport(port: u16) -> HttpTransport {
    HttpTransport::new(HttpConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    })
}

async fn started(transport: &HttpTransport) -> (McpApp, Router) {
    let server = McpServer::new(Config::default());
    let mcp = transport.mcp_app(server.clone());
    mcp.startup().await;
    let app = transport.app(server.name(), &mcp);
    (mcp, app)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn sum_call(id: i64, a: serde_json::Value, b: serde_json::Value) -> Request<Body> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": "sum_two_numbers", "arguments": { "a": a, "b": b } }
    });
    Request::builder()
        .method(Method::POST)
        .uri("/mcp/")
        .header("content-type", "application/json")
        .header("accept", "application/json, text/event-stream")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn root_reports_ok() {
    let (_mcp, app) = started(&local_transport(0)).await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["message"].as_str().unwrap().contains("/mcp/"));
}

#[tokio::test]
async fn sum_scenarios() {
    let (_mcp, app) = started(&local_transport(0)).await;

    let (status, body) = send(&app, sum_call(1, json!(2), json!(3))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["structuredContent"]["result"], json!(5.0));

    let (_, body) = send(&app, sum_call(2, json!(-1.5), json!(1.5))).await;
    assert_eq!(body["result"]["structuredContent"]["result"], json!(0.0));

    let (_, body) = send(&app, sum_call(3, json!("4.5"), json!(0.5))).await;
    assert_eq!(body["result"]["structuredContent"]["result"], json!(5.0));
}

#[tokio::test]
async fn sum_is_commutative_over_the_wire() {
    let (_mcp, app) = started(&local_transport(0)).await;
    let pairs = [(0.1, 0.2), (-3.0, 7.5), (1e300, 1e300), (123.456, -0.001)];

    for (i, (a, b)) in pairs.into_iter().enumerate() {
        let id = i as i64;
        let (_, forward) = send(&app, sum_call(id, json!(a), json!(b))).await;
        let (_, backward) = send(&app, sum_call(id, json!(b), json!(a))).await;
        assert_eq!(forward["result"]["structuredContent"], backward["result"]["structuredContent"]);
        assert_eq!(forward["result"]["structuredContent"]["result"], json!(a + b));
    }
}

#[tokio::test]
async fn booleans_are_coerced_to_numbers() {
    let (_mcp, app) = started(&local_transport(0)).await;
    let (status, body) = send(&app, sum_call(1, json!(true), json!(1))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["structuredContent"]["result"], json!(2.0));
}

#[tokio::test]
async fn invalid_arguments_are_rejected() {
    let (_mcp, app) = started(&local_transport(0)).await;
    let (status, body) = send(&app, sum_call(1, json!("two"), json!(1))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32602);
    assert_eq!(body["id"], 1);

    let (_, body) = send(&app, sum_call(2, json!(null), json!(1))).await;
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let (_mcp, app) = started(&local_transport(0)).await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/mcp")
        .header("origin", "http://example.com")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn serves_on_a_real_socket() {
    let transport = local_transport(0);
    let listener = transport.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();
    assert_ne!(addr.port(), 0);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(transport.serve(
        listener,
        McpServer::new(Config::default()),
        async move {
            let _ = stop_rx.await;
        },
    ));

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    assert!(raw.starts_with("HTTP/1.1 200"));
    assert!(raw.contains("\"status\":\"ok\""));

    stop_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
