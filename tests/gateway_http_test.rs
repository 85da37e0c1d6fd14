//! Gateway tools against HTTP endpoints
//!
//! JSON-RPC calls, image downloads under a payload policy, and the
//! seo_analysis tool in both URL-forwarding and prefetch modes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use stox_agent::gateway::{
    ImageFormat, PayloadFetcher, PayloadPolicy, RpcClient, SeoAnalysisTool, ToolError, ToolGateway,
    ToolPayload, METHOD_FROM_IMAGE, METHOD_FROM_URL,
};
use stox_agent::provider::ToolCall;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01";

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

async fn serve_image(server: &MockServer, route: &str, body: Vec<u8>, content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", content_type)
                .set_body_bytes(body),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_rpc_call_returns_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({"jsonrpc": "2.0", "method": "Echo", "params": {"x": 1}})))
        .respond_with(rpc_result(json!({"x": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = RpcClient::new(format!("{}/rpc", server.uri()));
    let result = client.call("Echo", json!({"x": 1})).await.unwrap();
    assert_eq!(result, json!({"x": 1}));
}

#[tokio::test]
async fn test_rpc_bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(rpc_result(json!("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = RpcClient::new(server.uri()).with_auth("secret");
    assert_eq!(client.call("Ping", json!({})).await.unwrap(), json!("ok"));
}

#[tokio::test]
async fn test_rpc_error_object_is_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32602, "message": "Image URL is required"}
        })))
        .mount(&server)
        .await;

    let err = RpcClient::new(server.uri())
        .call(METHOD_FROM_URL, json!({"image_url": ""}))
        .await
        .unwrap_err();
    assert_eq!(err, ToolError::remote(-32602, "Image URL is required"));
}

#[tokio::test]
async fn test_rpc_http_failure_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = RpcClient::new(server.uri()).call("Ping", json!({})).await.unwrap_err();
    assert_eq!(err.kind(), "transport");
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn test_fetch_accepts_image() {
    let server = MockServer::start().await;
    serve_image(&server, "/mug.png", PNG.to_vec(), "image/png").await;

    let fetched = PayloadFetcher::default()
        .fetch(&format!("{}/mug.png", server.uri()))
        .await
        .unwrap();
    assert_eq!(fetched.data, PNG);
    assert_eq!(fetched.format, ImageFormat::Png);
    assert_eq!(fetched.content_type, "image/png");
    assert_eq!(fetched.filename_for("http://cdn/mug.png?v=2"), "mug.png");
}

#[tokio::test]
async fn test_fetch_rejections() {
    let server = MockServer::start().await;
    serve_image(&server, "/page", b"<html></html>".to_vec(), "text/html").await;
    serve_image(&server, "/big.png", vec![0u8; 64], "image/png").await;
    serve_image(&server, "/fake.png", b"not a png at all".to_vec(), "image/png").await;

    let fetcher = PayloadFetcher::new(PayloadPolicy::with_max_bytes(32));
    let kind = |route: &str| {
        let url = format!("{}{}", server.uri(), route);
        let fetcher = fetcher.clone();
        async move { fetcher.fetch(&url).await.unwrap_err().kind() }
    };

    assert_eq!(kind("/page").await, "invalid_content_type");
    assert_eq!(kind("/big.png").await, "payload_too_large");
    assert_eq!(kind("/fake.png").await, "malformed_payload");
    assert_eq!(kind("/missing.png").await, "transport");
}

#[tokio::test]
async fn test_seo_tool_forwards_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": METHOD_FROM_URL,
            "params": {"image_url": "https://cdn.example.com/shoe.jpg"}
        })))
        .respond_with(rpc_result(json!({
            "title": "Red Leather Sneaker",
            "description": "Handmade leather sneaker with rubber sole"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut gateway = ToolGateway::new();
    gateway
        .register(Arc::new(SeoAnalysisTool::new(RpcClient::new(server.uri()))))
        .unwrap();

    let call = ToolCall::from_json("c1", "seo_analysis", json!({"url": " https://cdn.example.com/shoe.jpg "}));
    let result = gateway.invoke(&call, None).await;
    assert!(result.is_success(), "{}", result.render());
    assert_eq!(
        result.payload,
        ToolPayload::Structured(json!({
            "title": "Red Leather Sneaker",
            "description": "Handmade leather sneaker with rubber sole"
        }))
    );
}

#[tokio::test]
async fn test_seo_tool_prefetch_sends_inline_image() {
    let server = MockServer::start().await;
    serve_image(&server, "/img/mug.png", PNG.to_vec(), "image/png").await;
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(json!({
            "method": METHOD_FROM_IMAGE,
            "params": {
                "image": STANDARD.encode(PNG),
                "content_type": "image/png",
                "filename": "mug.png"
            }
        })))
        .respond_with(rpc_result(json!({"title": "Mug", "description": "Ceramic"})))
        .expect(1)
        .mount(&server)
        .await;

    let tool = SeoAnalysisTool::new(RpcClient::new(format!("{}/rpc", server.uri())))
        .with_prefetch(PayloadFetcher::default());
    let mut gateway = ToolGateway::new();
    gateway.register(Arc::new(tool)).unwrap();

    let call = ToolCall::from_json("c1", "seo_analysis", json!({"url": format!("{}/img/mug.png", server.uri())}));
    let result = gateway.invoke(&call, None).await;
    assert!(result.is_success(), "{}", result.render());
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({"title": "t", "description": "d"})).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut gateway = ToolGateway::new();
    gateway
        .register(Arc::new(SeoAnalysisTool::new(RpcClient::new(server.uri()))))
        .unwrap();

    let call = ToolCall::from_json("c1", "seo_analysis", json!({"url": "https://cdn/x.jpg"}));
    let result = gateway.invoke(&call, Some(Duration::from_millis(100))).await;
    assert_eq!(result.error, Some(ToolError::timeout("seo_analysis", 100)));
}
