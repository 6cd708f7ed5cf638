//! Integration tests for serper-mcp.
//!
//! The Serper API is mocked with mockito; the SSE router is exercised
//! in-process with tower's `oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use serper_mcp::mcp::{SseServer, ToolRegistry};
use serper_mcp::models::{AutocompleteQuery, ScrapeRequest, SearchRequest, SerpAnalysisRequest};
use serper_mcp::serper::{SearchVertical, SerperClient, SerperError};
use std::sync::Arc;
use tower::util::ServiceExt;

fn mock_client(server: &mockito::Server) -> SerperClient {
    SerperClient::new("test-key")
        .unwrap()
        .with_base_url(server.url())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn search_sends_payload_and_api_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/search")
        .match_header("X-API-KEY", "test-key")
        .match_body(mockito::Matcher::PartialJson(json!({
            "q": "rust web frameworks",
            "gl": "us",
            "hl": "en",
            "autocorrect": true,
        })))
        .with_status(200)
        .with_body(r#"{"organic":[{"title":"Axum","link":"https://example.com"}]}"#)
        .create_async()
        .await;

    let client = mock_client(&server);
    let request = SearchRequest::new("rust web frameworks");
    let result = client.search(SearchVertical::Web, &request).await.unwrap();

    assert_eq!(result["organic"][0]["title"], "Axum");
    mock.assert_async().await;
}

#[tokio::test]
async fn search_operators_travel_as_top_level_keys() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/search")
        .match_body(mockito::Matcher::PartialJson(json!({
            "q": "async runtime",
            "site": "github.com",
            "or": "tokio,smol",
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = mock_client(&server);
    let mut request = SearchRequest::new("async runtime");
    request.site = Some("github.com".to_string());
    request.or_terms = Some("tokio,smol".to_string());

    client.search(SearchVertical::Web, &request).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn verticals_hit_their_own_paths() {
    let mut server = mockito::Server::new_async().await;
    let news = server
        .mock("POST", "/news")
        .with_status(200)
        .with_body(r#"{"news":[]}"#)
        .create_async()
        .await;
    let scholar = server
        .mock("POST", "/scholar")
        .with_status(200)
        .with_body(r#"{"organic":[]}"#)
        .create_async()
        .await;

    let client = mock_client(&server);
    let request = SearchRequest::new("quantum computing");

    client
        .search(SearchVertical::News, &request)
        .await
        .unwrap();
    client
        .search(SearchVertical::Scholar, &request)
        .await
        .unwrap();

    news.assert_async().await;
    scholar.assert_async().await;
}

#[tokio::test]
async fn non_success_status_becomes_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/search")
        .with_status(403)
        .with_body("invalid api key")
        .create_async()
        .await;

    let client = mock_client(&server);
    let result = client
        .search(SearchVertical::Web, &SearchRequest::new("anything"))
        .await;

    match result {
        Err(SerperError::Api { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn scrape_uses_camel_case_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/scrape")
        .match_body(mockito::Matcher::Json(json!({
            "url": "https://example.com/article",
            "includeMarkdown": true,
        })))
        .with_status(200)
        .with_body(r#"{"text":"Article body"}"#)
        .create_async()
        .await;

    let client = mock_client(&server);
    let request = ScrapeRequest::new("https://example.com/article").include_markdown(true);
    let result = client.scrape(&request).await.unwrap();

    assert_eq!(result["text"], "Article body");
    mock.assert_async().await;
}

#[tokio::test]
async fn autocomplete_posts_array_and_wraps_response() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/autocomplete")
        .match_body(mockito::Matcher::Json(json!([
            {"q": "ai agents", "gl": "us", "hl": "en"},
            {"q": "rust mcp", "gl": "us", "hl": "en"},
        ])))
        .with_status(200)
        .with_body(r#"[{"suggestions":["ai agents framework"]}]"#)
        .create_async()
        .await;

    let client = mock_client(&server);
    let batch = vec![
        AutocompleteQuery::new("ai agents"),
        AutocompleteQuery::new("rust mcp"),
    ];
    let result = client.autocomplete(&batch).await.unwrap();

    assert_eq!(
        result["autocompleteData"][0]["suggestions"][0],
        "ai agents framework"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn analyze_serp_wraps_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/analyze-serp")
        .with_status(200)
        .with_body(r#"{"features":["knowledge_graph"]}"#)
        .create_async()
        .await;

    let client = mock_client(&server);
    let request: SerpAnalysisRequest =
        serde_json::from_value(json!({"query": "best crm"})).unwrap();
    let result = client.analyze_serp(&request).await.unwrap();

    assert_eq!(result["analyzedData"]["features"][0], "knowledge_graph");
}

#[tokio::test]
async fn health_reports_unhealthy_without_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(500)
        .create_async()
        .await;

    let client = mock_client(&server);
    let status = client.health().await;

    assert!(!status.is_healthy());
    assert!(status.error.unwrap().contains("500"));
}

#[tokio::test]
async fn registry_executes_tools_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/images")
        .with_status(200)
        .with_body(r#"{"images":[{"title":"A crab"}]}"#)
        .create_async()
        .await;

    let client = Arc::new(mock_client(&server));
    let registry = ToolRegistry::from_client(client);

    let result = registry
        .execute("image_search", json!({"q": "ferris", "gl": "us", "hl": "en"}))
        .await
        .unwrap();

    assert_eq!(result["images"][0]["title"], "A crab");
}

fn sse_server(token: Option<&str>, upstream: &mockito::Server) -> SseServer {
    let client = Arc::new(mock_client(upstream));
    let tools = ToolRegistry::from_client(client.clone());
    SseServer::new(client, tools, token.map(String::from))
}

/// Read raw SSE bytes until at least `min_events` complete event blocks arrived
async fn read_sse_prefix(body: Body, min_events: usize) -> String {
    use futures_util::StreamExt;

    let mut stream = body.into_data_stream();
    let mut buf = String::new();
    while buf.matches("\n\n").count() < min_events {
        let chunk = tokio::time::timeout(std::time::Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for SSE event")
            .expect("stream ended before enough events arrived")
            .expect("body error");
        buf.push_str(std::str::from_utf8(&chunk).unwrap());
    }
    buf
}

/// Parse SSE blocks into (event, data) pairs
fn parse_sse_events(raw: &str) -> Vec<(String, String)> {
    raw.split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            let mut event = String::new();
            let mut data = String::new();
            for line in block.lines() {
                if let Some(rest) = line.strip_prefix("event:") {
                    event = rest.trim().to_string();
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data.push_str(rest.trim());
                }
            }
            (event, data)
        })
        .collect()
}

#[tokio::test]
async fn sse_stream_honors_client_session_id_and_orders_events() {
    let server = mockito::Server::new_async().await;
    let router = sse_server(None, &server).router();

    let response = router
        .oneshot(
            Request::get("/sse")
                .header("X-MCP-Session-ID", "client-chosen-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    let raw = read_sse_prefix(response.into_body(), 2).await;
    let events = parse_sse_events(&raw);

    assert_eq!(events[0].0, "connected");
    let connected: Value = serde_json::from_str(&events[0].1).unwrap();
    assert_eq!(connected["sessionId"], "client-chosen-id");

    assert_eq!(events[1].0, "open");
    let open: Value = serde_json::from_str(&events[1].1).unwrap();
    let tools = open["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 18);
    assert!(tools.iter().any(|t| t["name"] == "google_search"));
}

#[tokio::test]
async fn sse_stream_generates_session_id_when_header_absent() {
    let server = mockito::Server::new_async().await;
    let router = sse_server(None, &server).router();

    let response = router
        .oneshot(Request::get("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let raw = read_sse_prefix(response.into_body(), 1).await;
    let events = parse_sse_events(&raw);

    assert_eq!(events[0].0, "connected");
    let connected: Value = serde_json::from_str(&events[0].1).unwrap();
    let session_id = connected["sessionId"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(session_id).is_ok());
}

#[tokio::test]
async fn info_endpoint_reports_service_metadata() {
    let server = mockito::Server::new_async().await;
    let router = sse_server(None, &server).router();

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["name"], "serper-mcp");
}

#[tokio::test]
async fn messages_without_session_is_rejected() {
    let server = mockito::Server::new_async().await;
    let router = sse_server(None, &server).router();

    let response = router
        .oneshot(
            Request::post("/messages")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"type": "toolInvocation", "name": "_health"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid or expired session");
}

#[tokio::test]
async fn auth_rejects_missing_and_malformed_headers() {
    let server = mockito::Server::new_async().await;
    let sse = sse_server(Some("secret"), &server);

    let response = sse
        .router()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = sse
        .router()
        .oneshot(
            Request::get("/")
                .header("Authorization", "Basic abc123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn auth_rejects_wrong_token_with_403() {
    let server = mockito::Server::new_async().await;
    let router = sse_server(Some("secret"), &server).router();

    let response = router
        .oneshot(
            Request::get("/")
                .header("Authorization", "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "invalid token");
}

#[tokio::test]
async fn auth_accepts_correct_token() {
    let server = mockito::Server::new_async().await;
    let router = sse_server(Some("secret"), &server).router();

    let response = router
        .oneshot(
            Request::get("/")
                .header("Authorization", "Bearer secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_route_is_exempt_from_auth() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(200)
        .create_async()
        .await;

    let router = sse_server(Some("secret"), &server).router();

    let response = router
        .oneshot(Request::get("/_health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["serper"]["status"], "healthy");
}

#[tokio::test]
async fn health_route_aggregates_upstream_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(503)
        .create_async()
        .await;

    let router = sse_server(None, &server).router();

    let response = router
        .oneshot(Request::get("/_health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["serper"]["status"], "unhealthy");
}
