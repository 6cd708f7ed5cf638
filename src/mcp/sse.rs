//! Session-oriented SSE server.
//!
//! Unlike the stdio transport, this service keeps one long-lived SSE stream
//! per session and receives tool invocations on a separate POST endpoint:
//!
//! - `GET /sse`: opens a stream. The session id comes from the
//!   `X-MCP-Session-ID` header, or a fresh UUID is generated. The stream
//!   emits `connected` (with the session id), `open` (with the tool
//!   descriptors), then a `ping` every 30 seconds, interleaved with
//!   `message` events carrying tool results.
//! - `POST /messages`: a `toolInvocation` for a live session. The result is
//!   pushed over that session's stream; the POST itself only acknowledges.
//! - `GET /`: service info. `GET /_health`: upstream health, never
//!   authenticated.
//!
//! When a bearer token is configured, all routes except `/_health` require
//! `Authorization: Bearer <token>`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{sse::Event, IntoResponse, Response, Sse},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use futures_util::Stream;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::mcp::tools::ToolRegistry;
use crate::serper::SerperClient;

const PING_INTERVAL: Duration = Duration::from_secs(30);

/// One live SSE connection
struct SessionHandle {
    tx: mpsc::UnboundedSender<Value>,
    connected_at: DateTime<Utc>,
}

type SessionMap = Arc<RwLock<HashMap<String, SessionHandle>>>;

/// Shared state for all routes
#[derive(Clone)]
struct SseState {
    tools: Arc<ToolRegistry>,
    client: Arc<SerperClient>,
    sessions: SessionMap,
    token: Option<String>,
}

/// The SSE session server
#[derive(Clone)]
pub struct SseServer {
    state: SseState,
}

impl SseServer {
    /// Create a server over the given client and registry.
    ///
    /// `token` enables bearer authentication; `None` leaves the service open.
    pub fn new(client: Arc<SerperClient>, tools: ToolRegistry, token: Option<String>) -> Self {
        Self {
            state: SseState {
                tools: Arc::new(tools),
                client,
                sessions: Arc::new(RwLock::new(HashMap::new())),
                token,
            },
        }
    }

    /// Build the router (exposed separately for tests)
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(info_endpoint))
            .route("/sse", get(sse_endpoint))
            .route("/messages", post(messages_endpoint))
            .route("/_health", get(health_endpoint))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                require_bearer_token,
            ))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Bind and serve until the process is stopped
    pub async fn serve(&self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("SSE server listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router()).await
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.state
            .sessions
            .read()
            .map(|sessions| sessions.len())
            .unwrap_or(0)
    }
}

/// Removes its session from the map when the stream is dropped.
///
/// Removal is conditional on channel identity so that a reconnect (which
/// replaces the map entry) is not torn down by the old stream's teardown.
struct SessionGuard {
    sessions: SessionMap,
    session_id: String,
    tx: mpsc::UnboundedSender<Value>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Ok(mut sessions) = self.sessions.write() {
            if let Some(handle) = sessions.get(&self.session_id) {
                if handle.tx.same_channel(&self.tx) {
                    sessions.remove(&self.session_id);
                    tracing::info!(session_id = %self.session_id, "session closed");
                }
            }
        }
    }
}

/// Register a session, replacing any previous channel under the same id
fn register_session(
    state: &SseState,
    session_id: &str,
) -> (mpsc::UnboundedReceiver<Value>, SessionGuard) {
    let (tx, rx) = mpsc::unbounded_channel();

    let handle = SessionHandle {
        tx: tx.clone(),
        connected_at: Utc::now(),
    };

    if let Ok(mut sessions) = state.sessions.write() {
        if sessions.insert(session_id.to_string(), handle).is_some() {
            tracing::info!(session_id, "session channel replaced by reconnect");
        }
    }

    let guard = SessionGuard {
        sessions: state.sessions.clone(),
        session_id: session_id.to_string(),
        tx,
    };

    (rx, guard)
}

async fn sse_endpoint(
    State(state): State<SseState>,
    headers: HeaderMap,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = match headers
        .get("X-MCP-Session-ID")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
    {
        Some(id) => {
            tracing::info!(session_id = id, "reusing client-supplied session id");
            id.to_string()
        }
        None => {
            let id = Uuid::new_v4().to_string();
            tracing::info!(session_id = %id, "created new session");
            id
        }
    };

    let (mut rx, guard) = register_session(&state, &session_id);
    let tools = state.tools.descriptors();

    let stream = async_stream::stream! {
        // Guard lives as long as the stream; dropping it unregisters.
        let _guard = guard;

        yield Ok(Event::default()
            .event("connected")
            .data(json!({ "sessionId": session_id }).to_string()));

        yield Ok(Event::default()
            .event("open")
            .data(json!({ "tools": tools }).to_string()));

        let mut ping = tokio::time::interval(PING_INTERVAL);
        // The first tick fires immediately; the connected event covers that.
        ping.tick().await;

        loop {
            let event = tokio::select! {
                _ = ping.tick() => Event::default().event("ping").data(""),
                message = rx.recv() => match message {
                    Some(value) => Event::default().event("message").data(value.to_string()),
                    None => break,
                },
            };
            yield Ok(event);
        }
    };

    Sse::new(stream)
}

async fn messages_endpoint(
    State(state): State<SseState>,
    headers: HeaderMap,
    Json(message): Json<Value>,
) -> Response {
    let session_id = headers
        .get("X-MCP-Session-ID")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    // Clone the sender out so the lock is not held across the tool call
    let tx = state
        .sessions
        .read()
        .ok()
        .and_then(|sessions| sessions.get(session_id).map(|h| h.tx.clone()));

    let Some(tx) = tx else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid or expired session" })),
        )
            .into_response();
    };

    if message.get("type").and_then(|v| v.as_str()) != Some("toolInvocation") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid message type" })),
        )
            .into_response();
    }

    let Some(name) = message.get("name").and_then(|v| v.as_str()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing tool name" })),
        )
            .into_response();
    };

    let arguments = message
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    tracing::info!(session_id, tool = name, "tool invocation received");

    match state.tools.execute(name, arguments).await {
        Ok(result) => {
            let pushed = tx.send(json!({
                "type": "toolResult",
                "name": name,
                "result": result,
            }));

            if pushed.is_err() {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "invalid or expired session" })),
                )
                    .into_response();
            }

            Json(json!({ "status": "ok" })).into_response()
        }
        Err(error) => {
            tracing::warn!(session_id, tool = name, %error, "tool invocation failed");

            let _ = tx.send(json!({
                "type": "error",
                "error": error,
            }));

            Json(json!({ "status": "error", "message": error })).into_response()
        }
    }
}

async fn info_endpoint() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "MCP server for web search via the Serper API",
    }))
}

async fn health_endpoint(State(state): State<SseState>) -> Json<Value> {
    let serper = state.client.health().await;

    Json(json!({
        "status": if serper.is_healthy() { "ok" } else { "error" },
        "version": env!("CARGO_PKG_VERSION"),
        "serper": serper,
    }))
}

/// Bearer-token middleware. `/_health` is always exempt.
async fn require_bearer_token(
    State(state): State<SseState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.token.as_deref() else {
        return next.run(request).await;
    };

    if request.uri().path() == "/_health" {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(auth_header) = auth_header else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "missing authentication token" })),
        )
            .into_response();
    };

    let mut parts = auth_header.split_whitespace();
    let (scheme, token) = (parts.next(), parts.next());
    if parts.next().is_some()
        || !scheme.is_some_and(|s| s.eq_ignore_ascii_case("bearer"))
        || token.is_none()
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid authentication format" })),
        )
            .into_response();
    }

    if token != Some(expected) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "invalid token" })),
        )
            .into_response();
    }

    next.run(request).await
}
