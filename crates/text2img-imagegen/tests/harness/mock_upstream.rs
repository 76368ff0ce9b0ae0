//! Mock image generation upstream for integration tests
//!
//! Serves the Gitee / Ark style `images/generations` endpoint, the `DashScope`
//! multimodal `generation` endpoint, and a static file the JSON responses can
//! point at for download.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use base64::Engine;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Bytes served for every successfully generated image
pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nmock-image";

/// How the mock answers generation requests
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Point at a downloadable image
    Url,
    /// Inline the image as `b64_json`
    Base64,
    /// Fail with the given status and body
    Status(u16, &'static str),
    /// Succeed with an empty `data` array
    EmptyData,
    /// Succeed with an entry carrying neither URL nor data
    MissingImage,
    /// Point at a URL that answers 404
    BrokenDownload,
}

/// A generation request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    origin: String,
    reply: Mutex<Reply>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockUpstream {
    /// Start the mock server, returning immediately
    pub async fn start(reply: Reply) -> anyhow::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(MockState {
            origin: format!("http://{addr}"),
            reply: Mutex::new(reply),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/images/generations", routing::post(handle_images))
            .route("/aliyun/generation", routing::post(handle_aliyun))
            .route("/files/image.png", routing::get(handle_file))
            .with_state(Arc::clone(&state));

        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for the Gitee and Volcengine providers
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Base URL for the Aliyun provider
    pub fn aliyun_base_url(&self) -> String {
        format!("http://{}/aliyun", self.addr)
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.state.reply.lock().unwrap() = reply;
    }

    /// Generation requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl MockState {
    fn record(&self, path: &str, headers: &HeaderMap, body: Value) -> Reply {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        self.requests.lock().unwrap().push(RecordedRequest {
            path: path.to_owned(),
            authorization,
            body,
        });

        *self.reply.lock().unwrap()
    }

    fn image_url(&self) -> String {
        format!("{}/files/image.png", self.origin)
    }

    fn broken_url(&self) -> String {
        format!("{}/files/missing.png", self.origin)
    }
}

fn failure(status: u16, body: &'static str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, body).into_response()
}

async fn handle_images(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let data = match state.record("/v1/images/generations", &headers, body) {
        Reply::Status(status, body) => return failure(status, body),
        Reply::Url => json!([{ "url": state.image_url() }]),
        Reply::BrokenDownload => json!([{ "url": state.broken_url() }]),
        Reply::Base64 => json!([{ "b64_json": base64::engine::general_purpose::STANDARD.encode(IMAGE_BYTES) }]),
        Reply::EmptyData => json!([]),
        Reply::MissingImage => json!([{}]),
    };

    Json(json!({ "created": 1_700_000_000, "data": data })).into_response()
}

async fn handle_aliyun(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let image = match state.record("/aliyun/generation", &headers, body) {
        Reply::Status(status, body) => return failure(status, body),
        Reply::Url | Reply::Base64 => state.image_url(),
        Reply::BrokenDownload => state.broken_url(),
        Reply::EmptyData | Reply::MissingImage => {
            return Json(json!({ "output": { "choices": [] }, "request_id": "mock" })).into_response();
        }
    };

    Json(json!({
        "output": {
            "choices": [{
                "finish_reason": "stop",
                "message": { "role": "assistant", "content": [{ "image": image }] }
            }]
        },
        "request_id": "mock"
    }))
    .into_response()
}

async fn handle_file() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], IMAGE_BYTES)
}
