//! Common test utilities - PaletteTest harness for end-to-end testing

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use paletted::{Config, Server};
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Bytes the mock provider returns as its "image"
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

/// API key the harness configures
pub const TEST_API_KEY: &str = "sk-test-key";

/// How the mock Stability endpoint answers
#[derive(Debug, Clone, Copy)]
pub enum MockMode {
    /// 200 with `FAKE_PNG`
    Image,
    /// 429 with a JSON `errors` array
    RateLimited,
}

#[derive(Clone)]
struct MockState {
    mode: MockMode,
    calls: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

/// Local stand-in for the Stability AI endpoint.
///
/// Requests that do not look like a Stable Image multipart call are
/// answered with 400 and an `errors` array.
pub struct MockStability {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<String>>>,
    _handle: JoinHandle<()>,
}

impl MockStability {
    /// Serve the mock on a random port
    pub async fn start(mode: MockMode) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let calls = Arc::new(AtomicUsize::new(0));
        let last_prompt = Arc::new(Mutex::new(None));

        let router = Router::new()
            .route("/v2beta/stable-image/generate/sd3", post(mock_generate))
            .with_state(MockState {
                mode,
                calls: calls.clone(),
                last_prompt: last_prompt.clone(),
            });

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("Mock provider error: {}", e);
            }
        });

        Ok(Self {
            addr,
            calls,
            last_prompt,
            _handle: handle,
        })
    }

    /// Generation endpoint URL
    pub fn url(&self) -> String {
        format!("http://{}/v2beta/stable-image/generate/sd3", self.addr)
    }

    /// Number of generation requests received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompt field of the last well-formed request
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }
}

/// Value of a multipart text field, as written by reqwest
fn form_field(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{}\"\r\n\r\n", name);
    let start = body.find(&marker)? + marker.len();
    let len = body[start..].find("\r\n--")?;
    Some(body[start..start + len].to_string())
}

/// Check the request against the Stable Image contract
fn check_request(headers: &HeaderMap, body: &str) -> Result<String, String> {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    if header_value(header::ACCEPT) != "image/*" {
        return Err("accept: must be image/*".to_string());
    }
    if !header_value(header::CONTENT_TYPE).starts_with("multipart/form-data") {
        return Err("content-type: must be multipart/form-data".to_string());
    }
    if form_field(body, "output_format").as_deref() != Some("png") {
        return Err("output_format: must be png".to_string());
    }
    if !body.contains("name=\"none\"; filename=\"none\"") {
        return Err("none: empty file part required".to_string());
    }
    form_field(body, "prompt")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| "prompt: required".to_string())
}

async fn mock_generate(State(state): State<MockState>, headers: HeaderMap, body: Bytes) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(&format!("Bearer {}", TEST_API_KEY)[..]);
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "name": "unauthorized", "message": "bad key" })),
        )
            .into_response();
    }

    match check_request(&headers, &String::from_utf8_lossy(&body)) {
        Ok(prompt) => *state.last_prompt.lock() = Some(prompt),
        Err(problem) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "name": "bad_request", "errors": [problem] })),
            )
                .into_response();
        }
    }

    match state.mode {
        MockMode::Image => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/png")],
            FAKE_PNG,
        )
            .into_response(),
        MockMode::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "errors": ["rate limited"] })),
        )
            .into_response(),
    }
}

/// Test harness that spawns a real paletted server on a random port
pub struct PaletteTest {
    pub addr: SocketAddr,
    pub client: Client,
    server: Arc<Server>,
    _handle: JoinHandle<()>,
}

impl PaletteTest {
    /// Start a server talking to the given provider URL
    pub async fn start(stability_api_url: String) -> Result<Self> {
        // Find a random available port
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);

        let config = Config {
            bind_addr: addr,
            db_path: None, // In-memory for tests
            stability_api_key: Some(TEST_API_KEY.to_string()),
            stability_api_url,
            redis_url: None,
        };

        let server = Arc::new(Server::new(config).await?);
        let server_clone = server.clone();

        // Spawn the server in a background task
        let handle = tokio::spawn(async move {
            if let Err(e) = server_clone.run().await {
                eprintln!("Server error: {}", e);
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;

        // Poll until server is ready (max 2 seconds)
        let mut ready = false;
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .is_ok()
            {
                ready = true;
                break;
            }
        }

        if !ready {
            panic!("Server failed to start within 2 seconds");
        }

        Ok(Self {
            addr,
            client,
            server,
            _handle: handle,
        })
    }

    /// Start a server backed by a fresh mock provider
    pub async fn with_mock(mode: MockMode) -> Result<(Self, MockStability)> {
        let mock = MockStability::start(mode).await?;
        let app = Self::start(mock.url()).await?;
        Ok((app, mock))
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .send()
            .await?)
    }

    /// Make an authenticated GET request
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}{}", self.base_url(), path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .json(body)
            .send()
            .await?)
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post_auth<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}{}", self.base_url(), path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Get direct access to the database for test setup/assertions
    pub fn db(&self) -> Arc<paletted::db::Database> {
        self.server.db()
    }

    /// Shutdown the server gracefully
    pub fn shutdown(&self) {
        self.server.shutdown();
    }

    /// Register and log in a user, returning the bearer token
    pub async fn login_new_user(&self, email: &str) -> Result<String> {
        let creds = json!({ "email": email, "password": "password123" });
        let resp = self.post("/api/auth/register", &creds).await?;
        anyhow::ensure!(resp.status() == 201, "register failed: {}", resp.status());

        let resp = self.post("/api/auth/login", &creds).await?;
        let body: Value = resp.json().await?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("no access_token in {}", body))
    }

    /// Insert a palette directly and return its ID
    pub async fn create_test_palette(&self, name: &str, hex_list: &[&str]) -> Result<i64> {
        let hex_json = serde_json::to_string(hex_list)?;
        let result = sqlx::query("INSERT INTO palettes (name, hex_list, description) VALUES (?, ?, ?)")
            .bind(name)
            .bind(hex_json)
            .bind("Test palette")
            .execute(self.db().pool())
            .await?;
        Ok(result.last_insert_rowid())
    }
}

impl Drop for PaletteTest {
    fn drop(&mut self) {
        self.shutdown();
    }
}
