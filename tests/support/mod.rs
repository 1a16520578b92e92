//! In-process mock backend for integration tests.
//!
//! Serves canned responses keyed by method and path and records every request
//! it receives, so tests can assert on what the probe actually sent.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
    pub delay: Option<Duration>,
}

impl Canned {
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        Self::text(status, &value.to_string())
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: Vec::new(),
            delay: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub apikey: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct Inner {
    routes: HashMap<(String, String), Canned>,
    hits: Vec<Hit>,
}

type Shared = Arc<Mutex<Inner>>;

pub struct MockBackend {
    base_url: String,
    state: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl MockBackend {
    /// Start a server on an ephemeral port. Unlisted routes answer 404.
    pub async fn spawn(routes: Vec<(&str, &str, Canned)>) -> Self {
        let mut inner = Inner::default();
        for (method, path, canned) in routes {
            inner
                .routes
                .insert((method.to_string(), path.to_string()), canned);
        }
        let state: Shared = Arc::new(Mutex::new(inner));

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend server");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.lock().unwrap().hits.clone()
    }

    /// Requests as `"METHOD /path"`, in arrival order
    pub fn hit_lines(&self) -> Vec<String> {
        self.hits()
            .iter()
            .map(|h| format!("{} {}", h.method, h.path))
            .collect()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.hits()
            .iter()
            .filter(|h| h.method == method && h.path == path)
            .count()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let canned = {
        let mut inner = state.lock().unwrap();
        inner.hits.push(Hit {
            method: method.to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            authorization: header("authorization"),
            apikey: header("apikey"),
            body,
        });
        inner
            .routes
            .get(&(method.to_string(), uri.path().to_string()))
            .cloned()
    };

    let canned =
        canned.unwrap_or_else(|| Canned::json(404, serde_json::json!({ "error": "Not Found" })));

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    let content_type = if serde_json::from_str::<serde_json::Value>(&canned.body).is_ok() {
        "application/json"
    } else {
        "text/plain"
    };

    let mut builder = Response::builder()
        .status(canned.status)
        .header("content-type", content_type);
    for (name, value) in &canned.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.body(Body::from(canned.body)).unwrap()
}
