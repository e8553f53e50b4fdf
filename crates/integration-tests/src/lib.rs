//! Integration tests for Petalbox.
//!
//! Each test serves a small `axum` router as a stand-in for the REST backend
//! and drives the real [`ApiClient`] against it over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p petalbox-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{Json, Router, routing::get};
//! use petalbox_integration_tests::StubBackend;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_packages() {
//!     let backend = StubBackend::spawn(
//!         Router::new().route("/packages", get(|| async { Json(json!([{"id": 1}])) })),
//!     )
//!     .await;
//!     let packages = backend.client().list_packages().await.unwrap();
//!     assert_eq!(packages.len(), 1);
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::Response;
use petalbox_client::{ApiClient, ClientConfig, SessionContext};
use petalbox_core::Identity;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One request as the stub backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub method: String,
    /// Path including the `/api` prefix.
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
struct RequestLog(Arc<Mutex<Vec<SeenRequest>>>);

async fn record(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let seen = SeenRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization: request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    if let Ok(mut entries) = log.0.lock() {
        entries.push(seen);
    }
    next.run(request).await
}

/// An in-process backend bound to an ephemeral port.
///
/// The server task is aborted when the value is dropped.
pub struct StubBackend {
    base_url: String,
    log: RequestLog,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Serve `routes` under `/api` on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn(routes: Router) -> Self {
        let log = RequestLog::default();
        let app = Router::new()
            .nest("/api", routes)
            .layer(middleware::from_fn_with_state(log.clone(), record));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let addr = listener
            .local_addr()
            .expect("Stub backend has no local address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}/api"),
            log,
            server,
        }
    }

    /// REST base URL, e.g. `http://127.0.0.1:41234/api`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected, which would be a bug here.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_api_url(&self.base_url).expect("Stub base URL is valid")
    }

    /// Client with an in-memory session.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        self.client_with(SessionContext::in_memory())
    }

    /// Client bound to `session`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client_with(&self, session: SessionContext) -> ApiClient {
        ApiClient::new(&self.config(), session).expect("Failed to build client")
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.log.0.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// The latest request for `method` and `path` (without the `/api` prefix).
    #[must_use]
    pub fn last_request(&self, method: &str, path: &str) -> Option<SeenRequest> {
        let full = format!("/api{path}");
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.method == method && r.path == full)
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// A staff member as the backend's login endpoint describes one.
#[must_use]
pub fn staff_user() -> Value {
    json!({
        "id": 7,
        "name": "Lan Tran",
        "email": "lan@petalbox.shop",
        "roles": [{"name": "ROLE_STAFF"}]
    })
}

/// An administrator.
#[must_use]
pub fn admin_user() -> Value {
    json!({
        "id": 1,
        "name": "Minh Admin",
        "email": "admin@petalbox.shop",
        "role": "ADMIN"
    })
}

/// A plain customer.
#[must_use]
pub fn customer_user() -> Value {
    json!({
        "id": 42,
        "name": "Mai Pham",
        "email": "mai@example.com",
        "role": "customer"
    })
}

/// Sign `client` in locally without a backend round trip.
///
/// # Panics
///
/// Panics if the session cannot be stored.
pub fn sign_in(client: &ApiClient, token: &str, user: Value) {
    client
        .session()
        .sign_in(token.to_string(), Identity::new(user))
        .expect("Failed to store session");
}
