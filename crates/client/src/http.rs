//! Shared HTTP client for the Petalbox REST backend.
//!
//! Every domain façade goes through [`ApiClient`], which:
//!
//! - resolves paths against the configured base URL
//! - attaches `Authorization: Bearer <token>` from the session unless the
//!   request opts out with [`RequestOptions::skip_auth`]
//! - decodes 2xx bodies as JSON (an empty body is `null`)
//! - applies the 401 policy: clear the session and report
//!   `Unauthorized { session_cleared: true }`, except for unauthenticated
//!   requests and third-party (Google) sessions, which are left alone

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionContext;

/// Per-request behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Send without the bearer token (public and sign-in endpoints).
    pub skip_auth: bool,
}

impl RequestOptions {
    /// Options for a public endpoint.
    #[must_use]
    pub const fn public() -> Self {
        Self { skip_auth: true }
    }
}

/// Petalbox backend client.
///
/// Cheap to clone; clones share the connection pool and the session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    login_path: String,
    session: SessionContext,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `config` sharing `session`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: SessionContext) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("petalbox/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
                login_path: config.login_path.clone(),
                session,
            }),
        })
    }

    /// The session this client reads its token from.
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    /// Sign-in route used by gate redirects.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.inner.login_path
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Execute a GET request.
    pub(crate) async fn get(&self, path: &str, opts: RequestOptions) -> Result<Value, ApiError> {
        self.send::<()>(Method::GET, path, &[], None, opts).await
    }

    /// Execute a GET request with query parameters.
    pub(crate) async fn get_query(
        &self,
        path: &str,
        query: &[(&str, String)],
        opts: RequestOptions,
    ) -> Result<Value, ApiError> {
        self.send::<()>(Method::GET, path, query, None, opts).await
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOptions,
    ) -> Result<Value, ApiError> {
        self.send(Method::POST, path, &[], Some(body), opts).await
    }

    /// Execute a PUT request with a JSON body.
    pub(crate) async fn put<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOptions,
    ) -> Result<Value, ApiError> {
        self.send(Method::PUT, path, &[], Some(body), opts).await
    }

    /// Execute a PATCH request with a JSON body.
    pub(crate) async fn patch<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOptions,
    ) -> Result<Value, ApiError> {
        self.send(Method::PATCH, path, &[], Some(body), opts).await
    }

    /// Execute a DELETE request.
    pub(crate) async fn delete(&self, path: &str, opts: RequestOptions) -> Result<Value, ApiError> {
        self.send::<()>(Method::DELETE, path, &[], None, opts).await
    }

    async fn send<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        opts: RequestOptions,
    ) -> Result<Value, ApiError> {
        let url = self.url(path)?;
        let mut request = self.inner.client.request(method.clone(), url);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if !opts.skip_auth
            && let Some(token) = self.inner.session.token()
        {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Request failed");
            ApiError::from(e)
        })?;
        tracing::debug!(%method, path, status = response.status().as_u16(), "Response");

        self.handle_response(response, opts).await
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        let joined = format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'));
        reqwest::Url::parse(&joined).map_err(|e| ApiError::Url(format!("{joined}: {e}")))
    }

    /// Handle API response and parse JSON.
    async fn handle_response(
        &self,
        response: reqwest::Response,
        opts: RequestOptions,
    ) -> Result<Value, ApiError> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::Decode(format!("Failed to parse response: {e}")));
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(self.on_unauthorized(opts));
        }

        Err(Self::parse_error(response).await)
    }

    /// Apply the 401 policy.
    fn on_unauthorized(&self, opts: RequestOptions) -> ApiError {
        if opts.skip_auth {
            return ApiError::Unauthorized {
                session_cleared: false,
            };
        }

        let session = &self.inner.session;
        if session.identity().is_some_and(|i| i.is_third_party()) {
            tracing::warn!("Backend rejected a third-party session token; keeping the session");
            return ApiError::Unauthorized {
                session_cleared: false,
            };
        }

        if let Err(e) = session.sign_out() {
            tracing::error!(error = %e, "Failed to clear stored session after 401");
        }
        tracing::info!("Session expired; signed out");
        ApiError::Unauthorized {
            session_cleared: true,
        }
    }

    /// Parse error response from the backend.
    async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| error_message(&body));
        ApiError::from_status(status, message)
    }
}

/// The backend's human-readable error text, if the body carries one.
fn error_message(body: &Value) -> Option<String> {
    petalbox_core::Payload::new(body).text(&[
        "message",
        "error.message",
        "error",
        "errors.0.message",
        "errors.0",
        "detail",
    ])
}
