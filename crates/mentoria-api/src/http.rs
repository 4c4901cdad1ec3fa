//! HTTP wrapper around the MentorIA REST API.
//!
//! [`HttpClient`] resolves paths against the configured base URL, attaches the
//! persisted bearer token, and turns every non-2xx response into a normalized
//! [`ClientError`]. A 401 clears the persisted token before the error is
//! returned, so the next request goes out anonymously.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::token::TokenStore;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest raw body echoed back as an error message.
const MAX_RAW_ERROR_LEN: usize = 200;

/// Connection options for [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Base URL every path is resolved against.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    /// Creates options for the given base URL with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Shared HTTP client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn TokenStore>,
}

impl HttpClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the base URL is blank and
    /// `ClientError::Unknown` if the underlying client cannot be built.
    pub fn new(options: ClientOptions, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let base_url = options.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::validation("API base URL must not be empty"));
        }
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| ClientError::unknown(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url,
            http,
            tokens,
        })
    }

    /// The base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token store used for bearer authentication.
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Resolves a relative path against the base URL.
    ///
    /// A trailing slash on `path` is preserved; the backend distinguishes
    /// `/mentors/` from `/mentors`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return format!("{}/", self.base_url);
        }
        format!("{}/{path}", self.base_url)
    }

    // ========================================================================
    // Verbs
    // ========================================================================

    /// `GET path`, decoding the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.execute(Method::GET, path, |req| req).await?;
        decode(&body)
    }

    /// `POST path` with a JSON body.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.execute(Method::POST, path, |req| req.json(body)).await?;
        decode(&body)
    }

    /// `PUT path` with a JSON body.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.execute(Method::PUT, path, |req| req.json(body)).await?;
        decode(&body)
    }

    /// `PATCH path` with a JSON body.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .execute(Method::PATCH, path, |req| req.json(body))
            .await?;
        decode(&body)
    }

    /// `POST path` with an `application/x-www-form-urlencoded` body.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T> {
        let body = self
            .execute(Method::POST, path, |req| req.form(fields))
            .await?;
        decode(&body)
    }

    /// `POST path` with a `multipart/form-data` body.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let body = self
            .execute(Method::POST, path, |req| req.multipart(form))
            .await?;
        decode(&body)
    }

    /// `DELETE path`. Any body, including a 204 with none, is ignored.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, |req| req).await?;
        Ok(())
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn bearer_token(&self) -> Option<String> {
        match self.tokens.load() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token, sending request without it");
                None
            }
        }
    }

    async fn execute<F>(&self, method: Method, path: &str, configure: F) -> Result<Vec<u8>>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.url(path);
        let mut request = configure(self.http.request(method.clone(), &url));
        if let Some(token) = self.bearer_token() {
            request = request.bearer_auth(token);
        }

        debug!(method = %method, url = %url, "Sending request");
        let response = request.send().await.map_err(|e| {
            warn!(method = %method, url = %url, error = %e, "Request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(ClientError::from)?.to_vec();
        debug!(method = %method, url = %url, status = status.as_u16(), "Received response");

        if status.is_success() {
            return Ok(body);
        }

        let message = extract_error_message(status, &body);
        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %url, "Session rejected, clearing stored token");
            if let Err(e) = self.tokens.clear() {
                warn!(error = %e, "Failed to clear stored token");
            }
            return Err(ClientError::auth(message));
        }

        warn!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            message = %message,
            "API error"
        );
        Err(ClientError::api(status.as_u16(), message))
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice(b"null").map_err(ClientError::from);
    }
    serde_json::from_slice(body).map_err(ClientError::from)
}

/// Extracts a human-readable message from an error response body.
///
/// Tries, in order: a FastAPI `detail` string, a FastAPI validation `detail`
/// array (messages joined), a `message` field, an `error` field, a short
/// plain-text body, and finally a status-derived fallback.
#[must_use]
pub fn extract_error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
        match json.get("detail") {
            Some(serde_json::Value::String(detail)) if !detail.is_empty() => {
                return detail.clone();
            }
            Some(serde_json::Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
        for key in ["message", "error"] {
            if let Some(text) = json.get(key).and_then(serde_json::Value::as_str) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    } else {
        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        if !text.is_empty() && text.len() <= MAX_RAW_ERROR_LEN && !text.starts_with('<') {
            return text.to_string();
        }
    }
    format!("Request failed with status {}", status.as_u16())
}
