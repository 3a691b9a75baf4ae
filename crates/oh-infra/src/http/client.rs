use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use oh_core::api::ApiError;
use oh_core::ids::VisitorId;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CSRF_COOKIE: &str = "csrftoken";
const CSRF_HEADER: &str = "X-CSRFToken";
const VISITOR_HEADER: &str = "X-Visitor-ID";

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub visitor_id: VisitorId,
}

/// Shared HTTP client for every backend port.
///
/// Cookies set by the backend (session, `csrftoken`) are kept in the jar and
/// replayed on later requests, the same way a browser would with
/// `credentials: "include"`.
pub struct BackendClient {
    http: reqwest::Client,
    cookies: Arc<Jar>,
    base_url: Url,
    visitor_id: VisitorId,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> anyhow::Result<Self> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| anyhow::anyhow!("Invalid API base URL '{}': {e}", config.base_url))?;

        let cookies = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_provider(Arc::clone(&cookies))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self {
            http,
            cookies,
            base_url,
            visitor_id: config.visitor_id,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current value of the `csrftoken` cookie for the backend origin.
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.base_url)?;
        let raw = header.to_str().ok()?;
        raw.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == CSRF_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
    }

    /// Loads cookies saved by [`BackendClient::save_cookies`] so a session
    /// survives between invocations. A missing file is not an error.
    pub async fn load_cookies(&self, path: &Path) -> anyhow::Result<usize> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read cookies: {}", path.display()))
            }
        };

        let mut restored = 0;
        for pair in content.split(';').map(str::trim).filter(|p| p.contains('=')) {
            self.cookies
                .add_cookie_str(&format!("{pair}; Path=/"), &self.base_url);
            restored += 1;
        }
        debug!(restored, "backend cookies restored");
        Ok(restored)
    }

    /// Writes the cookies the backend set for its origin. An empty jar removes
    /// the file.
    pub async fn save_cookies(&self, path: &Path) -> anyhow::Result<()> {
        let header = self
            .cookies
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_string));

        match header {
            Some(header) if !header.trim().is_empty() => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await.with_context(|| {
                        format!("Failed to create directory: {}", parent.display())
                    })?;
                }
                tokio::fs::write(path, header)
                    .await
                    .with_context(|| format!("Failed to write cookies: {}", path.display()))
            }
            _ => match tokio::fs::remove_file(path).await {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err)
                    .with_context(|| format!("Failed to remove cookies: {}", path.display())),
                _ => Ok(()),
            },
        }
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Transport(format!("invalid request path '{path}': {e}")))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        let mut builder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(VISITOR_HEADER, self.visitor_id.as_str());
        if let Some(token) = self.csrf_token() {
            builder = builder.header(CSRF_HEADER, token);
        }
        Ok(builder)
    }

    /// Sends the request and returns the parsed JSON body of a 2xx response.
    /// An empty body reads as `null`.
    pub(crate) async fn execute(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let path = response.url().path().to_string();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let error = ApiError::from_response(status.as_u16(), &body);
            warn!(%path, status = status.as_u16(), error = %error, "backend request rejected");
            return Err(error);
        }

        debug!(%path, status = status.as_u16(), "backend request succeeded");
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// `message` of a success body, or `fallback`.
pub(crate) fn message_or(value: &Value, fallback: &str) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Transport("request timed out".to_string())
    } else if err.is_connect() {
        ApiError::Transport(format!("could not reach the server: {err}"))
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Transport(err.to_string())
    }
}
