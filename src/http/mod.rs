//! HTTP transport used by every network step of a pipeline.
//!
//! The profiler issues exactly two kinds of request: text GETs (homepage,
//! manifest, path-to-packages mapping) and one JSON POST per component to the
//! render service. [`HttpTransport`] is the seam over those two calls so the
//! pipeline can run against [`ReqwestTransport`] in production and a scripted
//! transport in tests.
//!
//! Each call is a single suspension point that yields the response body or a
//! [`ProfilerError::NetworkError`]. Non-success statuses are errors.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::constants::CONNECT_TIMEOUT;
use crate::core::{ProfilerError, Result};

/// Asynchronous text-over-HTTP operations needed by the profiler.
pub trait HttpTransport: Send + Sync {
    /// GET `url` and return the body as text.
    fn get_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send;

    /// POST `body` as JSON to `url` and return the response body as text.
    fn post_json<B>(&self, url: &str, body: &B) -> impl Future<Output = Result<String>> + Send
    where
        B: Serialize + Sync;
}

/// [`HttpTransport`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests give up after `request_timeout`.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .user_agent(concat!("render-profile/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProfilerError::ConfigError {
                message: format!("cannot build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
        })
    }

    async fn read_body(operation: &str, url: &str, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(ProfilerError::network(operation, url, format!("HTTP {status}")));
        }

        response.text().await.map_err(|e| ProfilerError::network(operation, url, e))
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response =
            self.client.get(url).send().await.map_err(|e| ProfilerError::network("GET", url, e))?;
        Self::read_body("GET", url, response).await
    }

    async fn post_json<B>(&self, url: &str, body: &B) -> Result<String>
    where
        B: Serialize + Sync,
    {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProfilerError::network("POST", url, e))?;
        Self::read_body("POST", url, response).await
    }
}

/// Join `path` onto `origin`, tolerating a trailing slash on the origin.
///
/// `path` values that already carry a scheme are returned unchanged.
#[must_use]
pub fn join_origin(origin: &str, path: &str) -> String {
    if has_scheme(path) {
        return path.to_string();
    }
    if path.starts_with("//") {
        let scheme = origin.split_once("://").map_or("https", |(scheme, _)| scheme);
        return format!("{scheme}:{path}");
    }

    let origin = origin.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{origin}{path}")
    } else {
        format!("{origin}/{path}")
    }
}

/// Whether `url` starts with an RFC 3986 scheme such as `https:`.
#[must_use]
pub fn has_scheme(url: &str) -> bool {
    match url.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
