//! Test utilities for the render profiler
//!
//! This module provides helpers shared by unit tests and the integration
//! suite: a scripted [`StubTransport`] standing in for the host application and
//! the render service, and once-only test logging.
//!
//! # Example
//!
//! ```rust,ignore
//! use render_profiler::test_utils::StubTransport;
//!
//! let transport = StubTransport::new()
//!     .with_get("http://localhost:8080/", "<script src=\"/package-manifest.js\">")
//!     .with_status("http://localhost:8080/package-manifest.js", 500);
//!
//! // ... run a pipeline against `transport`, then:
//! assert_eq!(transport.requests().len(), 2);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, Once};
use std::time::Duration;

use serde::Serialize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::{ProfilerError, Result};
use crate::http::HttpTransport;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Respects `RUST_LOG` when `level` is `None`; does nothing if neither is set.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

#[derive(Debug, Clone)]
enum StubResponse {
    Body(String),
    Status(u16),
    Delayed(Duration, String),
}

/// Scripted [`HttpTransport`] that records every request it receives.
///
/// URLs without a scripted response fail like an unreachable host.
#[derive(Debug, Default)]
pub struct StubTransport {
    gets: HashMap<String, StubResponse>,
    posts: HashMap<String, StubResponse>,
    post_rules: Vec<(String, String, StubResponse)>,
    requests: Mutex<Vec<String>>,
    posted: Mutex<Vec<serde_json::Value>>,
}

impl StubTransport {
    /// A transport with nothing scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `GET url` with `body`.
    #[must_use]
    pub fn with_get(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.gets.insert(url.into(), StubResponse::Body(body.into()));
        self
    }

    /// Answer `GET url` with a non-success HTTP `status`.
    #[must_use]
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.gets.insert(url.into(), StubResponse::Status(status));
        self
    }

    /// Answer `POST url` with `body`.
    #[must_use]
    pub fn with_post(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.posts.insert(url.into(), StubResponse::Body(body.into()));
        self
    }

    /// Answer `POST url` with a non-success HTTP `status`.
    #[must_use]
    pub fn with_post_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.posts.insert(url.into(), StubResponse::Status(status));
        self
    }

    /// Answer `POST url` with `body` after sleeping for `delay`.
    #[must_use]
    pub fn with_slow_post(
        mut self,
        url: impl Into<String>,
        delay: Duration,
        body: impl Into<String>,
    ) -> Self {
        self.posts.insert(url.into(), StubResponse::Delayed(delay, body.into()));
        self
    }

    /// Answer `POST url` with a non-success HTTP `status` when the JSON body
    /// contains `needle`. Rules take precedence over [`Self::with_post`].
    #[must_use]
    pub fn with_post_status_when(
        mut self,
        url: impl Into<String>,
        needle: impl Into<String>,
        status: u16,
    ) -> Self {
        self.post_rules.push((url.into(), needle.into(), StubResponse::Status(status)));
        self
    }

    /// Every request received so far, as `"GET url"` / `"POST url"`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// JSON bodies of every POST received so far.
    pub fn posted_bodies(&self) -> Vec<serde_json::Value> {
        self.posted.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn record(&self, method: &str, url: &str) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(format!("{method} {url}"));
        }
    }

    async fn respond(response: Option<StubResponse>, method: &str, url: &str) -> Result<String> {
        match response {
            Some(StubResponse::Body(body)) => Ok(body),
            Some(StubResponse::Status(status)) => {
                Err(ProfilerError::network(method, url, format!("HTTP {status}")))
            }
            Some(StubResponse::Delayed(delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            None => Err(ProfilerError::network(method, url, "connection refused")),
        }
    }
}

impl HttpTransport for StubTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.record("GET", url);
        Self::respond(self.gets.get(url).cloned(), "GET", url).await
    }

    async fn post_json<B>(&self, url: &str, body: &B) -> Result<String>
    where
        B: Serialize + Sync,
    {
        self.record("POST", url);
        let value = serde_json::to_value(body)?;
        let text = value.to_string();
        if let Ok(mut posted) = self.posted.lock() {
            posted.push(value);
        }

        let response = self
            .post_rules
            .iter()
            .find(|(rule_url, needle, _)| rule_url == url && text.contains(needle.as_str()))
            .map(|(_, _, response)| response.clone())
            .or_else(|| self.posts.get(url).cloned());
        Self::respond(response, "POST", url).await
    }
}
