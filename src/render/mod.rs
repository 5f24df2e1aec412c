//! Render service requests.
//!
//! A [`RenderRequest`] carries the component's resolved bundle URLs (in load
//! order), its path relative to the bundle root, and the props to render with.
//! The render service answers with rendered text; its byte length is the
//! profiling signal.
//!
//! The render service may require a shared secret in the request body. Whether
//! that is enforced before submitting is decided by a [`SecretValidator`]
//! chosen once at startup: [`RequireSecret`] for normal runs, [`AcceptAll`]
//! for development.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::constants::RENDER_ENDPOINT_PATH;
use crate::core::{ProfilerError, Result};
use crate::http::{HttpTransport, join_origin};

/// Body of a `POST /render` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRequest {
    /// Bundle URLs, dependencies before dependents.
    pub urls: Vec<String>,
    /// Component path prefixed with `./`.
    pub path: String,
    /// Props for this render.
    pub props: Value,
    /// Shared secret expected by the render service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl RenderRequest {
    /// Build a request for `component_path`, adding the `./` prefix.
    pub fn new(urls: Vec<String>, component_path: &str, props: Value) -> Self {
        Self {
            urls,
            path: format!("./{}", component_path.trim_start_matches("./")),
            props,
            secret: None,
        }
    }

    /// Attach the render secret.
    #[must_use]
    pub fn with_secret(mut self, secret: Option<String>) -> Self {
        self.secret = secret;
        self
    }
}

/// Decides whether a render secret is acceptable before a request is sent.
pub trait SecretValidator: Send + Sync {
    /// Check the secret a request would carry.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::MissingRenderSecret`] when the secret is not acceptable.
    fn validate(&self, secret: Option<&str>) -> Result<()>;
}

/// Accepts every request, with or without a secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl SecretValidator for AcceptAll {
    fn validate(&self, _secret: Option<&str>) -> Result<()> {
        Ok(())
    }
}

/// Requires a non-blank secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireSecret;

impl SecretValidator for RequireSecret {
    fn validate(&self, secret: Option<&str>) -> Result<()> {
        match secret {
            Some(secret) if !secret.trim().is_empty() => Ok(()),
            _ => Err(ProfilerError::MissingRenderSecret),
        }
    }
}

/// Select the validator for a run.
#[must_use]
pub fn validator_for(dev_mode: bool) -> Box<dyn SecretValidator> {
    if dev_mode {
        Box::new(AcceptAll)
    } else {
        Box::new(RequireSecret)
    }
}

/// POST `request` to the render service and return the rendered text.
pub async fn submit<T: HttpTransport>(
    transport: &T,
    render_origin: &str,
    request: &RenderRequest,
) -> Result<String> {
    let url = join_origin(render_origin, RENDER_ENDPOINT_PATH);
    debug!("Rendering {} with {} bundles", request.path, request.urls.len());
    transport.post_json(&url, request).await
}
