//! Profiler configuration.
//!
//! Settings come from an optional TOML file and are then overridden by
//! command-line flags (which themselves fall back to environment variables).
//! The file is looked up at `--config PATH`, else at
//! `~/.render-profile/config.toml`; a missing default file means defaults.
//!
//! # Example
//!
//! ```toml
//! host_origin = "http://localhost:8080"
//! render_origin = "http://localhost:8060"
//! timeout_secs = 30
//! dev_mode = true
//! production_hosts = ['^https://www\.khanacademy\.org/?$']
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::constants::{
    DEFAULT_HOST_ORIGIN, DEFAULT_PIPELINE_TIMEOUT_SECS, DEFAULT_PRODUCTION_HOSTS,
    DEFAULT_RENDER_ORIGIN,
};
use crate::core::ProfilerError;
use crate::locator::HostPolicy;

fn default_host_origin() -> String {
    DEFAULT_HOST_ORIGIN.to_string()
}

fn default_render_origin() -> String {
    DEFAULT_RENDER_ORIGIN.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_PIPELINE_TIMEOUT_SECS
}

fn default_production_hosts() -> Vec<String> {
    DEFAULT_PRODUCTION_HOSTS.iter().map(|p| (*p).to_string()).collect()
}

/// Settings for one profiling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilerConfig {
    /// Origin of the host application serving the homepage and manifest.
    #[serde(default = "default_host_origin")]
    pub host_origin: String,

    /// Origin of the render service.
    #[serde(default = "default_render_origin")]
    pub render_origin: String,

    /// Bound on one component's pipeline, and on each HTTP request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Regex patterns identifying production host origins.
    #[serde(default = "default_production_hosts")]
    pub production_hosts: Vec<String>,

    /// Skip the render secret check.
    #[serde(default)]
    pub dev_mode: bool,

    /// Secret sent to the render service with each request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_secret: Option<String>,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            host_origin: default_host_origin(),
            render_origin: default_render_origin(),
            timeout_secs: default_timeout_secs(),
            production_hosts: default_production_hosts(),
            dev_mode: false,
            render_secret: None,
        }
    }
}

impl ProfilerConfig {
    /// Load from an explicit path, or from the default location if it exists.
    ///
    /// An explicit path must exist; the default one is optional.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(&path).await,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path).await,
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load and validate the config at `path`.
    pub async fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading profiler config from {}", path.display());
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .map_err(ProfilerError::from)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// `~/.render-profile/config.toml`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".render-profile").join("config.toml"))
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ProfilerError> {
        if self.timeout_secs == 0 {
            return Err(ProfilerError::ConfigError {
                message: "timeout_secs must be at least 1".to_string(),
            });
        }
        for (field, origin) in [("host_origin", &self.host_origin), ("render_origin", &self.render_origin)]
        {
            if !crate::http::has_scheme(origin) {
                return Err(ProfilerError::ConfigError {
                    message: format!("{field} must be an absolute URL, got '{origin}'"),
                });
            }
        }
        self.host_policy().map(|_| ())
    }

    /// Pipeline and request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Compile `production_hosts` into a [`HostPolicy`].
    pub fn host_policy(&self) -> Result<HostPolicy, ProfilerError> {
        HostPolicy::new(&self.production_hosts)
    }
}
