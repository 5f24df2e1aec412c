//! Connection settings shared by every command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::ProfilerConfig;
use crate::http::ReqwestTransport;
use crate::profile::Profiler;
use crate::render::validator_for;

/// Flags that override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Path to a config file (default: ~/.render-profile/config.toml)
    #[arg(short, long, global = true, env = "RENDER_PROFILE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Origin of the host application serving the package manifest
    #[arg(long, global = true, env = "RENDER_PROFILE_HOST")]
    pub host: Option<String>,

    /// Origin of the render service
    #[arg(long, global = true, env = "RENDER_PROFILE_RENDER_ORIGIN")]
    pub render_origin: Option<String>,

    /// Per-component timeout in seconds
    #[arg(long, global = true, env = "RENDER_PROFILE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Secret sent to the render service
    #[arg(long, global = true, env = "RENDER_PROFILE_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Development mode: do not require a render secret
    #[arg(long, global = true)]
    pub dev: bool,
}

impl ConnectionArgs {
    /// Load the config file and apply these overrides on top.
    pub async fn load(&self) -> Result<ProfilerConfig> {
        let config = ProfilerConfig::load_with_optional(self.config.clone()).await?;
        let config = self.apply(config);
        config.validate().context("Invalid profiler settings")?;
        Ok(config)
    }

    /// Apply flag values over `config`.
    #[must_use]
    pub fn apply(&self, mut config: ProfilerConfig) -> ProfilerConfig {
        if let Some(host) = &self.host {
            config.host_origin.clone_from(host);
        }
        if let Some(origin) = &self.render_origin {
            config.render_origin.clone_from(origin);
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if self.secret.is_some() {
            config.render_secret.clone_from(&self.secret);
        }
        config.dev_mode |= self.dev;
        config
    }
}

/// Build a profiler over real HTTP from validated settings.
pub fn build_profiler(config: &ProfilerConfig) -> Result<Profiler<ReqwestTransport>> {
    let transport = ReqwestTransport::new(config.timeout())?;
    Ok(Profiler::new(transport)
        .with_host_origin(config.host_origin.clone())
        .with_render_origin(config.render_origin.clone())
        .with_policy(config.host_policy()?)
        .with_validator(validator_for(config.dev_mode))
        .with_secret(config.render_secret.clone())
        .with_timeout(config.timeout()))
}
