//! `locate` command: show which package owns a component.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::ProfilerConfig;
use crate::http::ReqwestTransport;
use crate::locator::locate_package;

/// Show which package owns a component.
#[derive(Args, Debug)]
pub struct LocateCommand {
    /// Component source path, e.g. javascript/foo-package/bar.jsx
    component: String,
}

impl LocateCommand {
    pub async fn execute(self, settings: &ProfilerConfig) -> Result<()> {
        let transport = ReqwestTransport::new(settings.timeout())?;
        let policy = settings.host_policy()?;

        let located =
            locate_package(&transport, &policy, &self.component, &settings.host_origin).await?;

        println!("{} ({})", located.package.bold(), located.strategy.to_string().dimmed());
        Ok(())
    }
}
