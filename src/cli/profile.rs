//! `profile` command: render components and report output sizes.

use anyhow::{Context, Result, bail};
use clap::Args;

use super::CliConfig;
use super::common::build_profiler;
use crate::config::ProfilerConfig;
use crate::profile::ProfileJob;
use crate::utils::ProgressBar;

/// Render components through the render service.
#[derive(Args, Debug)]
pub struct ProfileCommand {
    /// Components to profile, as COMPONENT or COMPONENT=FIXTURE
    ///
    /// Without a fixture, COMPONENT's extension is replaced by `.fixture.json`.
    #[arg(required = true, value_name = "COMPONENT[=FIXTURE]")]
    components: Vec<String>,

    /// Which fixture instance to render (taken modulo the instance count)
    #[arg(short, long, default_value_t = 0)]
    seed: u64,
}

impl ProfileCommand {
    /// The jobs described by the arguments.
    pub fn jobs(&self) -> Vec<ProfileJob> {
        self.components.iter().map(|arg| ProfileJob::from_arg(arg, self.seed)).collect()
    }

    pub async fn execute(self, settings: &ProfilerConfig, cli: &CliConfig) -> Result<()> {
        let profiler = build_profiler(settings)?;
        let jobs = self.jobs();

        let spinner = ProgressBar::new_spinner(!cli.no_progress);
        spinner.set_message(format!("Fetching package manifest from {}", settings.host_origin));
        let manifest = profiler.fetch_manifest().await;
        spinner.finish_and_clear();
        let manifest = manifest.context("Failed to fetch the package manifest")?;

        let progress = ProgressBar::new(jobs.len() as u64, !cli.no_progress);
        progress.set_message("Rendering");
        let outcomes = profiler
            .profile_manifest_with(&jobs, &manifest, |outcome| {
                progress.suspend(|| outcome.report());
                progress.inc(1);
            })
            .await;
        progress.finish_and_clear();

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        if failed > 0 {
            bail!("{failed} of {} components failed to render", outcomes.len());
        }
        Ok(())
    }
}
