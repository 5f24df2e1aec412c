//! `resolve` command: show a package's dependencies in load order.

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use super::CliConfig;
use super::common::build_profiler;
use crate::config::ProfilerConfig;
use crate::manifest::PackageGraph;
use crate::utils::ProgressBar;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Show a package's transitive dependencies in load order.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Package name as listed in the manifest, e.g. content-library.js
    package: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct ResolvedPackage<'a> {
    name: &'a str,
    url: Option<&'a str>,
}

impl ResolveCommand {
    pub async fn execute(self, settings: &ProfilerConfig, cli: &CliConfig) -> Result<()> {
        let profiler = build_profiler(settings)?;

        let spinner = ProgressBar::new_spinner(!cli.no_progress);
        spinner.set_message(format!("Fetching package manifest from {}", settings.host_origin));
        let graph = profiler.load_graph().await;
        spinner.finish_and_clear();
        let graph = graph.context("Failed to load the package manifest")?;

        if graph.url_of(&self.package).is_none() {
            bail!("Package '{}' is not listed in the manifest", self.package);
        }

        print!("{}", self.render(&graph)?);
        Ok(())
    }

    fn render(&self, graph: &PackageGraph) -> Result<String> {
        let order = graph.resolve(&self.package);
        let resolved: Vec<ResolvedPackage<'_>> = order
            .iter()
            .map(|name| ResolvedPackage {
                name,
                url: graph.url_of(name),
            })
            .collect();

        Ok(match self.format {
            OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&resolved)?),
            OutputFormat::Text => {
                let mut out = String::new();
                for (i, package) in resolved.iter().enumerate() {
                    let url = package.url.map_or_else(|| "(no url)".red().to_string(), str::to_string);
                    out.push_str(&format!("{:>3}. {} {}\n", i + 1, package.name.bold(), url.dimmed()));
                }
                out
            }
        })
    }
}
