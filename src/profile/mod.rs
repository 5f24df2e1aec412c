//! Per-component profiling pipelines.
//!
//! A [`Profiler`] runs one pipeline per [`ProfileJob`]:
//!
//! 1. locate the package owning the component ([`crate::locator`])
//! 2. resolve its transitive dependencies in load order ([`crate::resolver`])
//! 3. map them to bundle URLs through the shared [`PackageGraph`]
//! 4. load the fixture and select props by seed ([`crate::fixture`])
//! 5. POST the [`RenderRequest`] and measure the response size
//!
//! Steps within a pipeline are strictly sequential. Pipelines for different
//! components run concurrently on the same task and share nothing mutable: the
//! manifest and the package mapping are fetched once into a [`ProfileSession`],
//! then read by every pipeline. Each pipeline is bounded by a timeout, and any
//! failure, timeout included, becomes that component's [`ProfileOutcome`]
//! instead of aborting its siblings. A manifest that fails to parse is such a
//! failure too: every component of the run reports it.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_HOST_ORIGIN, DEFAULT_PIPELINE_TIMEOUT_SECS, DEFAULT_RENDER_ORIGIN};
use crate::core::error::owned_copy;
use crate::core::{ProfilerError, Result};
use crate::fixture::{default_fixture_path, load_props};
use crate::http::HttpTransport;
use crate::locator::{HostPolicy, PackageLocator};
use crate::manifest::{PackageGraph, locate_manifest};
use crate::render::{RenderRequest, RequireSecret, SecretValidator, submit};

/// One component to profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileJob {
    /// Component source path relative to the bundle root.
    pub component_path: String,
    /// Fixture supplying the props.
    pub fixture_path: PathBuf,
    /// Selects which fixture instance to render.
    pub seed: u64,
}

impl ProfileJob {
    /// A job using the component's default fixture path.
    pub fn new(component_path: impl Into<String>, seed: u64) -> Self {
        let component_path = component_path.into();
        let fixture_path = default_fixture_path(&component_path);
        Self {
            component_path,
            fixture_path,
            seed,
        }
    }

    /// Parse a `COMPONENT[=FIXTURE]` command-line argument.
    pub fn from_arg(arg: &str, seed: u64) -> Self {
        match arg.split_once('=') {
            Some((component, fixture)) if !fixture.is_empty() => Self {
                component_path: component.to_string(),
                fixture_path: PathBuf::from(fixture),
                seed,
            },
            Some((component, _)) => Self::new(component, seed),
            None => Self::new(arg, seed),
        }
    }

    /// Use an explicit fixture path.
    #[must_use]
    pub fn with_fixture(mut self, fixture_path: impl Into<PathBuf>) -> Self {
        self.fixture_path = fixture_path.into();
        self
    }
}

/// The reported result of one component's pipeline.
#[derive(Debug)]
pub struct ProfileOutcome {
    /// The component that was profiled.
    pub component_path: String,
    /// Rendered size in bytes, or why the pipeline failed.
    pub result: Result<usize>,
}

impl ProfileOutcome {
    /// Whether the render succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Print the outcome line to stdout (successes) or stderr (failures).
    pub fn report(&self) {
        match &self.result {
            Ok(bytes) => println!("{}: {}", self.component_path, format!("{bytes} bytes").green()),
            Err(e) => eprintln!("{}: {}", self.component_path, e.to_string().red()),
        }
    }
}

impl fmt::Display for ProfileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(bytes) => write!(f, "{}: {} bytes", self.component_path, bytes),
            Err(e) => write!(f, "{}: {}", self.component_path, e),
        }
    }
}

/// Read-only state shared by every pipeline of one run.
#[derive(Debug, Clone)]
pub struct ProfileSession {
    graph: PackageGraph,
    locator: PackageLocator,
}

impl ProfileSession {
    /// A session over an already-built graph and locator.
    pub fn new(graph: PackageGraph, locator: PackageLocator) -> Self {
        Self {
            graph,
            locator,
        }
    }

    /// The package graph parsed from the manifest.
    pub fn graph(&self) -> &PackageGraph {
        &self.graph
    }

    /// The package locator for this run's host.
    pub fn locator(&self) -> &PackageLocator {
        &self.locator
    }
}

/// Runs profiling pipelines against one host and one render service.
pub struct Profiler<T> {
    transport: T,
    policy: HostPolicy,
    validator: Box<dyn SecretValidator>,
    host_origin: String,
    render_origin: String,
    secret: Option<String>,
    timeout: Duration,
}

impl<T: HttpTransport> Profiler<T> {
    /// A profiler with default origins, host policy, timeout, and
    /// [`RequireSecret`] validation.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: HostPolicy::default(),
            validator: Box::new(RequireSecret),
            host_origin: DEFAULT_HOST_ORIGIN.to_string(),
            render_origin: DEFAULT_RENDER_ORIGIN.to_string(),
            secret: None,
            timeout: Duration::from_secs(DEFAULT_PIPELINE_TIMEOUT_SECS),
        }
    }

    /// Origin of the host application serving the manifest.
    #[must_use]
    pub fn with_host_origin(mut self, origin: impl Into<String>) -> Self {
        self.host_origin = origin.into();
        self
    }

    /// Origin of the render service.
    #[must_use]
    pub fn with_render_origin(mut self, origin: impl Into<String>) -> Self {
        self.render_origin = origin.into();
        self
    }

    /// Production host classification.
    #[must_use]
    pub fn with_policy(mut self, policy: HostPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Secret check applied before each render request.
    #[must_use]
    pub fn with_validator(mut self, validator: Box<dyn SecretValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Secret sent with each render request.
    #[must_use]
    pub fn with_secret(mut self, secret: Option<String>) -> Self {
        self.secret = secret;
        self
    }

    /// Upper bound on one component's whole pipeline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The transport requests go through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Host origin requests are made against.
    pub fn host_origin(&self) -> &str {
        &self.host_origin
    }

    /// Fetch the host's raw manifest text.
    pub async fn fetch_manifest(&self) -> Result<String> {
        locate_manifest(&self.transport, &self.host_origin).await
    }

    /// Parse manifest text into a graph qualified against the host origin.
    ///
    /// Cycles are logged; resolution still terminates on them.
    pub fn parse_graph(&self, manifest_text: &str) -> Result<PackageGraph> {
        let graph = PackageGraph::from_manifest(manifest_text, &self.host_origin)?;

        for cycle in graph.cycles() {
            warn!("Dependency cycle in manifest: {}", cycle.join(" ↔ "));
        }
        info!("Loaded manifest with {} packages from {}", graph.len(), self.host_origin);
        Ok(graph)
    }

    /// Fetch and parse the host's manifest.
    pub async fn load_graph(&self) -> Result<PackageGraph> {
        let manifest_text = self.fetch_manifest().await?;
        self.parse_graph(&manifest_text)
    }

    /// Pair `graph` with a locator prepared for the host, fetching the
    /// package mapping once when the host serves one.
    pub async fn session(&self, graph: PackageGraph) -> ProfileSession {
        let locator = PackageLocator::prepare(&self.transport, &self.policy, &self.host_origin).await;
        ProfileSession::new(graph, locator)
    }

    /// Bundle URLs the render service needs for `component_path`, in load order.
    pub fn resolve_urls(&self, component_path: &str, session: &ProfileSession) -> Result<Vec<String>> {
        let located = session.locator.locate(component_path)?;
        let order = session.graph.resolve(&located.package);
        debug!("{} resolves to {} packages: {:?}", located.package, order.len(), order);
        session.graph.urls_for(&order)
    }

    async fn run_pipeline(&self, job: &ProfileJob, session: &ProfileSession) -> Result<usize> {
        let urls = self.resolve_urls(&job.component_path, session)?;
        let props = load_props(&job.fixture_path, job.seed).await?;

        self.validator.validate(self.secret.as_deref())?;
        let request =
            RenderRequest::new(urls, &job.component_path, props).with_secret(self.secret.clone());

        let rendered = submit(&self.transport, &self.render_origin, &request).await?;
        Ok(rendered.len())
    }

    /// Profile one component within a session.
    ///
    /// Never fails: errors and timeouts are captured in the outcome.
    pub async fn profile(&self, job: &ProfileJob, session: &ProfileSession) -> ProfileOutcome {
        let result = match tokio::time::timeout(self.timeout, self.run_pipeline(job, session)).await {
            Ok(result) => result,
            Err(_) => Err(ProfilerError::Timeout {
                component: job.component_path.clone(),
                limit: self.timeout,
            }),
        };

        match &result {
            Ok(bytes) => info!("Rendered {} ({} bytes)", job.component_path, bytes),
            Err(e) => warn!("Failed to profile {}: {}", job.component_path, e),
        }

        ProfileOutcome {
            component_path: job.component_path.clone(),
            result,
        }
    }

    /// Profile every job concurrently, calling `on_outcome` as each finishes.
    ///
    /// Outcomes are returned in completion order.
    pub async fn profile_all_with<F>(
        &self,
        jobs: &[ProfileJob],
        session: &ProfileSession,
        mut on_outcome: F,
    ) -> Vec<ProfileOutcome>
    where
        F: FnMut(&ProfileOutcome),
    {
        let mut pending: FuturesUnordered<_> =
            jobs.iter().map(|job| self.profile(job, session)).collect();

        let mut outcomes = Vec::with_capacity(jobs.len());
        while let Some(outcome) = pending.next().await {
            on_outcome(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Profile every job concurrently.
    pub async fn profile_all(&self, jobs: &[ProfileJob], session: &ProfileSession) -> Vec<ProfileOutcome> {
        self.profile_all_with(jobs, session, |_| {}).await
    }

    /// Parse `manifest_text` once and profile every job against it.
    ///
    /// A manifest that fails to parse is reported as a failure of every job,
    /// in job order, and nothing is rendered.
    pub async fn profile_manifest_with<F>(
        &self,
        jobs: &[ProfileJob],
        manifest_text: &str,
        mut on_outcome: F,
    ) -> Vec<ProfileOutcome>
    where
        F: FnMut(&ProfileOutcome),
    {
        match self.parse_graph(manifest_text) {
            Ok(graph) => {
                let session = self.session(graph).await;
                self.profile_all_with(jobs, &session, on_outcome).await
            }
            Err(e) => {
                warn!("Package manifest from {} is unusable: {}", self.host_origin, e);
                jobs
                    .iter()
                    .map(|job| {
                        let outcome = ProfileOutcome {
                            component_path: job.component_path.clone(),
                            result: Err(owned_copy(&e)),
                        };
                        on_outcome(&outcome);
                        outcome
                    })
                    .collect()
            }
        }
    }
}
