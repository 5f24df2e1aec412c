//! Render profiler - measure how a single UI component renders
//!
//! The profiler asks a separate render service to render one component and
//! reports the size of the result. To build a correct render request it first
//! works out, for the target component, the complete and correctly ordered list
//! of bundle URLs ("packages") the component transitively depends on.
//!
//! # Architecture Overview
//!
//! Each component is profiled by a linear asynchronous pipeline:
//!
//! ```text
//! locate package ─▶ resolve dependencies ─▶ map to URLs ─▶ load fixture ─▶ POST /render
//! ```
//!
//! The package manifest that drives resolution is published by the host
//! application inside a script, referenced only from its homepage markup. It
//! is fetched and parsed once per run and shared read-only by all pipelines,
//! which run concurrently and fail independently.
//!
//! # Core Modules
//!
//! - [`manifest`] - Locate the manifest through the homepage and parse its package graph
//! - [`resolver`] - Transitive closure of a package in dependency-before-dependent order
//! - [`locator`] - Find the package owning a component (mapping query or path heuristic)
//! - [`fixture`] - Load example props and select one instance by seed
//! - [`render`] - Render requests, secret validation, and submission
//! - [`profile`] - Per-component pipelines and outcome reporting
//!
//! # Supporting Modules
//!
//! - [`cli`] - Command-line interface
//! - [`config`] - TOML configuration with CLI/env overrides
//! - [`core`] - Error types and user-facing error display
//! - [`http`] - HTTP transport seam over `reqwest`
//! - [`constants`] - Well-known paths, markers, and defaults
//! - [`utils`] - Progress indicators
//!
//! # Example
//!
//! ```rust,no_run
//! use render_profiler::http::ReqwestTransport;
//! use render_profiler::profile::{ProfileJob, Profiler};
//! use render_profiler::render::AcceptAll;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let profiler = Profiler::new(ReqwestTransport::new(Duration::from_secs(30))?)
//!     .with_host_origin("http://localhost:8080")
//!     .with_render_origin("http://localhost:8060")
//!     .with_validator(Box::new(AcceptAll));
//!
//! let graph = profiler.load_graph().await?;
//! let session = profiler.session(graph).await;
//! let job = ProfileJob::new("javascript/content-library-package/components/concept-thumbnail.jsx", 0);
//! profiler.profile(&job, &session).await.report();
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod fixture;
pub mod http;
pub mod locator;
pub mod manifest;
pub mod profile;
pub mod render;
pub mod resolver;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
