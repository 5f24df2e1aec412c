//! Integration test suite for render-profile
//!
//! End-to-end tests for profiling pipelines and the command-line interface.
//! Pipelines run against a scripted `StubTransport`; CLI tests run the built
//! binary and never need a live host or render service.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **pipeline**: Manifest loading, resolution, fixtures, and concurrent renders
//! - **cli**: Argument handling, config errors, and offline commands

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod pipeline;
