//! Error handling for the render profiler
//!
//! This module provides the error types and user-friendly error reporting for
//! the profiler. The error system follows two principles:
//! 1. **Strongly-typed errors** so each pipeline step fails with its own kind
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`ProfilerError`] - Enumerated error kinds for every failure in a pipeline
//! - [`ErrorContext`] - Wrapper that adds suggestions and details for display
//!
//! # Error Categories
//!
//! - **Network**: [`ProfilerError::NetworkError`], [`ProfilerError::Timeout`]
//! - **Manifest**: [`ProfilerError::ManifestNotFound`], [`ProfilerError::ManifestParseError`]
//! - **Packages**: [`ProfilerError::PackageGuessError`], [`ProfilerError::UnresolvedUrl`]
//! - **Inputs**: [`ProfilerError::FixtureLoadError`], [`ProfilerError::ConfigError`]
//!
//! Per-component failures are never shown through [`ErrorContext`]; the
//! orchestrator turns them into report lines. [`user_friendly_error`] is for
//! failures that abort the whole command, such as an unreachable manifest.
//!
//! # Examples
//!
//! ```rust,no_run
//! use render_profiler::core::{ProfilerError, user_friendly_error};
//!
//! let error = ProfilerError::ManifestNotFound {
//!     url: "http://localhost:8080/".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for profiler operations
///
/// Each variant names the pipeline step that failed and carries enough
/// context (URLs, paths, package names) to produce a useful report line.
#[derive(Error, Debug)]
pub enum ProfilerError {
    /// An HTTP request failed or returned a non-success status
    ///
    /// # Fields
    /// - `operation`: What the request was for (e.g., "fetch homepage")
    /// - `url`: The URL that was requested
    /// - `reason`: Transport error or HTTP status
    #[error("Network error during {operation} ({url}): {reason}")]
    NetworkError {
        /// What the request was for
        operation: String,
        /// The URL that was requested
        url: String,
        /// Transport error or HTTP status
        reason: String,
    },

    /// The homepage did not reference a package manifest
    #[error("No package manifest reference found in {url}")]
    ManifestNotFound {
        /// The homepage URL that was scanned
        url: String,
    },

    /// The package array could not be extracted from the manifest or parsed
    #[error("Failed to parse package manifest: {reason}")]
    ManifestParseError {
        /// Why extraction or parsing failed
        reason: String,
    },

    /// The filename heuristic found no `<name>-package/` directory
    #[error("Cannot guess the package owning '{path}'")]
    PackageGuessError {
        /// The component path that was inspected
        path: String,
    },

    /// The fixture file is missing, malformed, or has no instances
    #[error("Failed to load fixture {path}: {reason}")]
    FixtureLoadError {
        /// The fixture path
        path: String,
        /// Why loading failed
        reason: String,
    },

    /// A resolved package has no URL in the manifest
    #[error("Package '{package}' has no URL in the manifest")]
    UnresolvedUrl {
        /// The package name without a URL
        package: String,
    },

    /// A component's pipeline exceeded the configured bound
    #[error("Profiling '{component}' timed out after {limit:?}")]
    Timeout {
        /// The component whose pipeline was cancelled
        component: String,
        /// The bound that was exceeded
        limit: std::time::Duration,
    },

    /// The render service requires a secret and none is configured
    #[error("No render secret configured")]
    MissingRenderSecret,

    /// Configuration is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl ProfilerError {
    /// Shorthand for a [`ProfilerError::NetworkError`].
    pub fn network(
        operation: impl Into<String>,
        url: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Self::NetworkError {
            operation: operation.into(),
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a [`ProfilerError::FixtureLoadError`].
    pub fn fixture(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::FixtureLoadError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Error context wrapper that carries user-facing suggestions
///
/// Suggestions are printed in green, details in yellow, the error in red.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ProfilerError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: ProfilerError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`ProfilerError`] anywhere in the error chain, so errors wrapped
/// with [`anyhow::Context`] still get tailored suggestions. Anything else is
/// reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(profiler_error) =
        error.chain().find_map(|cause| cause.downcast_ref::<ProfilerError>())
    {
        return create_error_context(profiler_error);
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ProfilerError::Other {
        message,
    })
}

/// Rebuilds an owned copy of `error`, e.g. to wrap it in a context or to
/// report one failure against several components.
///
/// Source errors (json, toml) are not `Clone`; they are flattened into
/// [`ProfilerError::Other`] with the same message.
pub(crate) fn owned_copy(error: &ProfilerError) -> ProfilerError {
    match error {
        ProfilerError::NetworkError {
            operation,
            url,
            reason,
        } => ProfilerError::NetworkError {
            operation: operation.clone(),
            url: url.clone(),
            reason: reason.clone(),
        },
        ProfilerError::ManifestNotFound {
            url,
        } => ProfilerError::ManifestNotFound {
            url: url.clone(),
        },
        ProfilerError::ManifestParseError {
            reason,
        } => ProfilerError::ManifestParseError {
            reason: reason.clone(),
        },
        ProfilerError::PackageGuessError {
            path,
        } => ProfilerError::PackageGuessError {
            path: path.clone(),
        },
        ProfilerError::FixtureLoadError {
            path,
            reason,
        } => ProfilerError::FixtureLoadError {
            path: path.clone(),
            reason: reason.clone(),
        },
        ProfilerError::UnresolvedUrl {
            package,
        } => ProfilerError::UnresolvedUrl {
            package: package.clone(),
        },
        ProfilerError::Timeout {
            component,
            limit,
        } => ProfilerError::Timeout {
            component: component.clone(),
            limit: *limit,
        },
        ProfilerError::MissingRenderSecret => ProfilerError::MissingRenderSecret,
        ProfilerError::ConfigError {
            message,
        } => ProfilerError::ConfigError {
            message: message.clone(),
        },
        other => ProfilerError::Other {
            message: other.to_string(),
        },
    }
}

fn create_error_context(error: &ProfilerError) -> ErrorContext {
    let ctx = ErrorContext::new(owned_copy(error));
    match error {
        ProfilerError::NetworkError { .. } => ctx
            .with_suggestion("Check that the host origin is running and reachable, or pass --host")
            .with_details("The profiler needs the host homepage and its package manifest before any component can be rendered"),

        ProfilerError::ManifestNotFound { .. } => ctx
            .with_suggestion("Make sure --host points at the host application, not at the render service")
            .with_details("The homepage must reference a URL containing '/package-manifest'"),

        ProfilerError::ManifestParseError { .. } => ctx
            .with_suggestion("Open the manifest URL in a browser and check that it lists the \"javascript\" packages")
            .with_details("The package array is located between the \"javascript\" and \"stylesheets\" keys"),

        ProfilerError::PackageGuessError { path } => ctx
            .with_suggestion(format!(
                "Place '{path}' under a '<name>-package/' directory or profile against a development host"
            )),

        ProfilerError::MissingRenderSecret => ctx
            .with_suggestion("Set render_secret in the config file, pass --secret, or enable dev_mode")
            .with_details("The render service rejects requests without its shared secret"),

        ProfilerError::ConfigError { .. } | ProfilerError::TomlError(_) => ctx
            .with_suggestion("Check the profiler config file syntax and field names"),

        _ => ctx,
    }
}
