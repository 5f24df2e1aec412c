//! Core types shared by every pipeline step
//!
//! Currently this is the error system: [`ProfilerError`] for typed failures
//! and [`ErrorContext`] / [`user_friendly_error`] for CLI display.

pub mod error;

pub use error::{ErrorContext, ProfilerError, user_friendly_error};

/// Result alias used by the library components.
pub type Result<T, E = ProfilerError> = std::result::Result<T, E>;
