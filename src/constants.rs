//! Global constants used throughout the profiler.
//!
//! This module contains well-known host paths, extraction markers, default
//! origins and timeout durations. Defining them centrally keeps the
//! heuristics that depend on the host application's layout in one place.

use std::time::Duration;

/// Substring identifying the manifest document URL inside the host homepage.
///
/// The manifest filename may embed a content hash, so only this stable part
/// of the path is matched.
pub const MANIFEST_URL_MARKER: &str = "/package-manifest";

/// Key that introduces the package array inside the manifest document.
pub const MANIFEST_ARRAY_PREFIX: &str = "\"javascript\"";

/// Key that follows the package array inside the manifest document.
pub const MANIFEST_ARRAY_SUFFIX: &str = "\"stylesheets\"";

/// Path of the component-to-packages mapping served by development hosts.
pub const PATH_TO_PACKAGES_PATH: &str =
    "/_kake/genfiles/js_path_to_pkgs/en/path_to_packages_prod.json";

/// Path of the render endpoint on the render service.
pub const RENDER_ENDPOINT_PATH: &str = "/render";

/// Marker that terminates the directory owning a component in the
/// filename heuristic (`<name>-package/`).
pub const PACKAGE_DIR_SUFFIX: &str = "-package/";

/// Host application origin used when none is configured.
pub const DEFAULT_HOST_ORIGIN: &str = "http://localhost:8080";

/// Render service origin used when none is configured.
pub const DEFAULT_RENDER_ORIGIN: &str = "http://localhost:8060";

/// Patterns matching production host origins.
///
/// Production hosts never expose the path-to-packages mapping, so the
/// locator skips straight to the filename heuristic for them.
pub const DEFAULT_PRODUCTION_HOSTS: &[&str] =
    &[r"^https?://([a-z0-9-]+\.)*khanacademy\.org(:\d+)?/?$"];

/// Default bound on one component's whole pipeline (60 seconds).
pub const DEFAULT_PIPELINE_TIMEOUT_SECS: u64 = 60;

/// Timeout for establishing a TCP connection to either origin (10 seconds).
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Extension appended to a component's stem to find its default fixture.
pub const FIXTURE_EXTENSION: &str = "fixture.json";
