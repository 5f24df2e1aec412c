//! Package manifest discovery.
//!
//! The host application publishes its package manifest under a URL that may
//! embed a content hash and is not linked from any discoverable endpoint. The
//! only stable reference is the homepage markup, which mentions the manifest
//! URL inside a quoted string. Locating it is therefore a narrow pattern
//! match over the homepage, followed by a plain GET of the matched URL.
//!
//! Parsing the returned text lives in [`graph`].

pub mod graph;

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::constants::MANIFEST_URL_MARKER;
use crate::core::{ProfilerError, Result};
use crate::http::{HttpTransport, join_origin};

pub use graph::{DependencyMap, PackageDescriptor, PackageGraph, PackageUrlMap};

fn manifest_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let marker = regex::escape(MANIFEST_URL_MARKER);
        Regex::new(&format!(
            r#""([^"\s]*{marker}[^"\s]*)"|'([^'\s]*{marker}[^'\s]*)'"#
        ))
        .expect("manifest URL pattern is valid")
    })
}

/// Find the manifest URL referenced by the homepage markup.
///
/// Returns the first string containing `/package-manifest` that is opened and
/// closed by the same quote character, made absolute against `host_origin`
/// when it is relative.
pub fn extract_manifest_url(html: &str, host_origin: &str) -> Option<String> {
    manifest_url_regex()
        .captures(html)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| join_origin(host_origin, m.as_str()))
}

/// Fetch the raw manifest text published by `host_origin`.
///
/// # Errors
///
/// - [`ProfilerError::NetworkError`] if either the homepage or the manifest
///   request fails
/// - [`ProfilerError::ManifestNotFound`] if the homepage references no manifest
pub async fn locate_manifest<T: HttpTransport>(transport: &T, host_origin: &str) -> Result<String> {
    let homepage_url = join_origin(host_origin, "/");
    let homepage = transport.get_text(&homepage_url).await?;

    let manifest_url = extract_manifest_url(&homepage, host_origin).ok_or_else(|| {
        ProfilerError::ManifestNotFound {
            url: homepage_url.clone(),
        }
    })?;
    debug!("Found package manifest at {}", manifest_url);

    transport.get_text(&manifest_url).await
}
