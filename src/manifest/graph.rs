//! Package dependency graph built from the raw manifest text.
//!
//! The manifest is a script, not a data document. It contains one JSON array
//! of package entries under the `"javascript"` key, immediately followed by the
//! `"stylesheets"` key. That array is isolated with a bounded pattern and parsed
//! with `serde_json`; nothing else in the document is interpreted.
//!
//! Each entry yields one row in the [`DependencyMap`] and one in the
//! [`PackageUrlMap`]. The manifest format does not guarantee unique names, so
//! a repeated name overwrites the earlier entry (last write wins) and is
//! logged rather than rejected.

use std::collections::HashMap;
use std::sync::OnceLock;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::constants::{MANIFEST_ARRAY_PREFIX, MANIFEST_ARRAY_SUFFIX};
use crate::core::{ProfilerError, Result};
use crate::http::join_origin;
use crate::resolver;

/// Package name → names of the packages it depends on, in manifest order.
pub type DependencyMap = HashMap<String, Vec<String>>;

/// Package name → fully-qualified URL of its bundle.
pub type PackageUrlMap = HashMap<String, String>;

/// One package entry as listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageDescriptor {
    /// Unique package name, e.g. `content-library.js`.
    pub name: String,
    /// Path (or absolute URL) of the bundle.
    pub url: String,
    /// Names of the packages that must load first. Absent means none.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

fn package_array_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let prefix = regex::escape(MANIFEST_ARRAY_PREFIX);
        let suffix = regex::escape(MANIFEST_ARRAY_SUFFIX);
        Regex::new(&format!(r"(?s){prefix}\s*:\s*(\[.*?\])\s*,\s*{suffix}"))
            .expect("package array pattern is valid")
    })
}

/// Extract and parse the package entries embedded in `manifest_text`.
///
/// # Errors
///
/// Returns [`ProfilerError::ManifestParseError`] if the bounded array cannot
/// be found or is not a JSON array of package entries.
pub fn parse_packages(manifest_text: &str) -> Result<Vec<PackageDescriptor>> {
    let fragment = package_array_regex()
        .captures(manifest_text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ProfilerError::ManifestParseError {
            reason: format!(
                "no package array between {MANIFEST_ARRAY_PREFIX} and {MANIFEST_ARRAY_SUFFIX}"
            ),
        })?;

    serde_json::from_str(fragment.as_str()).map_err(|e| ProfilerError::ManifestParseError {
        reason: e.to_string(),
    })
}

/// Dependency and URL lookups for every package in one manifest snapshot.
///
/// Built once per run and shared read-only by all component pipelines.
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    dependencies: DependencyMap,
    urls: PackageUrlMap,
}

impl PackageGraph {
    /// Build the graph from raw manifest text, qualifying URLs against
    /// `host_origin`.
    pub fn from_manifest(manifest_text: &str, host_origin: &str) -> Result<Self> {
        let packages = parse_packages(manifest_text)?;
        debug!("Parsed {} package entries from manifest", packages.len());
        Ok(Self::from_packages(packages, host_origin))
    }

    /// Build the graph from already-parsed entries.
    pub fn from_packages(
        packages: impl IntoIterator<Item = PackageDescriptor>,
        host_origin: &str,
    ) -> Self {
        let mut graph = Self::default();

        for package in packages {
            let url = join_origin(host_origin, &package.url);
            if graph.dependencies.insert(package.name.clone(), package.dependencies).is_some() {
                warn!("Package '{}' is listed more than once; keeping the last entry", package.name);
            }
            graph.urls.insert(package.name, url);
        }

        graph
    }

    /// The `name → dependencies` adjacency map.
    pub fn dependencies(&self) -> &DependencyMap {
        &self.dependencies
    }

    /// The `name → url` lookup.
    pub fn urls(&self) -> &PackageUrlMap {
        &self.urls
    }

    /// URL of a single package, if the manifest lists it.
    pub fn url_of(&self, package: &str) -> Option<&str> {
        self.urls.get(package).map(String::as_str)
    }

    /// Number of packages in the manifest.
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// Whether the manifest listed no packages.
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Transitive closure of `root` in dependency-before-dependent order.
    pub fn resolve(&self, root: &str) -> Vec<String> {
        resolver::resolve(root, &self.dependencies)
    }

    /// Map a resolved order to bundle URLs, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::UnresolvedUrl`] for the first package that has
    /// no manifest entry.
    pub fn urls_for(&self, order: &[String]) -> Result<Vec<String>> {
        order
            .iter()
            .map(|name| {
                self.url_of(name).map(str::to_string).ok_or_else(|| ProfilerError::UnresolvedUrl {
                    package: name.clone(),
                })
            })
            .collect()
    }

    /// Groups of packages that depend on each other in a cycle.
    ///
    /// A well-formed manifest has none; resolution still terminates when
    /// cycles exist, but their load order is arbitrary. Each group is sorted
    /// by name, and the groups themselves are sorted for stable output.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        for name in self.dependencies.keys().chain(self.dependencies.values().flatten()) {
            indices.entry(name.as_str()).or_insert_with(|| graph.add_node(name.as_str()));
        }

        for (name, deps) in &self.dependencies {
            let from = indices[name.as_str()];
            for dep in deps {
                graph.update_edge(from, indices[dep.as_str()], ());
            }
        }

        let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut names: Vec<String> = scc.iter().map(|&idx| graph[idx].to_string()).collect();
                names.sort();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }
}

/// Build the `(DependencyMap, PackageUrlMap)` pair for `manifest_text`.
pub fn build_graph(manifest_text: &str, host_origin: &str) -> Result<(DependencyMap, PackageUrlMap)> {
    let graph = PackageGraph::from_manifest(manifest_text, host_origin)?;
    Ok((graph.dependencies, graph.urls))
}
