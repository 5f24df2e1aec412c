//! Transitive closure of a package in load-safe order.
//!
//! A package's bundle can only be evaluated after every bundle it depends on,
//! so the render service must receive URLs in dependency-before-dependent
//! order. [`resolve`] produces that order with a depth-first traversal that
//! emits each package after all of its dependencies (post-order).
//!
//! # Properties
//!
//! - Every dependency appears at a lower index than each package depending on it
//!   (for acyclic input).
//! - No package appears twice, even when reached through several paths
//!   (diamonds).
//! - Cycles terminate: a package is marked seen before its dependencies are
//!   visited, so re-entering it is a no-op. Packages on a cycle are emitted
//!   exactly once, in traversal order.
//! - A dependency with no manifest entry is a leaf. A package may legitimately
//!   declare no dependencies, so this is not an error.
//! - Dependencies are visited in the order the manifest lists them, which
//!   makes the output deterministic for a given manifest.

use std::collections::HashSet;

use tracing::warn;

use crate::manifest::DependencyMap;

/// Compute the ordered transitive closure of `root`, root included.
pub fn resolve(root: &str, dependencies: &DependencyMap) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    visit(root, dependencies, &mut seen, &mut order);
    order
}

fn visit<'a>(
    package: &'a str,
    dependencies: &'a DependencyMap,
    seen: &mut HashSet<&'a str>,
    order: &mut Vec<String>,
) {
    if !seen.insert(package) {
        return;
    }

    match dependencies.get(package) {
        Some(deps) => {
            for dep in deps {
                visit(dep, dependencies, seen, order);
            }
        }
        None => warn!("Package '{}' has no manifest entry; treating it as a leaf", package),
    }

    order.push(package.to_string());
}
