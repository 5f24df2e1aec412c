//! Package ownership lookup for a component source path.
//!
//! Two strategies exist:
//!
//! - [`LocateStrategy::Queryable`]: ask the host for its path-to-packages
//!   mapping and take the first package listed for the component. Only
//!   development hosts serve that mapping.
//! - [`LocateStrategy::Heuristic`]: derive the package from the directory
//!   layout. A component under `<name>-package/` belongs to `<name>.js`.
//!
//! The strategy is chosen by a pure predicate on the host origin
//! ([`HostPolicy::strategy_for`]). Production hosts go straight to the
//! heuristic without touching the network. For every other host the queryable
//! strategy runs first and, if the mapping cannot be fetched or parsed, or has
//! no entry for the component, transitions to the heuristic. A host without
//! the mapping endpoint is taken to be production-like.
//!
//! A [`PackageLocator`] fetches the mapping once per run; every pipeline of
//! the run then reads the same copy.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_PRODUCTION_HOSTS, PACKAGE_DIR_SUFFIX, PATH_TO_PACKAGES_PATH};
use crate::core::{ProfilerError, Result};
use crate::http::{HttpTransport, join_origin};

/// How a component's owning package is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    /// Query the host's path-to-packages mapping, falling back to the heuristic.
    Queryable,
    /// Guess from the `<name>-package/` directory in the component path.
    Heuristic,
}

impl fmt::Display for LocateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queryable => write!(f, "queryable"),
            Self::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Which package owns a component, and which strategy produced the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedPackage {
    /// Package name, e.g. `content-library.js`.
    pub package: String,
    /// The strategy that produced `package`.
    pub strategy: LocateStrategy,
}

/// Classifies host origins as production or development.
#[derive(Debug, Clone)]
pub struct HostPolicy {
    production_hosts: Vec<Regex>,
}

impl HostPolicy {
    /// Build a policy from regex patterns matching production origins.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::ConfigError`] for an invalid pattern.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let production_hosts = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|e| ProfilerError::ConfigError {
                    message: format!("invalid production host pattern '{pattern}': {e}"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            production_hosts,
        })
    }

    /// Whether `host_origin` matches any production pattern.
    pub fn is_production(&self, host_origin: &str) -> bool {
        self.production_hosts.iter().any(|re| re.is_match(host_origin))
    }

    /// The first strategy to try for `host_origin`.
    pub fn strategy_for(&self, host_origin: &str) -> LocateStrategy {
        if self.is_production(host_origin) {
            LocateStrategy::Heuristic
        } else {
            LocateStrategy::Queryable
        }
    }
}

impl Default for HostPolicy {
    fn default() -> Self {
        Self {
            production_hosts: DEFAULT_PRODUCTION_HOSTS
                .iter()
                .map(|pattern| Regex::new(pattern).expect("default production host pattern is valid"))
                .collect(),
        }
    }
}

fn package_dir_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let suffix = regex::escape(PACKAGE_DIR_SUFFIX);
        Regex::new(&format!(r"(?:^|/)([^/]+){suffix}")).expect("package directory pattern is valid")
    })
}

/// Guess the owning package from the `<name>-package/` directory in `component_path`.
///
/// The innermost such directory wins when several are nested.
///
/// # Errors
///
/// Returns [`ProfilerError::PackageGuessError`] if no directory matches.
pub fn guess_package(component_path: &str) -> Result<String> {
    package_dir_regex()
        .captures_iter(component_path)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|segment| format!("{}.js", segment.as_str()))
        .ok_or_else(|| ProfilerError::PackageGuessError {
            path: component_path.to_string(),
        })
}

/// Component path → packages containing it, as served by development hosts.
pub type PathToPackages = HashMap<String, Vec<String>>;

/// Fetch the host's path-to-packages mapping.
pub async fn fetch_mapping<T: HttpTransport>(
    transport: &T,
    host_origin: &str,
) -> Result<PathToPackages> {
    let url = join_origin(host_origin, PATH_TO_PACKAGES_PATH);
    let body = transport.get_text(&url).await?;
    Ok(serde_json::from_str(&body)?)
}

/// Locates the owning package of every component in one run.
///
/// The mapping is fetched at most once, when the locator is prepared, and is
/// then only read. Components missing from it fall back to the heuristic one
/// by one.
#[derive(Debug, Clone, Default)]
pub struct PackageLocator {
    mapping: Option<PathToPackages>,
}

impl PackageLocator {
    /// Pick the strategy for `host_origin` and, for development hosts, fetch
    /// the mapping. A mapping that cannot be fetched or parsed leaves the
    /// locator on the heuristic.
    pub async fn prepare<T: HttpTransport>(
        transport: &T,
        policy: &HostPolicy,
        host_origin: &str,
    ) -> Self {
        let mapping = match policy.strategy_for(host_origin) {
            LocateStrategy::Queryable => match fetch_mapping(transport, host_origin).await {
                Ok(mapping) => {
                    debug!("Loaded package mapping for {} components", mapping.len());
                    Some(mapping)
                }
                Err(e) => {
                    warn!(
                        "Package mapping unavailable on {} ({}); guessing packages from paths instead",
                        host_origin, e
                    );
                    None
                }
            },
            LocateStrategy::Heuristic => {
                debug!("{} is a production host; skipping package mapping", host_origin);
                None
            }
        };

        Self {
            mapping,
        }
    }

    /// A locator that queries an already-loaded mapping first.
    pub fn with_mapping(mapping: PathToPackages) -> Self {
        Self {
            mapping: Some(mapping),
        }
    }

    /// Whether a mapping was loaded.
    pub fn has_mapping(&self) -> bool {
        self.mapping.is_some()
    }

    /// Determine which package owns `component_path`.
    ///
    /// # Errors
    ///
    /// Only the heuristic can fail: a component missing from the mapping falls
    /// back to it, and its [`ProfilerError::PackageGuessError`] is returned.
    pub fn locate(&self, component_path: &str) -> Result<LocatedPackage> {
        if let Some(mapping) = &self.mapping {
            match mapping.get(component_path).and_then(|packages| packages.first()) {
                Some(package) => {
                    debug!("{} belongs to {} (queryable)", component_path, package);
                    return Ok(LocatedPackage {
                        package: package.clone(),
                        strategy: LocateStrategy::Queryable,
                    });
                }
                None => warn!(
                    "{} is not listed in the package mapping; guessing from its path",
                    component_path
                ),
            }
        }

        let package = guess_package(component_path)?;
        debug!("{} belongs to {} (heuristic)", component_path, package);
        Ok(LocatedPackage {
            package,
            strategy: LocateStrategy::Heuristic,
        })
    }
}

/// Determine which package owns a single `component_path` on `host_origin`.
///
/// # Errors
///
/// See [`PackageLocator::locate`].
pub async fn locate_package<T: HttpTransport>(
    transport: &T,
    policy: &HostPolicy,
    component_path: &str,
    host_origin: &str,
) -> Result<LocatedPackage> {
    PackageLocator::prepare(transport, policy, host_origin).await.locate(component_path)
}
