//! Fixture loading and seeded prop selection.
//!
//! A fixture supplies example prop sets for one component as a JSON document
//! with an `instances` array. The document may be wrapped as a script module
//! (`module.exports = {...};` or `export default {...};`); the wrapper is
//! stripped before parsing and nothing else is evaluated.
//!
//! Selection is `instances[seed % instances.len()]`, so a given seed always
//! picks the same prop set from the same fixture.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::constants::FIXTURE_EXTENSION;
use crate::core::{ProfilerError, Result};

/// Example prop sets for one component.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Fixture {
    /// Prop sets, selected by seed. Never empty once loaded.
    pub instances: Vec<Value>,
}

fn module_wrapper_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*(?:module\.exports\s*=|export\s+default)\s*(.*?)\s*;?\s*$")
            .expect("fixture wrapper pattern is valid")
    })
}

impl Fixture {
    /// Parse fixture text, stripping a script module wrapper if present.
    ///
    /// # Errors
    ///
    /// Returns [`ProfilerError::FixtureLoadError`] if the text is not a
    /// fixture document or has no instances.
    pub fn parse(text: &str, origin: &str) -> Result<Self> {
        let document = module_wrapper_regex()
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map_or(text, |m| m.as_str());

        let fixture: Self =
            serde_json::from_str(document).map_err(|e| ProfilerError::fixture(origin, e))?;

        if fixture.instances.is_empty() {
            return Err(ProfilerError::fixture(origin, "fixture has no instances"));
        }
        Ok(fixture)
    }

    /// Read and parse the fixture at `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ProfilerError::fixture(origin.clone(), e))?;

        let fixture = Self::parse(&text, &origin)?;
        debug!("Loaded {} instances from {}", fixture.instances.len(), origin);
        Ok(fixture)
    }

    /// Prop set for `seed`: `instances[seed % instances.len()]`.
    ///
    /// Returns `None` only for a fixture built by hand with no instances.
    pub fn select(&self, seed: u64) -> Option<&Value> {
        let count = u64::try_from(self.instances.len()).ok().filter(|&n| n > 0)?;
        let index = usize::try_from(seed % count).ok()?;
        self.instances.get(index)
    }
}

/// Load the fixture at `path` and return the props chosen by `seed`.
///
/// # Errors
///
/// Returns [`ProfilerError::FixtureLoadError`] if the file cannot be read,
/// does not parse, or has zero instances.
pub async fn load_props(path: &Path, seed: u64) -> Result<Value> {
    let fixture = Fixture::load(path).await?;
    fixture
        .select(seed)
        .cloned()
        .ok_or_else(|| ProfilerError::fixture(path.display().to_string(), "fixture has no instances"))
}

/// Fixture path used when a job does not name one: the component path with
/// its extension replaced by `fixture.json`.
#[must_use]
pub fn default_fixture_path(component_path: &str) -> PathBuf {
    Path::new(component_path).with_extension(FIXTURE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_fixture(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_select_wraps_seed() {
        let fixture = Fixture::parse(r#"{"instances": [{"n": 0}, {"n": 1}]}"#, "f").unwrap();

        assert_eq!(fixture.select(0), Some(&json!({"n": 0})));
        assert_eq!(fixture.select(1), Some(&json!({"n": 1})));
        assert_eq!(fixture.select(2), Some(&json!({"n": 0})));
        assert_eq!(fixture.select(u64::MAX), Some(&json!({"n": 1})));
    }

    #[test]
    fn test_select_on_empty_fixture() {
        let fixture = Fixture {
            instances: vec![],
        };
        assert_eq!(fixture.select(3), None);
    }

    #[test]
    fn test_parse_module_wrappers() {
        let cjs = Fixture::parse("module.exports = {\"instances\": [1]};\n", "f").unwrap();
        assert_eq!(cjs.instances, vec![json!(1)]);

        let esm = Fixture::parse("export default {\"instances\": [\"a\"]}", "f").unwrap();
        assert_eq!(esm.instances, vec![json!("a")]);
    }

    #[test]
    fn test_parse_rejects_zero_instances() {
        let err = Fixture::parse(r#"{"instances": []}"#, "empty.json").unwrap_err();
        match err {
            ProfilerError::FixtureLoadError {
                path,
                reason,
            } => {
                assert_eq!(path, "empty.json");
                assert!(reason.contains("no instances"));
            }
            other => panic!("Expected FixtureLoadError, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_missing_instances() {
        let err = Fixture::parse(r#"{"props": {}}"#, "f").unwrap_err();
        assert!(matches!(err, ProfilerError::FixtureLoadError { .. }));
    }

    #[tokio::test]
    async fn test_load_props_from_file() {
        let file = write_fixture(r#"{"instances": [{"title": "first"}, {"title": "second"}]}"#);

        assert_eq!(load_props(file.path(), 2).await.unwrap(), json!({"title": "first"}));
        assert_eq!(load_props(file.path(), 1).await.unwrap(), json!({"title": "second"}));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = load_props(Path::new("/nonexistent/x.fixture.json"), 0).await.unwrap_err();
        assert!(matches!(err, ProfilerError::FixtureLoadError { .. }));
    }

    #[test]
    fn test_default_fixture_path() {
        assert_eq!(
            default_fixture_path("javascript/a-package/thing.jsx"),
            PathBuf::from("javascript/a-package/thing.fixture.json")
        );
    }
}
