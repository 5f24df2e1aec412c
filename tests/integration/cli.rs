// Integration tests for the render-profile binary
//
// These run without a host application or render service: they cover argument
// handling, offline commands, and how failures surface to the user.

use std::collections::HashMap;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::common::serve_http;

/// A command isolated from the user's config and environment.
fn render_profile(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("render-profile").unwrap();
    cmd.env("HOME", home.path())
        .env("RENDER_PROFILE_NO_PROGRESS", "1")
        .env("NO_COLOR", "1")
        .env_remove("RENDER_PROFILE_CONFIG")
        .env_remove("RENDER_PROFILE_HOST")
        .env_remove("RENDER_PROFILE_RENDER_ORIGIN")
        .env_remove("RENDER_PROFILE_TIMEOUT")
        .env_remove("RENDER_PROFILE_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    render_profile(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("profile"))
        .stdout(predicate::str::contains("locate"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn test_locate_on_production_host_is_offline() {
    let home = TempDir::new().unwrap();
    render_profile(&home)
        .args([
            "--host",
            "https://www.khanacademy.org",
            "locate",
            "javascript/content-library-package/components/concept-thumbnail.jsx",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("content-library.js"))
        .stdout(predicate::str::contains("heuristic"));
}

#[test]
fn test_locate_without_package_directory_fails() {
    let home = TempDir::new().unwrap();
    render_profile(&home)
        .args(["--host", "https://www.khanacademy.org", "locate", "javascript/loose/x.jsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("javascript/loose/x.jsx"));
}

#[test]
fn test_profile_requires_components() {
    let home = TempDir::new().unwrap();
    render_profile(&home).arg("profile").assert().failure();
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    let home = TempDir::new().unwrap();
    render_profile(&home)
        .args(["--verbose", "--quiet", "resolve", "a.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_unreachable_host_reports_error() {
    let home = TempDir::new().unwrap();
    render_profile(&home)
        .args(["--host", "http://127.0.0.1:1", "--timeout", "5", "resolve", "a.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_config_file_fails() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("nope.toml");
    render_profile(&home)
        .arg("--config")
        .arg(&missing)
        .args(["resolve", "a.js"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_config_is_rejected() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.toml");
    std::fs::write(&config, "timeout_secs = 0\n").unwrap();

    render_profile(&home)
        .arg("--config")
        .arg(&config)
        .args(["resolve", "a.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout"));
}

#[test]
fn test_unparseable_manifest_is_reported_for_every_component() {
    let home = TempDir::new().unwrap();
    let host = serve_http(HashMap::from([
        (
            "/".to_string(),
            (200, r#"<script src="/genfiles/package-manifest-1f.js"></script>"#.to_string()),
        ),
        ("/genfiles/package-manifest-1f.js".to_string(), (200, "throw 1;".to_string())),
    ]));

    render_profile(&home)
        .args(["--host", &host, "--render-origin", "http://127.0.0.1:1", "--dev", "profile"])
        .args(["javascript/a-package/x.jsx", "javascript/b-package/y.jsx"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("javascript/a-package/x.jsx: Failed to parse package manifest"))
        .stderr(predicate::str::contains("javascript/b-package/y.jsx: Failed to parse package manifest"))
        .stderr(predicate::str::contains("2 of 2 components failed"));
}

#[test]
fn test_missing_homepage_aborts_before_any_component() {
    let home = TempDir::new().unwrap();
    let host = serve_http(HashMap::new());

    render_profile(&home)
        .args(["--host", &host, "--dev", "profile", "javascript/a-package/x.jsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"))
        .stderr(predicate::str::contains("javascript/a-package/x.jsx:").not());
}
