// Integration tests for complete profiling pipelines
//
// Each test scripts the host application and render service with a
// StubTransport, loads the manifest through the homepage, and profiles one or
// more components end to end.

use std::time::Duration;

use render_profiler::core::ProfilerError;
use render_profiler::profile::{ProfileJob, Profiler};
use render_profiler::render::AcceptAll;
use render_profiler::test_utils::{StubTransport, init_test_logging};
use serde_json::json;

use crate::common::{
    FixtureDir, HOST, MAPPING_URL, ManifestBuilder, RENDER, RENDER_URL, homepage, host_transport,
};

fn profiler(transport: StubTransport) -> Profiler<StubTransport> {
    Profiler::new(transport)
        .with_host_origin(HOST)
        .with_render_origin(RENDER)
        .with_validator(Box::new(AcceptAll))
}

#[tokio::test]
async fn test_profile_builds_ordered_request_from_manifest() {
    init_test_logging(None);

    let manifest = ManifestBuilder::new().package("a.js", &["b.js"]).package("b.js", &[]).build();
    let fixtures = FixtureDir::new();
    let fixture =
        fixtures.write("x.fixture.json", r#"{"instances": [{"which": "first"}, {"which": "second"}]}"#);

    let transport = host_transport(&manifest).with_post(RENDER_URL, "<div>rendered</div>");
    let profiler = profiler(transport);

    let session = profiler.session(profiler.load_graph().await.unwrap()).await;
    let job = ProfileJob::new("javascript/a-package/x.jsx", 2).with_fixture(&fixture);
    let outcome = profiler.profile(&job, &session).await;

    assert_eq!(outcome.result.unwrap(), "<div>rendered</div>".len());
    assert_eq!(
        profiler.transport().posted_bodies(),
        vec![json!({
            "urls": [
                "http://localhost:8080/genfiles/javascript/en/b.js",
                "http://localhost:8080/genfiles/javascript/en/a.js",
            ],
            "path": "./javascript/a-package/x.jsx",
            "props": {"which": "first"},
        })]
    );

    // homepage, manifest, one failed mapping query, render
    let requests = profiler.transport().requests();
    assert_eq!(requests.len(), 4);
    assert!(requests.contains(&format!("GET {MAPPING_URL}")));
}

#[tokio::test]
async fn test_profile_uses_package_mapping_on_dev_host() {
    let manifest = ManifestBuilder::new()
        .package("core.js", &[])
        .package("shared.js", &["core.js"])
        .package("a.js", &["shared.js"])
        .build();
    let fixtures = FixtureDir::new();
    let fixture = fixtures.write("x.json", r#"{"instances": [{}]}"#);

    let transport = host_transport(&manifest)
        .with_get(MAPPING_URL, r#"{"javascript/loose/x.jsx": ["shared.js", "a.js"]}"#)
        .with_post(RENDER_URL, "ok");
    let profiler = profiler(transport);

    let session = profiler.session(profiler.load_graph().await.unwrap()).await;
    let job = ProfileJob::new("javascript/loose/x.jsx", 0).with_fixture(&fixture);
    let outcome = profiler.profile(&job, &session).await;

    assert!(outcome.is_success(), "{outcome}");
    let body = &profiler.transport().posted_bodies()[0];
    assert_eq!(
        body["urls"],
        json!([
            "http://localhost:8080/genfiles/javascript/en/core.js",
            "http://localhost:8080/genfiles/javascript/en/shared.js",
        ])
    );
}

#[tokio::test]
async fn test_diamond_manifest_emits_each_url_once() {
    let manifest = ManifestBuilder::new()
        .package("app.js", &["left.js", "right.js"])
        .package("left.js", &["base.js"])
        .package("right.js", &["base.js"])
        .package("base.js", &[])
        .build();
    let fixtures = FixtureDir::new();
    let fixture = fixtures.write("x.json", r#"{"instances": [1]}"#);

    let profiler = profiler(host_transport(&manifest).with_post(RENDER_URL, "ok"));
    let session = profiler.session(profiler.load_graph().await.unwrap()).await;
    let job = ProfileJob::new("javascript/app-package/x.jsx", 0).with_fixture(&fixture);
    assert!(profiler.profile(&job, &session).await.is_success());

    let body = &profiler.transport().posted_bodies()[0];
    let prefix = "http://localhost:8080/genfiles/javascript/en/";
    assert_eq!(
        body["urls"],
        json!([
            format!("{prefix}base.js"),
            format!("{prefix}left.js"),
            format!("{prefix}right.js"),
            format!("{prefix}app.js"),
        ])
    );
}

#[tokio::test]
async fn test_failed_render_does_not_abort_sibling() {
    let manifest = ManifestBuilder::new().package("a.js", &[]).package("b.js", &[]).build();
    let fixtures = FixtureDir::new();
    let fixture = fixtures.write("x.json", r#"{"instances": [{"n": 1}]}"#);

    let transport = host_transport(&manifest)
        .with_slow_post(RENDER_URL, Duration::from_millis(100), "<p>slow but fine</p>")
        .with_post_status_when(RENDER_URL, "./javascript/a-package/broken.jsx", 500);
    let profiler = profiler(transport);
    let session = profiler.session(profiler.load_graph().await.unwrap()).await;

    let jobs = vec![
        ProfileJob::new("javascript/b-package/fine.jsx", 0).with_fixture(&fixture),
        ProfileJob::new("javascript/a-package/broken.jsx", 0).with_fixture(&fixture),
    ];

    let mut seen = Vec::new();
    let outcomes = profiler
        .profile_all_with(&jobs, &session, |outcome| seen.push(outcome.component_path.clone()))
        .await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(seen.len(), 2);

    // The failing render returns immediately, so it completes first.
    assert_eq!(outcomes[0].component_path, "javascript/a-package/broken.jsx");
    assert!(matches!(
        outcomes[0].result,
        Err(ProfilerError::NetworkError { ref reason, .. }) if reason.contains("500")
    ));
    assert_eq!(outcomes[1].component_path, "javascript/b-package/fine.jsx");
    assert_eq!(outcomes[1].result.as_ref().unwrap(), &"<p>slow but fine</p>".len());
}

#[tokio::test]
async fn test_every_failure_kind_is_reported_per_component() {
    let manifest = ManifestBuilder::new().package("a.js", &[]).build();
    let fixtures = FixtureDir::new();
    let good = fixtures.write("good.json", r#"{"instances": [{}]}"#);
    let empty = fixtures.write("empty.json", r#"{"instances": []}"#);

    let profiler = profiler(host_transport(&manifest).with_post(RENDER_URL, "ok"));
    let session = profiler.session(profiler.load_graph().await.unwrap()).await;

    let jobs = vec![
        ProfileJob::new("javascript/a-package/ok.jsx", 0).with_fixture(&good),
        ProfileJob::new("javascript/no-package-dir/x.jsx", 0).with_fixture(&good),
        ProfileJob::new("javascript/ghost-package/x.jsx", 0).with_fixture(&good),
        ProfileJob::new("javascript/a-package/empty.jsx", 0).with_fixture(&empty),
    ];
    let outcomes = profiler.profile_all(&jobs, &session).await;
    assert_eq!(outcomes.len(), 4);

    let result_for = |path: &str| {
        outcomes.iter().find(|o| o.component_path == path).map(|o| &o.result).unwrap()
    };
    assert!(result_for("javascript/a-package/ok.jsx").is_ok());
    assert!(matches!(
        result_for("javascript/no-package-dir/x.jsx"),
        Err(ProfilerError::PackageGuessError { .. })
    ));
    assert!(matches!(
        result_for("javascript/ghost-package/x.jsx"),
        Err(ProfilerError::UnresolvedUrl { .. })
    ));
    assert!(matches!(
        result_for("javascript/a-package/empty.jsx"),
        Err(ProfilerError::FixtureLoadError { .. })
    ));
}

#[tokio::test]
async fn test_production_host_skips_package_mapping() {
    let host = "https://www.khanacademy.org";
    let manifest = ManifestBuilder::new().package("content-library.js", &[]).build();
    let fixtures = FixtureDir::new();
    let fixture = fixtures.write("x.json", r#"{"instances": [{}]}"#);

    let transport = StubTransport::new()
        .with_get(format!("{host}/"), r#"<script src="/genfiles/package-manifest.js">"#)
        .with_get(format!("{host}/genfiles/package-manifest.js"), manifest)
        .with_post(RENDER_URL, "ok");
    let profiler = profiler(transport).with_host_origin(host);

    let session = profiler.session(profiler.load_graph().await.unwrap()).await;
    let job = ProfileJob::new("javascript/content-library-package/components/concept-thumbnail.jsx", 0)
        .with_fixture(&fixture);
    assert!(profiler.profile(&job, &session).await.is_success());

    let requests = profiler.transport().requests();
    assert!(requests.iter().all(|r| !r.contains("path_to_packages")), "{requests:?}");
    assert_eq!(
        profiler.transport().posted_bodies()[0]["urls"],
        json!(["https://www.khanacademy.org/genfiles/javascript/en/content-library.js"])
    );
}

#[tokio::test]
async fn test_unparseable_manifest_aborts_before_pipelines() {
    let transport = StubTransport::new()
        .with_get(format!("{HOST}/"), homepage())
        .with_get(crate::common::MANIFEST_URL, "throw new Error('not a manifest');");

    let err = profiler(transport).load_graph().await.unwrap_err();
    assert!(matches!(err, ProfilerError::ManifestParseError { .. }));
}
