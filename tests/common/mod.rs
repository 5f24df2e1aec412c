//! Common test utilities and fixtures for render-profile integration tests

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::{Read as _, Write as _};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::PathBuf;
use std::time::Duration;

use render_profiler::test_utils::StubTransport;
use tempfile::TempDir;

pub const HOST: &str = "http://localhost:8080";
pub const RENDER: &str = "http://localhost:8060";
pub const RENDER_URL: &str = "http://localhost:8060/render";
pub const MANIFEST_URL: &str = "http://localhost:8080/genfiles/javascript/en/package-manifest-ab12.js";
pub const MAPPING_URL: &str =
    "http://localhost:8080/_kake/genfiles/js_path_to_pkgs/en/path_to_packages_prod.json";

/// Builds manifest script text; each package is served under `/genfiles/javascript/en/`.
#[derive(Default)]
pub struct ManifestBuilder {
    entries: Vec<String>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn package(mut self, name: &str, deps: &[&str]) -> Self {
        let deps = deps.iter().map(|d| format!("\"{d}\"")).collect::<Vec<_>>().join(", ");
        self.entries.push(format!(
            r#"{{"name": "{name}", "url": "/genfiles/javascript/en/{name}", "dependencies": [{deps}]}}"#
        ));
        self
    }

    pub fn build(&self) -> String {
        format!(
            "window.__manifest = {{\"javascript\": [{}], \"stylesheets\": [{{\"name\": \"s.css\", \"url\": \"/s.css\"}}]}};\n",
            self.entries.join(",\n")
        )
    }
}

/// Homepage markup referencing the manifest the way the host does.
pub fn homepage() -> String {
    format!(
        r#"<!doctype html><html><head>
<link rel="stylesheet" href="/genfiles/stylesheets/en/shared.css">
<script src="{MANIFEST_URL}"></script>
</head><body></body></html>"#
    )
}

/// A transport serving the homepage and `manifest` from the dev host.
pub fn host_transport(manifest: &str) -> StubTransport {
    StubTransport::new().with_get(format!("{HOST}/"), homepage()).with_get(MANIFEST_URL, manifest)
}

/// Temporary directory holding fixture files.
pub struct FixtureDir {
    dir: TempDir,
}

impl FixtureDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }
}

fn read_request_path(stream: &mut TcpStream) -> String {
    stream.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let read = stream.read(&mut chunk).unwrap_or(0);
        if read == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..read]);
    }

    let text = String::from_utf8_lossy(&buf);
    text.lines().next().and_then(|line| line.split_whitespace().nth(1)).unwrap_or("").to_string()
}

/// Serve `routes` (request path → status and body) on a loopback port for the
/// rest of the test process. Unknown paths get a 404. Returns the origin.
pub fn serve_http(routes: HashMap<String, (u16, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else {
                continue;
            };
            let path = read_request_path(&mut stream);
            let (status, body) = routes.get(&path).cloned().unwrap_or((404, String::new()));
            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: text/plain\r\nConnection: \
                 close\r\nContent-Length: {}\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.shutdown(Shutdown::Both);
        }
    });

    origin
}
