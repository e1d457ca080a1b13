//! Shared harness for route tests.
//!
//! Builds the full router against isolated temp directories and a stub
//! process runner, so requests run end to end without yt-dlp or ffmpeg.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use clipserve::config::Config;
use clipserve::server::{create_router, AppContext};
use clipserve_av::testing::StubRunner;
use clipserve_av::RunOutput;
use http_body_util::BodyExt;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub runner: Arc<StubRunner>,
    root: TempDir,
}

impl TestApp {
    /// Harness with tools simulated well enough for happy paths.
    pub fn new() -> Self {
        Self::with_runner(StubRunner::with_handler(simulate_tools))
    }

    /// Wrap an externally assembled router (e.g. with a screenshot client).
    pub fn from_parts(router: Router, runner: Arc<StubRunner>, root: TempDir) -> Self {
        Self {
            router,
            runner,
            root,
        }
    }

    pub fn with_runner(runner: StubRunner) -> Self {
        let root = TempDir::new().unwrap();
        let mut config = Config::default();
        config.media.tmp_dir = root.path().join("videos");
        config.media.snapshot_dir = root.path().join("snapshots");
        config.media.output_dir = root.path().join("output");

        let runner = Arc::new(runner);
        let ctx = AppContext::new(config, runner.clone()).unwrap();

        Self {
            router: create_router(ctx),
            runner,
            root,
        }
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root.path().join("videos")
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.root.path().join("snapshots")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("output")
    }

    /// Files left in the scratch directory.
    pub fn tmp_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.tmp_dir())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.is_file())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn post(&self, uri: &str, form: MultipartBuilder) -> Response<Body> {
        let (content_type, body) = form.build();
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Stand-in behavior for the external tools.
///
/// yt-dlp writes its `-o` destination, ffprobe reports a 35.2s duration,
/// ffmpeg materializes its output argument (expanding `%04d` patterns the
/// way frame extraction would for a 35s source at interval 10).
pub fn simulate_tools(tool: &str, args: &[String]) -> clipserve_av::Result<RunOutput> {
    match tool {
        "yt-dlp" => {
            if let Some(pos) = args.iter().position(|a| a == "-o") {
                std::fs::write(&args[pos + 1], b"downloaded media")?;
            }
            Ok(RunOutput::default())
        }
        "ffprobe" => Ok(RunOutput {
            stdout: "35.2\n".to_string(),
            stderr: String::new(),
        }),
        "ffmpeg" => {
            if let Some(last) = args.last() {
                if last.contains("%04d") {
                    let dir = PathBuf::from(last).parent().unwrap().to_path_buf();
                    for i in 1..=4 {
                        std::fs::write(dir.join(format!("frame_{i:04}.jpg")), b"jpg")?;
                    }
                } else {
                    std::fs::write(last, b"stub media")?;
                }
            }
            Ok(RunOutput::default())
        }
        other => panic!("unexpected tool invocation: {other}"),
    }
}

pub const BOUNDARY: &str = "clipserve-test-boundary";

/// Minimal multipart/form-data body builder.
#[derive(Default)]
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, contents: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(contents);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn build(mut self) -> (String, Vec<u8>) {
        self.body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (
            format!("multipart/form-data; boundary={BOUNDARY}"),
            self.body,
        )
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
