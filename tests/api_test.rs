//! Route tests covering the full request lifecycle against stubbed tools.

mod common;

use clipserve_av::testing::StubRunner;
use common::{body_bytes, body_json, MultipartBuilder, TestApp};

#[tokio::test]
async fn root_reports_liveness() {
    let app = TestApp::new();
    let response = app.get("/").await;
    assert_eq!(response.status(), 200);
    let json = body_json(response).await;
    assert_eq!(json["message"], "clipserve is running");
}

#[tokio::test]
async fn duration_probes_a_url_source() {
    let app = TestApp::new();
    let response = app
        .post(
            "/duration",
            MultipartBuilder::new().text("video_url", "https://www.youtube.com/watch?v=ABC123"),
        )
        .await;

    assert_eq!(response.status(), 200);
    let json = body_json(response).await;
    assert!((json["duration"].as_f64().unwrap() - 35.2).abs() < 1e-9);

    // Download scratch file cleaned up once the response is built
    assert!(app.tmp_files().is_empty());
}

#[tokio::test]
async fn duration_accepts_an_upload() {
    let app = TestApp::new();
    let response = app
        .post(
            "/duration",
            MultipartBuilder::new().file("file", "input.mp4", b"uploaded bytes"),
        )
        .await;

    assert_eq!(response.status(), 200);
    // Upload went straight to disk, no downloader involved
    assert!(app
        .runner
        .invocations()
        .iter()
        .all(|call| call.tool != "yt-dlp"));
}

#[tokio::test]
async fn duration_accepts_uploads_beyond_two_megabytes() {
    let app = TestApp::new();
    let payload = vec![0u8; 3 * 1024 * 1024];
    let response = app
        .post(
            "/duration",
            MultipartBuilder::new().file("file", "big.mp4", &payload),
        )
        .await;

    assert_eq!(response.status(), 200);
    let json = body_json(response).await;
    assert!(json["duration"].as_f64().is_some());
}

#[tokio::test]
async fn missing_source_is_a_400_with_error_body() {
    let app = TestApp::new();
    let response = app.post("/duration", MultipartBuilder::new()).await;

    assert_eq!(response.status(), 400);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("video_url"));
}

#[tokio::test]
async fn trim_streams_binary_output_and_cleans_scratch() {
    let app = TestApp::new();
    let response = app
        .post(
            "/trim-video",
            MultipartBuilder::new()
                .file("file", "input.mp4", b"uploaded bytes")
                .text("start", "8")
                .text("duration", "15"),
        )
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "video/mp4"
    );

    let body = body_bytes(response).await;
    assert_eq!(body, b"stub media");

    // Deletion of the streamed file was deferred until the body finished
    assert!(app.tmp_files().is_empty());
}

#[tokio::test]
async fn trim_rejects_negative_start_before_touching_disk() {
    let app = TestApp::new();
    let response = app
        .post(
            "/trim-video",
            MultipartBuilder::new()
                .file("file", "input.mp4", b"uploaded bytes")
                .text("start", "-1")
                .text("duration", "15"),
        )
        .await;

    assert_eq!(response.status(), 400);
    assert!(app.runner.invocations().is_empty());
    assert!(app.tmp_files().is_empty());
}

#[tokio::test]
async fn trim_rejects_non_finite_bounds() {
    let app = TestApp::new();
    for (start, duration) in [("NaN", "15"), ("inf", "15"), ("0", "NaN"), ("0", "inf")] {
        let response = app
            .post(
                "/trim-video",
                MultipartBuilder::new()
                    .file("file", "input.mp4", b"uploaded bytes")
                    .text("start", start)
                    .text("duration", duration),
            )
            .await;
        assert_eq!(response.status(), 400, "start={start} duration={duration}");
    }
    assert!(app.runner.invocations().is_empty());
}

#[tokio::test]
async fn failed_transform_reports_error_and_cleans_scratch() {
    let app = TestApp::with_runner(StubRunner::failing());
    let response = app
        .post(
            "/trim-video",
            MultipartBuilder::new()
                .file("file", "input.mp4", b"uploaded bytes")
                .text("start", "0")
                .text("duration", "5"),
        )
        .await;

    assert_eq!(response.status(), 500);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("ffmpeg"));

    // Both the materialized input and the unborn output are gone
    assert!(app.tmp_files().is_empty());
}

#[tokio::test]
async fn trim_link_mode_publishes_into_output_dir() {
    let app = TestApp::new();
    let response = app
        .post(
            "/trim-video",
            MultipartBuilder::new()
                .file("file", "input.mp4", b"uploaded bytes")
                .text("start", "0")
                .text("duration", "5")
                .text("link", "true"),
        )
        .await;

    assert_eq!(response.status(), 200);
    let json = body_json(response).await;
    let url = json["url"].as_str().unwrap();
    assert!(url.starts_with("/output/"));

    let published = app.output_dir().join(url.trim_start_matches("/output/"));
    assert!(published.exists());
    assert!(app.tmp_files().is_empty());

    // The published file is served from the static mount
    let served = app.get(url).await;
    assert_eq!(served.status(), 200);
    assert_eq!(body_bytes(served).await, b"stub media");
}

#[tokio::test]
async fn mute_streams_binary_output() {
    let app = TestApp::new();
    let response = app
        .post(
            "/mute-video",
            MultipartBuilder::new().file("file", "input.mp4", b"uploaded bytes"),
        )
        .await;

    assert_eq!(response.status(), 200);
    let args = app.runner.invocations().last().unwrap().args.join(" ");
    assert!(args.contains("-an"));

    // Deletion of the streamed file is deferred until the body finishes
    let _ = body_bytes(response).await;
    assert!(app.tmp_files().is_empty());
}

#[tokio::test]
async fn stitch_requires_both_sources() {
    let app = TestApp::new();
    let response = app
        .post(
            "/stitch-videos",
            MultipartBuilder::new().file("file1", "a.mp4", b"first"),
        )
        .await;

    assert_eq!(response.status(), 400);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("file2"));
    assert!(app.tmp_files().is_empty());
}

#[tokio::test]
async fn stitch_concatenates_two_uploads() {
    let app = TestApp::new();
    let response = app
        .post(
            "/stitch-videos",
            MultipartBuilder::new()
                .file("file1", "a.mp4", b"first")
                .file("file2", "b.mp4", b"second"),
        )
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(body_bytes(response).await, b"stub media");

    let args = app.runner.invocations().last().unwrap().args.join(" ");
    assert!(args.contains("-f concat"));
    assert!(app.tmp_files().is_empty());
}

#[tokio::test]
async fn snapshots_extracts_frames_and_retains_source() {
    let app = TestApp::new();
    let response = app
        .post(
            "/snapshots",
            MultipartBuilder::new()
                .text("video_url", "https://www.youtube.com/watch?v=ABC123")
                .text("slug", "My Video: Part 2!")
                .text("interval", "10"),
        )
        .await;

    assert_eq!(response.status(), 200);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Snapshots complete");
    assert_eq!(json["slug"], "my-video-part-2");
    assert_eq!(json["frames"], 4);

    let slug_dir = app.snapshot_dir().join("my-video-part-2");
    assert!(slug_dir.join("frame_0001.jpg").exists());
    assert!(slug_dir.join("frame_0004.jpg").exists());
    assert!(slug_dir.join("source.mp4").exists());
    assert!(app.tmp_files().is_empty());
}

#[tokio::test]
async fn snapshots_rejects_zero_interval_before_fetching() {
    let app = TestApp::new();
    let response = app
        .post(
            "/snapshots",
            MultipartBuilder::new()
                .text("video_url", "https://www.youtube.com/watch?v=ABC123")
                .text("slug", "zeroed")
                .text("interval", "0"),
        )
        .await;

    assert_eq!(response.status(), 400);
    assert!(app.runner.invocations().is_empty());
}

#[tokio::test]
async fn snapshots_failure_cleans_download_scratch() {
    // yt-dlp succeeds on both attempts but ffmpeg refuses
    let app = TestApp::with_runner(StubRunner::with_handler(|tool, args| match tool {
        "yt-dlp" => common::simulate_tools(tool, args),
        _ => Err(clipserve_av::Error::process_failed(tool, Some(1), "boom")),
    }));

    let response = app
        .post(
            "/snapshots",
            MultipartBuilder::new()
                .text("video_url", "https://www.youtube.com/watch?v=ABC123")
                .text("slug", "doomed")
                .text("interval", "10"),
        )
        .await;

    assert_eq!(response.status(), 500);
    assert!(app.tmp_files().is_empty());
    assert!(!app.snapshot_dir().join("doomed").join("source.mp4").exists());
}

#[tokio::test]
async fn clip_cuts_from_the_retained_source() {
    let app = TestApp::new();
    app.post(
        "/snapshots",
        MultipartBuilder::new()
            .text("video_url", "https://www.youtube.com/watch?v=ABC123")
            .text("slug", "talk")
            .text("interval", "5"),
    )
    .await;

    let response = app
        .post(
            "/clip",
            MultipartBuilder::new()
                .text("slug", "talk")
                .text("moment_index", "3")
                .text("interval", "5"),
        )
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(body_bytes(response).await, b"stub media");

    // moment 3 on a 5s grid with the default 15s window starts at 8
    let clip_call = app
        .runner
        .invocations()
        .into_iter()
        .find(|c| c.args.windows(2).any(|w| w[0] == "-ss" && w[1] == "8"))
        .expect("clip invocation");
    assert!(clip_call.args.contains(&"-an".to_string()));

    // Retained source survives for further clips; scratch does not
    assert!(app.snapshot_dir().join("talk").join("source.mp4").exists());
    assert!(app.tmp_files().is_empty());
}

#[tokio::test]
async fn clip_duration_is_clamped_to_bounds() {
    let app = TestApp::new();
    app.post(
        "/snapshots",
        MultipartBuilder::new()
            .text("video_url", "https://www.youtube.com/watch?v=ABC123")
            .text("slug", "talk")
            .text("interval", "5"),
    )
    .await;

    let response = app
        .post(
            "/clip",
            MultipartBuilder::new()
                .text("slug", "talk")
                .text("moment_index", "3")
                .text("interval", "5")
                .text("clip_duration", "100"),
        )
        .await;

    assert_eq!(response.status(), 200);
    let clamped = app
        .runner
        .invocations()
        .into_iter()
        .any(|c| c.args.windows(2).any(|w| w[0] == "-t" && w[1] == "60"));
    assert!(clamped);
}

#[tokio::test]
async fn clip_without_retained_source_or_url_is_400() {
    let app = TestApp::new();
    let response = app
        .post(
            "/clip",
            MultipartBuilder::new()
                .text("slug", "never-snapshotted")
                .text("moment_index", "0")
                .text("interval", "5"),
        )
        .await;

    assert_eq!(response.status(), 400);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("video_url"));
}

#[tokio::test]
async fn clip_falls_back_to_fetching_the_supplied_url() {
    let app = TestApp::new();
    let response = app
        .post(
            "/clip",
            MultipartBuilder::new()
                .text("slug", "fresh")
                .text("video_url", "https://www.youtube.com/watch?v=ABC123")
                .text("moment_index", "2")
                .text("interval", "10"),
        )
        .await;

    assert_eq!(response.status(), 200);
    assert!(app
        .runner
        .invocations()
        .iter()
        .any(|c| c.tool == "yt-dlp"));

    // Deletion of the streamed file is deferred until the body finishes
    let _ = body_bytes(response).await;
    assert!(app.tmp_files().is_empty());
}
