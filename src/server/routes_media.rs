//! Media operation handlers.
//!
//! Every handler follows the same request lifecycle: drain the multipart
//! form, validate, materialize the input as a scratch file, run one
//! transform through the process runner, respond, clean up. Scratch guards
//! make cleanup run on the failure paths too; only files still backing a
//! streaming response body or published under `/output` defer deletion.

use crate::server::multipart::FormData;
use crate::server::{ApiError, AppContext};
use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use clipserve_av::ops::{self, SnapshotParams};
use clipserve_av::{is_downloadable_source, probe, slugify, MediaSource, ScratchFile};
use futures::StreamExt;
use serde_json::json;
use std::path::Path;
use tokio_util::io::ReaderStream;

/// Offset bound for screenshot captures when the form gives no
/// `max_duration`.
const DEFAULT_CAPTURE_SECS: u32 = 300;

/// Liveness message.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "clipserve is running" }))
}

/// Service health plus external tool availability.
pub async fn health() -> Result<Json<serde_json::Value>, ApiError> {
    let tools = tokio::task::spawn_blocking(clipserve_av::check_tools)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "tools": tools
            .into_iter()
            .map(|t| json!({
                "name": t.name,
                "available": t.available,
                "version": t.version,
            }))
            .collect::<Vec<_>>(),
    })))
}

/// `POST /snapshots`: sample one frame per interval into a slug directory.
///
/// Downloadable sources go through yt-dlp + ffmpeg and the fetched video is
/// retained as `<slug>/source.mp4` for later `/clip` requests. Anything else
/// falls back to the remote screenshot service when one is configured; that
/// path is best-effort and reports however many frames it captured.
pub async fn snapshots(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let form = FormData::from_multipart(multipart).await?;
    let video_url = form.require_text("video_url")?.to_string();
    let slug = slugify(form.require_text("slug")?);
    if slug.is_empty() {
        return Err(ApiError::bad_request("Slug normalizes to an empty string"));
    }
    let interval: u32 = form.require_parse("interval")?;
    // Both the local pipeline and the screenshot fallback need a nonzero
    // interval; reject here so the paths agree on 400
    if interval == 0 {
        return Err(ApiError::bad_request("Interval must be at least 1 second"));
    }
    let max_duration: Option<f64> = form.parse("max_duration")?;

    let out_dir = ctx.snapshots.subdir(&slug)?;

    if !is_downloadable_source(&video_url) {
        if let Some(client) = &ctx.screenshots {
            let bound = max_duration.map(|d| d as u32).unwrap_or(DEFAULT_CAPTURE_SECS);
            let report = client
                .poll_capture(&video_url, &out_dir, interval, bound)
                .await?;
            let message = if report.degraded {
                "Snapshots stopped early"
            } else {
                "Snapshots complete"
            };
            return Ok(Json(json!({
                "message": message,
                "slug": slug,
                "frames": report.frames,
            })));
        }
        tracing::info!(
            "No screenshot service configured, handing {} to the downloader",
            video_url
        );
    }

    let source = ctx.tmp.allocate("mp4");
    ctx.fetcher
        .fetch(&MediaSource::Url(video_url), source.path())
        .await?;

    let frames = ops::extract_snapshots(
        ctx.runner.as_ref(),
        source.path(),
        &out_dir,
        &SnapshotParams {
            interval_secs: interval,
            max_duration_secs: max_duration,
        },
    )
    .await?;

    // Retain the download next to its frames so /clip can cut from it; the
    // scratch guard then has nothing left to remove.
    move_file(source.path(), &out_dir.join("source.mp4")).await?;
    drop(source);

    Ok(Json(json!({
        "message": "Snapshots complete",
        "slug": slug,
        "frames": frames,
    })))
}

/// `POST /clip`: cut a short, muted clip centered on a snapshot moment.
pub async fn clip(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = FormData::from_multipart(multipart).await?;
    let slug = slugify(form.require_text("slug")?);
    if slug.is_empty() {
        return Err(ApiError::bad_request("Slug normalizes to an empty string"));
    }
    let moment_index: u32 = form.require_parse("moment_index")?;
    let interval: u32 = form.require_parse("interval")?;
    if interval == 0 {
        return Err(ApiError::bad_request("Interval must be at least 1 second"));
    }
    let requested: Option<u32> = form.parse("clip_duration")?;

    let window = ops::clip_window(moment_index, interval, requested, ctx.config.clip.bounds());
    let output = ctx.tmp.allocate("mp4");

    let retained = ctx.snapshots.root().join(&slug).join("source.mp4");
    if retained.exists() {
        ops::extract_clip(ctx.runner.as_ref(), &retained, output.path(), window).await?;
    } else if let Some(url) = form.text("video_url") {
        let source = ctx.tmp.allocate("mp4");
        ctx.fetcher
            .fetch(&MediaSource::Url(url.to_string()), source.path())
            .await?;
        ops::extract_clip(ctx.runner.as_ref(), source.path(), output.path(), window).await?;
    } else {
        return Err(ApiError::bad_request(format!(
            "No retained source for slug '{slug}'; run /snapshots first or supply video_url"
        )));
    }

    download_response(output, &format!("{slug}-clip.mp4")).await
}

/// `POST /duration`: probe the length of a source in seconds.
pub async fn duration(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let form = FormData::from_multipart(multipart).await?;
    let source = materialize_source(&ctx, &form, "video_url", "file").await?;

    let secs = probe::duration_secs(ctx.runner.as_ref(), source.path()).await?;

    Ok(Json(json!({ "duration": secs })))
}

/// `POST /trim-video`: cut a sub-range out of an upload or URL.
pub async fn trim_video(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = FormData::from_multipart(multipart).await?;
    let start: f64 = form.require_parse("start")?;
    let duration: f64 = form.require_parse("duration")?;
    // NaN compares false against both bounds; reject it explicitly
    if !start.is_finite() || start < 0.0 {
        return Err(ApiError::bad_request(
            "Start offset must be a non-negative number",
        ));
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ApiError::bad_request("Duration must be a positive number"));
    }

    let input = materialize_source(&ctx, &form, "video_url", "file").await?;
    let output = ctx.tmp.allocate("mp4");

    ops::trim(ctx.runner.as_ref(), input.path(), output.path(), start, duration).await?;

    transform_response(&ctx, &form, output, "trimmed.mp4").await
}

/// `POST /mute-video`: strip the audio stream from an upload or URL.
pub async fn mute_video(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = FormData::from_multipart(multipart).await?;

    let input = materialize_source(&ctx, &form, "video_url", "file").await?;
    let output = ctx.tmp.allocate("mp4");

    ops::mute(ctx.runner.as_ref(), input.path(), output.path()).await?;

    transform_response(&ctx, &form, output, "muted.mp4").await
}

/// `POST /stitch-videos`: concatenate exactly two sources end-to-end.
pub async fn stitch_videos(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = FormData::from_multipart(multipart).await?;

    let first = materialize_source(&ctx, &form, "video_url1", "file1").await?;
    let second = materialize_source(&ctx, &form, "video_url2", "file2").await?;
    let output = ctx.tmp.allocate("mp4");

    ops::stitch(
        ctx.runner.as_ref(),
        &ctx.tmp,
        first.path(),
        second.path(),
        output.path(),
    )
    .await?;

    transform_response(&ctx, &form, output, "stitched.mp4").await
}

/// Resolve a request's media source into a scratch file.
async fn materialize_source(
    ctx: &AppContext,
    form: &FormData,
    url_field: &str,
    file_field: &str,
) -> Result<ScratchFile, ApiError> {
    let scratch = ctx.tmp.allocate("mp4");

    let source = if let Some(bytes) = form.file(file_field) {
        MediaSource::Bytes(bytes.clone())
    } else if let Some(url) = form.text(url_field) {
        MediaSource::Url(url.to_string())
    } else {
        return Err(ApiError::bad_request(format!(
            "Missing video source: upload `{file_field}` or provide `{url_field}`"
        )));
    };

    ctx.fetcher.fetch(&source, scratch.path()).await?;
    Ok(scratch)
}

/// Answer a transform with either a download body or a published URL.
async fn transform_response(
    ctx: &AppContext,
    form: &FormData,
    output: ScratchFile,
    filename: &str,
) -> Result<Response, ApiError> {
    if form.flag("link") {
        let name = output
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ApiError::internal("Output path has no file name"))?;

        move_file(output.path(), &ctx.output.root().join(&name)).await?;

        return Ok(Json(json!({ "url": format!("/output/{name}") })).into_response());
    }

    download_response(output, filename).await
}

/// Stream a scratch file back as an attachment, deleting it only after the
/// body finishes (the guard rides along with the stream).
async fn download_response(output: ScratchFile, filename: &str) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(output.path())
        .await
        .map_err(|e| ApiError::internal(format!("Transform produced no output: {e}")))?;

    let guard = ScratchFile::from_path(output.into_path());
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _keep_alive = &guard;
        chunk
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// Rename with a copy fallback for cross-device moves.
async fn move_file(from: &Path, to: &Path) -> Result<(), ApiError> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    tokio::fs::copy(from, to).await?;
    tokio::fs::remove_file(from).await?;
    Ok(())
}
