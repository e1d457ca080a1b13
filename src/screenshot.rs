//! Remote-screenshot fallback.
//!
//! Sources the download tool cannot handle are sampled through an external
//! imaging service instead: one timed screenshot request per interval across
//! an increasing virtual playback offset. The path is best-effort; the first
//! non-success response (or the duration bound) ends the capture, and a
//! short capture is reported as a degraded success rather than a failure.

use crate::config::ScreenshotConfig;
use anyhow::{Context, Result};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// Client for the external imaging service.
pub struct ScreenshotClient {
    client: Client,
    service_url: String,
    api_token: String,
}

/// Outcome of a polling capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureReport {
    /// Frames written to the output directory.
    pub frames: usize,
    /// True when the capture stopped before the duration bound.
    pub degraded: bool,
}

impl ScreenshotClient {
    pub fn new(config: &ScreenshotConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build screenshot HTTP client")?;

        Ok(Self {
            client,
            service_url: config.service_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// Capture one frame per `interval_secs` of virtual playback, up to
    /// `max_duration_secs`, writing zero-padded frames into `output_dir`.
    ///
    /// Stops at the first request error or non-success status. Never fails
    /// once the output directory exists; callers read the report instead.
    pub async fn poll_capture(
        &self,
        page_url: &str,
        output_dir: &Path,
        interval_secs: u32,
        max_duration_secs: u32,
    ) -> Result<CaptureReport> {
        if interval_secs == 0 {
            anyhow::bail!("Screenshot interval must be at least 1 second");
        }

        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create snapshot directory {:?}", output_dir))?;

        let mut frames = 0usize;
        // u64 so the increment cannot wrap for bounds near u32::MAX
        let mut offset = 0u64;
        let bound = u64::from(max_duration_secs);

        while offset <= bound {
            let offset_param = offset.to_string();
            let response = self
                .client
                .get(&self.service_url)
                .query(&[
                    ("url", page_url),
                    ("token", self.api_token.as_str()),
                    ("offset", offset_param.as_str()),
                ])
                .send()
                .await;

            let response = match response {
                Ok(r) if r.status().is_success() => r,
                Ok(r) => {
                    tracing::warn!(
                        "Screenshot service returned {} at offset {}s, stopping capture",
                        r.status(),
                        offset
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        "Screenshot request failed at offset {}s: {}, stopping capture",
                        offset,
                        e
                    );
                    break;
                }
            };

            let bytes = match response.bytes().await {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!("Screenshot body read failed at offset {}s: {}", offset, e);
                    break;
                }
            };

            let frame_path = output_dir.join(format!("frame_{:04}.jpg", frames + 1));
            tokio::fs::write(&frame_path, &bytes)
                .await
                .with_context(|| format!("Failed to write frame {:?}", frame_path))?;

            frames += 1;
            offset += u64::from(interval_secs);
        }

        let degraded = offset <= bound;
        if degraded {
            tracing::warn!(
                "Screenshot capture of {} stopped early with {} frames",
                page_url,
                frames
            );
        }

        Ok(CaptureReport { frames, degraded })
    }
}
