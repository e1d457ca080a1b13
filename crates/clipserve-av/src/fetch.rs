//! Media fetching.
//!
//! Resolves a source reference into a local file. Raw byte payloads are
//! written straight to disk; URLs go through `yt-dlp`, with exactly one
//! fallback attempt against a rewritten URL when the primary download fails.

use crate::runner::ProcessRunner;
use crate::{Error, Result};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DOWNLOAD_TOOL: &str = "yt-dlp";

/// Host template substituted when the primary download attempt fails.
///
/// The rewritten URL keeps only the video identifier from the original and
/// drops every other query parameter.
const FALLBACK_TEMPLATE: &str = "https://youtu.be/";

/// A media source supplied by a request.
#[derive(Debug, Clone)]
pub enum MediaSource {
    /// Remote reference handed to the download tool.
    Url(String),
    /// Bytes uploaded with the request; no network call.
    Bytes(Bytes),
}

/// Credential policy for download invocations.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Cookie file attached to downloads when present on disk.
    pub cookies_file: Option<PathBuf>,
    /// Fail when the cookie file is configured but missing, instead of
    /// downloading without it.
    pub require_credentials: bool,
}

/// Materializes media sources into local files.
pub struct Fetcher {
    runner: Arc<dyn ProcessRunner>,
    options: FetchOptions,
}

impl Fetcher {
    pub fn new(runner: Arc<dyn ProcessRunner>, options: FetchOptions) -> Self {
        Self { runner, options }
    }

    /// Materialize `source` at `dest`.
    ///
    /// URL fetches make at most two attempts: the primary URL, then the
    /// rewritten fallback. A second failure surfaces as
    /// [`Error::FetchFailed`].
    pub async fn fetch(&self, source: &MediaSource, dest: &Path) -> Result<()> {
        match source {
            MediaSource::Bytes(bytes) => {
                tokio::fs::write(dest, bytes).await?;
                Ok(())
            }
            MediaSource::Url(url) => self.fetch_url(url, dest).await,
        }
    }

    async fn fetch_url(&self, url: &str, dest: &Path) -> Result<()> {
        let args = self.download_args(url, dest)?;

        match self.runner.run(DOWNLOAD_TOOL, &args).await {
            Ok(_) => return Ok(()),
            Err(primary_err) => {
                let fallback = fallback_url(url);
                tracing::warn!(
                    "Primary download of {} failed ({}), retrying via {}",
                    url,
                    primary_err,
                    fallback
                );

                let args = self.download_args(&fallback, dest)?;
                if let Err(fallback_err) = self.runner.run(DOWNLOAD_TOOL, &args).await {
                    return Err(Error::fetch_failed(
                        url,
                        format!("primary: {primary_err}; fallback: {fallback_err}"),
                    ));
                }
            }
        }

        Ok(())
    }

    fn download_args(&self, url: &str, dest: &Path) -> Result<Vec<String>> {
        let mut args = Vec::new();

        if let Some(cookies) = &self.options.cookies_file {
            if cookies.exists() {
                args.push("--cookies".to_string());
                args.push(cookies.to_string_lossy().into_owned());
            } else if self.options.require_credentials {
                return Err(Error::MissingCredentials {
                    path: cookies.clone(),
                });
            } else {
                tracing::warn!("Cookie file {:?} not found, downloading without it", cookies);
            }
        }

        args.push("-o".to_string());
        args.push(dest.to_string_lossy().into_owned());
        args.push(url.to_string());
        Ok(args)
    }
}

/// Whether a URL points at media the download tool can fetch directly.
///
/// Direct media files and the supported hosting domains go through the local
/// yt-dlp/ffmpeg pipeline; anything else is a candidate for the best-effort
/// remote-screenshot path.
pub fn is_downloadable_source(url: &str) -> bool {
    const MEDIA_EXTENSIONS: [&str; 6] = ["mp4", "mov", "webm", "mkv", "m4v", "avi"];
    const HOSTED_DOMAINS: [&str; 3] = ["youtube.com", "youtu.be", "vimeo.com"];

    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    if MEDIA_EXTENSIONS
        .iter()
        .any(|ext| path.ends_with(&format!(".{ext}")))
    {
        return true;
    }
    HOSTED_DOMAINS.iter().any(|domain| url.contains(domain))
}

/// Derive the fallback URL for a failed download.
///
/// Extracts the `v=` video identifier and substitutes the alternate host
/// template, preserving nothing else. A URL without an identifiable video id
/// passes through unchanged, making the fallback attempt a plain retry.
pub fn fallback_url(url: &str) -> String {
    match video_id(url) {
        Some(id) => format!("{FALLBACK_TEMPLATE}{id}"),
        None => url.to_string(),
    }
}

fn video_id(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("v=")?;
    let id = rest.split('&').next().unwrap_or(rest);
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
