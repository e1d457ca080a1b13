use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub clip: ClipConfig,

    #[serde(default)]
    pub screenshot: Option<ScreenshotConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request body cap in bytes; uploads larger than this are rejected
    /// with 413.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_upload_bytes() -> usize {
    // 1 GiB
    1024 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Working directories for request-scoped media files.
///
/// Replaces the process-wide mutable directory globals of earlier revisions;
/// each component receives these explicitly, and tests point them at
/// isolated temp roots.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Scratch space for downloads and intermediate transforms.
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: PathBuf,

    /// Root for slug-named snapshot frame directories.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Publicly served output directory (mounted at /output).
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_tmp_dir() -> PathBuf {
    PathBuf::from("/tmp/clipserve/videos")
}
fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("/tmp/clipserve/snapshots")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("/tmp/clipserve/output")
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            tmp_dir: default_tmp_dir(),
            snapshot_dir: default_snapshot_dir(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Cookie file handed to the download tool when present.
    #[serde(default)]
    pub cookies_file: Option<PathBuf>,

    /// Fail downloads when the cookie file is configured but missing,
    /// instead of downloading without it.
    #[serde(default)]
    pub require_credentials: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Kill external invocations after this many seconds (0 disables).
    #[serde(default = "default_process_timeout")]
    pub process_timeout_secs: u64,
}

fn default_process_timeout() -> u64 {
    600
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            process_timeout_secs: default_process_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClipConfig {
    #[serde(default = "default_clip_min")]
    pub min_secs: u32,

    #[serde(default = "default_clip_max")]
    pub max_secs: u32,

    #[serde(default = "default_clip_min")]
    pub default_secs: u32,
}

fn default_clip_min() -> u32 {
    15
}
fn default_clip_max() -> u32 {
    60
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            min_secs: default_clip_min(),
            max_secs: default_clip_max(),
            default_secs: default_clip_min(),
        }
    }
}

impl ClipConfig {
    pub fn bounds(&self) -> clipserve_av::ops::ClipBounds {
        clipserve_av::ops::ClipBounds {
            min_secs: self.min_secs,
            max_secs: self.max_secs,
            default_secs: self.default_secs,
        }
    }
}

/// Remote screenshot service used when a source cannot be downloaded.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScreenshotConfig {
    pub service_url: String,

    pub api_token: String,

    /// Per-request timeout against the imaging service (default: 30).
    #[serde(default = "default_screenshot_timeout")]
    pub request_timeout_secs: u64,
}

fn default_screenshot_timeout() -> u64 {
    30
}
