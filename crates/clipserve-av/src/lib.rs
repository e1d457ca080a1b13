//! Clipserve-AV: media fetching and processing over external CLI tools.
//!
//! This crate wraps the external binaries clipserve depends on (`yt-dlp`,
//! `ffmpeg`, `ffprobe`) behind typed, testable Rust APIs:
//!
//! - **Process Runner**: a thin, auditable subprocess boundary with captured
//!   stderr and a configurable timeout
//! - **Media Fetcher**: resolves a URL or raw byte payload into a local file,
//!   with a single fallback URL rewrite on download failure
//! - **Transform Operations**: trim, mute, stitch, snapshot extraction and
//!   clip-from-moment as fixed ffmpeg argument templates
//! - **Scratch Files**: collision-free temp paths with guaranteed best-effort
//!   cleanup on every exit path
//! - **Slug Normalizer**: filesystem/URL-safe identifiers from arbitrary text
//!
//! # Examples
//!
//! ```no_run
//! use clipserve_av::{slugify, Workdir};
//!
//! let slug = slugify("My Video: Part 2!");
//! assert_eq!(slug, "my-video-part-2");
//!
//! let workdir = Workdir::new("/tmp/videos")?;
//! let scratch = workdir.allocate("mp4");
//! // scratch.path() is deleted when the guard drops
//! # Ok::<(), clipserve_av::Error>(())
//! ```

pub mod error;
pub mod fetch;
pub mod ops;
pub mod probe;
pub mod runner;
pub mod scratch;
pub mod slug;
pub mod testing;
pub mod tools;

pub use error::{Error, Result};
pub use fetch::{is_downloadable_source, FetchOptions, Fetcher, MediaSource};
pub use runner::{ProcessRunner, RunOutput, SystemRunner};
pub use scratch::{ScratchFile, Workdir};
pub use slug::slugify;
pub use tools::{check_tool, check_tools, require_tool, ToolInfo};
