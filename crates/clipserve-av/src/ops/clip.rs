//! Clip extraction around a snapshot moment.

use super::{require_input, TRANSFORM_TOOL};
use crate::runner::ProcessRunner;
use crate::Result;
use std::path::Path;

/// Allowed range for a clip's length, in whole seconds.
#[derive(Debug, Clone, Copy)]
pub struct ClipBounds {
    pub min_secs: u32,
    pub max_secs: u32,
    pub default_secs: u32,
}

impl Default for ClipBounds {
    fn default() -> Self {
        Self {
            min_secs: 15,
            max_secs: 60,
            default_secs: 15,
        }
    }
}

/// A resolved trim window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipWindow {
    pub start_secs: u32,
    pub duration_secs: u32,
}

/// Compute the trim window for a moment on a fixed snapshot interval grid.
///
/// The target second is `moment_index * interval`. The window is centered on
/// it (integer halving), clamped so the start is never negative and the
/// duration stays within bounds.
pub fn clip_window(
    moment_index: u32,
    interval_secs: u32,
    requested_secs: Option<u32>,
    bounds: ClipBounds,
) -> ClipWindow {
    let target = moment_index.saturating_mul(interval_secs);
    let duration = requested_secs
        .unwrap_or(bounds.default_secs)
        .clamp(bounds.min_secs, bounds.max_secs);

    ClipWindow {
        start_secs: target.saturating_sub(duration / 2),
        duration_secs: duration,
    }
}

/// Cut the clip window out of `input`, dropping audio.
pub async fn extract_clip(
    runner: &dyn ProcessRunner,
    input: &Path,
    output: &Path,
    window: ClipWindow,
) -> Result<()> {
    require_input(input)?;

    let args = vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-ss".to_string(),
        window.start_secs.to_string(),
        "-t".to_string(),
        window.duration_secs.to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-an".to_string(),
        output.to_string_lossy().into_owned(),
    ];

    runner.run(TRANSFORM_TOOL, &args).await?;
    Ok(())
}
