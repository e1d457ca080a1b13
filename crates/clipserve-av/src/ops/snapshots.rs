//! Still-frame extraction at a fixed sampling interval.

use super::{require_input, TRANSFORM_TOOL};
use crate::runner::ProcessRunner;
use crate::{Error, Result};
use std::path::Path;

/// Snapshot extraction parameters.
#[derive(Debug, Clone)]
pub struct SnapshotParams {
    /// Seconds between consecutive frames.
    pub interval_secs: u32,
    /// Stop sampling after this many seconds of the source.
    pub max_duration_secs: Option<f64>,
}

/// Emit one still frame per interval into `output_dir`.
///
/// Frames are named `frame_0001.jpg`, `frame_0002.jpg`, ... in playback
/// order; ffmpeg's `fps=1/interval` filter samples at t = 0, interval,
/// 2*interval, ... so a 35s source at interval 10 yields four frames.
///
/// Returns the number of frames written.
pub async fn extract_snapshots(
    runner: &dyn ProcessRunner,
    input: &Path,
    output_dir: &Path,
    params: &SnapshotParams,
) -> Result<usize> {
    require_input(input)?;
    if params.interval_secs == 0 {
        return Err(Error::InvalidInput("interval must be at least 1 second".into()));
    }

    std::fs::create_dir_all(output_dir)?;
    let pattern = output_dir.join("frame_%04d.jpg");

    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
    ];
    if let Some(limit) = params.max_duration_secs {
        args.push("-t".to_string());
        args.push(limit.to_string());
    }
    args.extend([
        "-vf".to_string(),
        format!("fps=1/{}", params.interval_secs),
        pattern.to_string_lossy().into_owned(),
    ]);

    runner.run(TRANSFORM_TOOL, &args).await?;

    Ok(count_frames(output_dir))
}

/// Count extracted frames in a snapshot directory.
pub fn count_frames(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.file_name()
                        .to_string_lossy()
                        .strip_prefix("frame_")
                        .is_some_and(|rest| rest.ends_with(".jpg"))
                })
                .count()
        })
        .unwrap_or(0)
}
