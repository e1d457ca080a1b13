//! Sub-range trimming.

use super::{require_input, TRANSFORM_TOOL};
use crate::runner::ProcessRunner;
use crate::Result;
use std::path::Path;

/// Cut `[start, start + duration)` seconds out of `input` into `output`.
///
/// Re-encodes to h264/aac rather than stream-copying. Copying would be
/// faster, but cut points then snap to the nearest keyframe and the clip
/// boundaries drift; precise boundaries matter more here than speed.
pub async fn trim(
    runner: &dyn ProcessRunner,
    input: &Path,
    output: &Path,
    start_secs: f64,
    duration_secs: f64,
) -> Result<()> {
    require_input(input)?;
    runner
        .run(TRANSFORM_TOOL, &trim_args(input, output, start_secs, duration_secs))
        .await?;
    Ok(())
}

fn trim_args(input: &Path, output: &Path, start_secs: f64, duration_secs: f64) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-ss".to_string(),
        start_secs.to_string(),
        "-t".to_string(),
        duration_secs.to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}
