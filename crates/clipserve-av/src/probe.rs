//! Media duration probing via ffprobe.

use crate::runner::ProcessRunner;
use crate::{Error, Result};
use std::path::Path;

const PROBE_TOOL: &str = "ffprobe";

/// Probe the duration of a media file in seconds.
pub async fn duration_secs(runner: &dyn ProcessRunner, input: &Path) -> Result<f64> {
    if !input.exists() {
        return Err(Error::file_not_found(input));
    }

    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        input.to_string_lossy().into_owned(),
    ];

    let output = runner.run(PROBE_TOOL, &args).await?;

    output
        .stdout
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::parse_error(PROBE_TOOL, format!("not a duration: {:?}", output.stdout.trim())))
}
