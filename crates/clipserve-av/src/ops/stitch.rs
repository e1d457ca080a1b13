//! End-to-end concatenation of two inputs.

use super::{require_input, TRANSFORM_TOOL};
use crate::runner::ProcessRunner;
use crate::scratch::Workdir;
use crate::Result;
use std::path::Path;

/// Concatenate exactly two inputs into `output` using the concat demuxer.
///
/// Uses a manifest of absolute input paths with `-c copy`, so the inputs
/// must share compatible codec parameters; mismatches surface as a process
/// failure from ffmpeg.
pub async fn stitch(
    runner: &dyn ProcessRunner,
    workdir: &Workdir,
    first: &Path,
    second: &Path,
    output: &Path,
) -> Result<()> {
    require_input(first)?;
    require_input(second)?;

    // Manifest guard drops (and deletes) once ffmpeg has run
    let manifest = workdir.allocate("txt");
    let listing = format!(
        "file '{}'\nfile '{}'\n",
        escape_manifest_path(first),
        escape_manifest_path(second)
    );
    tokio::fs::write(manifest.path(), listing).await?;

    let args = vec![
        "-y".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        manifest.path().to_string_lossy().into_owned(),
        "-c".to_string(),
        "copy".to_string(),
        output.to_string_lossy().into_owned(),
    ];

    runner.run(TRANSFORM_TOOL, &args).await?;
    Ok(())
}

// concat demuxer quoting: a single quote inside a quoted string is written
// as '\''
fn escape_manifest_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "'\\''")
}
