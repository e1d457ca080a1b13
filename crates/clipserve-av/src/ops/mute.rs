//! Audio stream removal.

use super::{require_input, TRANSFORM_TOOL};
use crate::runner::ProcessRunner;
use crate::Result;
use std::path::Path;

/// Strip the audio stream, copying video untouched.
pub async fn mute(runner: &dyn ProcessRunner, input: &Path, output: &Path) -> Result<()> {
    require_input(input)?;

    let args = vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-an".to_string(),
        output.to_string_lossy().into_owned(),
    ];

    runner.run(TRANSFORM_TOOL, &args).await?;
    Ok(())
}
