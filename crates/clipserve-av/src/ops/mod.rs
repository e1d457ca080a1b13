//! Transform operations.
//!
//! Each operation is a fixed ffmpeg argument template composed over the
//! process runner; inputs and outputs are scratch files owned by the caller.

mod clip;
mod mute;
mod snapshots;
mod stitch;
mod trim;

pub use clip::{clip_window, extract_clip, ClipBounds, ClipWindow};
pub use mute::mute;
pub use snapshots::{extract_snapshots, SnapshotParams};
pub use stitch::stitch;
pub use trim::trim;

use crate::{Error, Result};
use std::path::Path;

pub(crate) const TRANSFORM_TOOL: &str = "ffmpeg";

pub(crate) fn require_input(input: &Path) -> Result<()> {
    if input.exists() {
        Ok(())
    } else {
        Err(Error::file_not_found(input))
    }
}
