//! Scratch file lifecycle management.
//!
//! Every media file a request materializes lives in a working directory under
//! a random unique name and is owned by exactly one [`ScratchFile`] guard.
//! The guard removes the file when dropped, on every exit path; removal
//! failures are swallowed. A file that must outlive its request (a response
//! body still streaming, or an output published under the public directory)
//! is released with [`ScratchFile::into_path`].

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Allocator for collision-free scratch paths inside one working directory.
#[derive(Debug, Clone)]
pub struct Workdir {
    root: PathBuf,
}

impl Workdir {
    /// Create a workdir rooted at `root`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(Error::Io)?;
        Ok(Self { root })
    }

    /// The working directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a uniquely named scratch file with the given extension.
    ///
    /// The file is not created on disk; only the path is reserved via a
    /// random UUID, so concurrent requests never collide.
    pub fn allocate(&self, extension: &str) -> ScratchFile {
        let name = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        ScratchFile {
            path: self.root.join(name),
        }
    }

    /// Path to a named subdirectory, created on demand.
    pub fn subdir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root.join(name);
        std::fs::create_dir_all(&dir).map_err(Error::Io)?;
        Ok(dir)
    }
}

/// Owned scratch path, deleted on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Take ownership of an existing path.
    pub fn from_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the path without deleting it.
    ///
    /// Used when deletion must be deferred past the end of the request, e.g.
    /// until a download response body finishes streaming.
    pub fn into_path(mut self) -> PathBuf {
        std::mem::take(&mut self.path)
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.path.as_os_str().is_empty() {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed scratch file {:?}", self.path),
            // Already gone, or never materialized
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::debug!("Failed to remove scratch file {:?}: {}", self.path, e),
        }
    }
}
