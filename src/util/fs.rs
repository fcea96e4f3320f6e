//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

/// Return the first path that already exists (file, directory or anything else).
pub fn first_existing<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Option<&'a Path> {
    paths.into_iter().find(|p| p.exists())
}

/// Removes a file when dropped, unless disarmed.
///
/// Armed as soon as the file has been created, so the removal happens on
/// every exit path of the caller, including early returns through `?`.
#[derive(Debug)]
pub struct RemoveOnDrop {
    path: PathBuf,
    armed: bool,
}

impl RemoveOnDrop {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RemoveOnDrop {
            path: path.into(),
            armed: true,
        }
    }

    /// Keep the file.
    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to remove {}: {}", self.path.display(), e),
        }
    }
}
