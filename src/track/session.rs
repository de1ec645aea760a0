// Exclusive track file sessions
//
// A writer or reader owns its path for as long as it lives. A second open of
// the same path in this process fails with Error::AlreadyOpen. Other
// processes are not coordinated with.

use crate::{Error, Result};
use parking_lot::{const_mutex, Mutex};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

static OPEN_TRACK_FILES: Mutex<BTreeSet<PathBuf>> = const_mutex(BTreeSet::new());

/// Ownership of a track file path, released on drop
#[derive(Debug)]
pub struct PathLease {
    path: PathBuf,
}

impl PathLease {
    /// Claim a path for one writer or reader
    pub fn acquire(path: &Path) -> Result<Self> {
        let path = session_key(path)?;
        let mut open = OPEN_TRACK_FILES.lock();
        if !open.insert(path.clone()) {
            return Err(Error::AlreadyOpen(path));
        }
        tracing::trace!(path = %path.display(), "Track file session opened");
        Ok(PathLease { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PathLease {
    fn drop(&mut self) {
        OPEN_TRACK_FILES.lock().remove(&self.path);
        tracing::trace!(path = %self.path.display(), "Track file session released");
    }
}

/// Canonical parent directory joined with the file name
///
/// The file itself may not exist yet when a writer claims it.
fn session_key(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a file", path.display()),
        )
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(parent.canonicalize()?.join(file_name))
}
