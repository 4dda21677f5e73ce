//! Scratch filesystem trees shared by the workspace's tests.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Temporary directory that is removed when dropped.
#[derive(Debug)]
pub struct ScratchTree {
    root: TempDir,
}

impl ScratchTree {
    /// Creates an empty scratch directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            root: tempfile::tempdir()?,
        })
    }

    /// Root of the tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Writes `contents` to `name` and applies `mode`.
    pub fn file(&self, name: &str, contents: &[u8], mode: u32) -> io::Result<PathBuf> {
        let path = self.root.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(mode))?;
        Ok(path)
    }

    /// Creates the directory `name`, including missing parents.
    pub fn dir(&self, name: &str) -> io::Result<PathBuf> {
        let path = self.root.path().join(name);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Path of `name` inside the tree without creating anything.
    #[must_use]
    pub fn missing(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }
}
