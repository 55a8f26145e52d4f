//! Scope-bound temporary files and directories.

use anyhow::{Context, Result};
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

use crate::config::Config;
use crate::path::SuperPath;

const SHM_DIR: &str = "/dev/shm";

/// Where and how a temporary entry is created.
#[derive(Debug, Clone)]
pub struct TempOptions {
    /// Name suffix, e.g. `.json`.
    pub suffix: Option<String>,
    /// Name prefix.
    pub prefix: Option<String>,
    /// Place the entry in `/dev/shm` when it exists.
    pub in_memory: bool,
    /// Explicit parent directory; wins over `in_memory`.
    pub dir: Option<PathBuf>,
}

impl Default for TempOptions {
    fn default() -> Self {
        Self {
            suffix: None,
            prefix: None,
            in_memory: true,
            dir: None,
        }
    }
}

impl TempOptions {
    pub fn on_disk() -> Self {
        Self {
            in_memory: false,
            ..Self::default()
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            in_memory: cfg.temp_in_memory,
            ..Self::default()
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    fn parent(&self) -> PathBuf {
        if let Some(dir) = &self.dir {
            return dir.clone();
        }
        if self.in_memory && Path::new(SHM_DIR).is_dir() {
            return PathBuf::from(SHM_DIR);
        }
        std::env::temp_dir()
    }

    fn builder(&self) -> tempfile::Builder<'_, '_> {
        let mut b = tempfile::Builder::new();
        if let Some(p) = &self.prefix {
            b.prefix(p);
        }
        if let Some(s) = &self.suffix {
            b.suffix(s);
        }
        b
    }
}

/// A path deleted when the guard drops (file: unlink, directory: recursive delete).
///
/// Dropping also runs during unwinding, so the entry goes away on panics too.
/// Use [`TempPath::keep`] to disarm.
#[derive(Debug)]
pub struct TempPath {
    path: SuperPath,
    armed: bool,
}

impl TempPath {
    fn new(path: impl Into<SuperPath>) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    pub fn path(&self) -> &SuperPath {
        &self.path
    }

    /// Stop tracking the entry and hand back its path.
    pub fn keep(mut self) -> SuperPath {
        self.armed = false;
        self.path.clone()
    }

    /// Delete now, reporting errors instead of logging them.
    pub fn close(mut self) -> Result<()> {
        self.armed = false;
        remove_entry(&self.path).with_context(|| format!("remove temporary '{}'", self.path))
    }
}

impl Deref for TempPath {
    type Target = SuperPath;

    fn deref(&self) -> &SuperPath {
        self.path()
    }
}

impl AsRef<Path> for TempPath {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match remove_entry(&self.path) {
            Ok(()) => trace!(path = %self.path, "removed temporary entry"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path, error = %e, "failed to remove temporary entry"),
        }
    }
}

fn remove_entry(p: &SuperPath) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(p)?;
    if meta.is_dir() {
        fs::remove_dir_all(p)
    } else {
        fs::remove_file(p)
    }
}

impl SuperPath {
    /// Create an empty temporary file that is deleted when the guard drops.
    pub fn tempfile(options: TempOptions) -> Result<TempPath> {
        let parent = options.parent();
        let file = options
            .builder()
            .tempfile_in(&parent)
            .with_context(|| format!("create temporary file in '{}'", parent.display()))?;
        let (_, path) = file
            .keep()
            .with_context(|| format!("persist temporary file in '{}'", parent.display()))?;
        trace!(path = %path.display(), "created temporary file");
        Ok(TempPath::new(path))
    }

    /// Create a temporary directory that is deleted (recursively) when the guard drops.
    pub fn tempdir(options: TempOptions) -> Result<TempPath> {
        let parent = options.parent();
        let dir = options
            .builder()
            .tempdir_in(&parent)
            .with_context(|| format!("create temporary directory in '{}'", parent.display()))?;
        let path = dir.keep();
        trace!(path = %path.display(), "created temporary directory");
        Ok(TempPath::new(path))
    }
}
