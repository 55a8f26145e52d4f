//! Recursive delete.

use anyhow::Result;
use std::fs;
use std::io;
use tracing::{debug, warn};

use super::helpers::io_error_with_help;
use crate::path::SuperPath;

/// Options for [`SuperPath::rmtree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RmtreeOptions {
    /// A missing path is not an error.
    pub missing_ok: bool,
    /// When false, the directory itself is left in place, empty.
    pub remove_root: bool,
    /// Swallow every error (the tree may be left partially removed).
    pub ignore_errors: bool,
}

impl Default for RmtreeOptions {
    fn default() -> Self {
        Self {
            missing_ok: false,
            remove_root: true,
            ignore_errors: false,
        }
    }
}

impl RmtreeOptions {
    pub fn missing_ok() -> Self {
        Self {
            missing_ok: true,
            ..Self::default()
        }
    }
}

impl SuperPath {
    /// Remove this directory and everything below it.
    pub fn rmtree(&self, options: RmtreeOptions) -> Result<()> {
        match remove_tree(self) {
            Ok(()) => debug!(path = %self, "removed tree"),
            Err(e) if e.kind() == io::ErrorKind::NotFound && options.missing_ok => {}
            Err(e) if options.ignore_errors => {
                warn!(path = %self, error = %e, "rmtree: ignoring error");
            }
            Err(e) => return Err(io_error_with_help("remove directory tree", self)(e)),
        }

        if !options.remove_root {
            fs::create_dir_all(self).map_err(io_error_with_help("recreate directory", self))?;
        }
        Ok(())
    }
}

#[cfg(not(windows))]
fn remove_tree(path: &SuperPath) -> io::Result<()> {
    fs::remove_dir_all(path)
}

/// Read-only entries refuse deletion on Windows; clear the flag below `path`
/// and try once more.
#[cfg(windows)]
fn remove_tree(path: &SuperPath) -> io::Result<()> {
    use crate::platform::relax_permissions;
    use walkdir::WalkDir;

    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            warn!(path = %path, "permission denied; clearing read-only flags and retrying");
            for entry in WalkDir::new(path).follow_links(false).into_iter().filter_map(Result::ok) {
                let _ = relax_permissions(entry.path());
            }
            fs::remove_dir_all(path)
        }
        other => other,
    }
}
