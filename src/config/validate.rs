//! Config validation logic.
//! Rejects settings that would only fail later, deep inside an operation.

use anyhow::{bail, Result};
use tracing::debug;

use super::paths::path_has_symlink_ancestor;
use super::types::Config;

impl Config {
    /// Validate folder roots, timeout and log destination.
    pub fn validate(&self) -> Result<()> {
        if self.folders.home.as_os_str().is_empty() {
            bail!("home folder must not be empty");
        }
        if self.subprocess_timeout.is_zero() {
            bail!("subprocess_timeout must be greater than zero");
        }
        if let Some(log) = &self.log_file {
            if log.is_dir() {
                bail!("log_file '{}' is a directory", log.display());
            }
            if path_has_symlink_ancestor(log)? {
                bail!("log_file '{}' has a symlinked ancestor", log.display());
            }
        }
        debug!(home = %self.folders.home.display(), "Config validated");
        Ok(())
    }
}
