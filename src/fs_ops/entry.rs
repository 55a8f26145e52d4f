//! Single-entry operations: listing, touch, rmdir, unlink.

use anyhow::Result;
use filetime::{set_file_mtime, FileTime};
use std::fs::{self, OpenOptions};
use std::io;

use super::helpers::io_error_with_help;
use crate::path::SuperPath;
use crate::properties::filetime_from_secs;

impl SuperPath {
    /// Immediate children in name order. A missing directory has none.
    pub fn iterdir(&self) -> Result<Vec<SuperPath>> {
        let rd = match fs::read_dir(self) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error_with_help("list directory", self)(e)),
        };
        let mut children = rd
            .map(|entry| entry.map(|e| SuperPath::from(e.path())))
            .collect::<io::Result<Vec<_>>>()
            .map_err(io_error_with_help("list directory", self))?;
        children.sort();
        Ok(children)
    }

    /// Create the file (and missing parents) if needed; with `mtime` (seconds since
    /// the epoch) set the modification time afterwards.
    pub fn touch(&self, mtime: Option<f64>) -> Result<()> {
        let open = || OpenOptions::new().create(true).append(true).open(self);
        match open() {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.create_parent()?;
                open().map_err(io_error_with_help("create file", self))?;
            }
            Err(e) => return Err(io_error_with_help("create file", self)(e)),
        }
        match mtime {
            Some(t) => {
                set_file_mtime(self, filetime_from_secs(t)).map_err(io_error_with_help("set mtime", self))?;
            }
            None => {
                set_file_mtime(self, FileTime::now()).map_err(io_error_with_help("set mtime", self))?;
            }
        }
        Ok(())
    }

    /// Remove an empty directory. A missing one is fine.
    pub fn rmdir(&self) -> Result<()> {
        match fs::remove_dir(self) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(io_error_with_help("remove directory", self)(e))
            }
            _ => Ok(()),
        }
    }

    /// Remove a file or symlink.
    pub fn unlink(&self, missing_ok: bool) -> Result<()> {
        match fs::remove_file(self) {
            Err(e) if e.kind() == io::ErrorKind::NotFound && missing_ok => Ok(()),
            Err(e) => Err(io_error_with_help("remove file", self)(e)),
            Ok(()) => Ok(()),
        }
    }
}
