//! Metadata properties: times, size, ownership, children, tags, type and hash.
//!
//! Read accessors treat a missing path as empty (0, 0.0, no tags) instead of
//! failing.

mod filetype;
mod hash;
mod tags;

pub use tags::{Tag, TAGS_XATTR};

use anyhow::Result;
use filetime::{set_file_times, FileTime};
use std::fs;
use std::io;
use std::time::UNIX_EPOCH;

use crate::fs_ops::helpers::io_error_with_help;
use crate::path::SuperPath;
use crate::platform::owner_is_root;

pub(crate) fn filetime_from_secs(t: f64) -> FileTime {
    let secs = t.floor();
    let nanos = ((t - secs) * 1e9).round().min(999_999_999.0) as u32;
    FileTime::from_unix_time(secs as i64, nanos)
}

impl SuperPath {
    /// Modification time in seconds since the epoch; 0.0 when missing.
    pub fn mtime(&self) -> f64 {
        fs::metadata(self)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| match t.duration_since(UNIX_EPOCH) {
                Ok(d) => Some(d.as_secs_f64()),
                Err(e) => Some(-e.duration().as_secs_f64()),
            })
            .unwrap_or(0.0)
    }

    /// Set both access and modification time.
    pub fn set_mtime(&self, t: f64) -> Result<()> {
        let ft = filetime_from_secs(t);
        set_file_times(self, ft, ft).map_err(io_error_with_help("set file times", self))?;
        Ok(())
    }

    /// Size in bytes; 0 when missing.
    pub fn size(&self) -> u64 {
        fs::metadata(self).map(|m| m.len()).unwrap_or(0)
    }

    /// Whether the closest existing ancestor (or the path itself) is owned by
    /// the superuser.
    pub fn is_root(&self) -> bool {
        let mut path = self.clone();
        loop {
            match fs::metadata(&path) {
                Ok(meta) => return owner_is_root(&meta),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    let parent = path.parent();
                    if parent == path {
                        return false;
                    }
                    path = parent;
                }
                Err(_) => return false,
            }
        }
    }

    pub fn has_children(&self) -> bool {
        fs::read_dir(self)
            .map(|mut rd| rd.next().is_some())
            .unwrap_or(false)
    }

    pub fn number_of_children(&self) -> usize {
        fs::read_dir(self).map(|rd| rd.count()).unwrap_or(0)
    }

    /// Missing, an empty directory or a zero-length file.
    pub fn is_empty(&self) -> bool {
        match fs::metadata(self) {
            Err(_) => true,
            Ok(m) if m.is_dir() => !self.has_children(),
            Ok(m) => m.is_file() && m.len() == 0,
        }
    }
}
