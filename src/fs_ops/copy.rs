//! Copy helpers used by the cross-device move fallback and `copy_to`.
//!
//! - Files are copied to a temp name inside the destination directory, then
//!   renamed into place (same directory, so the rename is atomic).
//! - Directory trees are walked with walkdir: directories created, files copied,
//!   symlinks recreated (not followed).
//! - Timestamps/permissions/xattrs are carried over best-effort.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::helpers::io_error_with_help;
use super::{metadata, util};
use crate::errors::SuperPathError;
use crate::path::SuperPath;
use crate::platform::available_space;

const COPY_BUF: usize = 1 << 20;

/// Stream `src` into a file that must not exist yet, then sync it.
fn stream_into_new(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut reader = BufReader::with_capacity(COPY_BUF, File::open(src)?);
    let out = OpenOptions::new().write(true).create_new(true).open(dst)?;
    let mut writer = BufWriter::with_capacity(COPY_BUF, out);
    let n = io::copy(&mut reader, &mut writer)?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok(n)
}

/// Copy `src` -> temp file in `dest`'s directory, then rename temp -> `dest`.
/// An existing `dest` file is replaced.
pub(super) fn safe_copy_and_rename(src: &Path, dest: &Path) -> Result<()> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| anyhow!("destination has no parent: {}", dest.display()))?;
    fs::create_dir_all(dest_dir)
        .map_err(io_error_with_help("create destination directory", dest_dir))?;

    let tmp_path = util::unique_temp_path(dest_dir);
    if let Err(e) = stream_into_new(src, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error_with_help("copy to temporary file", &tmp_path)(e));
    }

    if let Err(e) = fs::rename(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| {
            format!(
                "rename temporary file '{}' -> '{}'",
                tmp_path.display(),
                dest.display()
            )
        });
    }
    if let Err(e) = util::fsync_dir(dest_dir) {
        warn!(dir = %dest_dir.display(), error = %e, "fsync of destination directory failed");
    }
    Ok(())
}

/// Copy a file and carry over its metadata.
fn copy_file_with_metadata(src: &Path, dest: &Path, src_meta: &fs::Metadata) -> Result<()> {
    safe_copy_and_rename(src, dest)?;
    metadata::preserve_metadata(dest, src_meta);
    metadata::preserve_xattrs(src, dest);
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let link = fs::read_link(src).map_err(io_error_with_help("read symlink", src))?;
    std::os::unix::fs::symlink(&link, dest).map_err(io_error_with_help("create symlink", dest))?;
    Ok(())
}

#[cfg(windows)]
fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let link = fs::read_link(src).map_err(io_error_with_help("read symlink", src))?;
    let made = if src.is_dir() {
        std::os::windows::fs::symlink_dir(&link, dest)
    } else {
        std::os::windows::fs::symlink_file(&link, dest)
    };
    made.map_err(io_error_with_help("create symlink", dest))?;
    Ok(())
}

/// Recreate the tree under `src` at `dest`.
fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.with_context(|| format!("walk '{}'", src.display()))?;
        let rel = entry.path().strip_prefix(src)?;
        let target = dest.join(rel);
        let ft = entry.file_type();

        if ft.is_dir() {
            fs::create_dir_all(&target).map_err(io_error_with_help("create directory", &target))?;
            let meta = entry
                .metadata()
                .with_context(|| format!("stat '{}'", entry.path().display()))?;
            dirs.push((target, meta));
        } else if ft.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            let meta = entry
                .metadata()
                .with_context(|| format!("stat '{}'", entry.path().display()))?;
            copy_file_with_metadata(entry.path(), &target, &meta)?;
        }
    }
    // Directory times last; creating children bumps the parent's mtime.
    for (dir, meta) in dirs.iter().rev() {
        metadata::preserve_metadata(dir, meta);
    }
    Ok(())
}

/// Bytes a copy of `src` will take (regular files only).
fn required_bytes(src: &Path) -> u64 {
    WalkDir::new(src)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

fn ensure_space(src: &Path, dest: &Path) -> Result<()> {
    let Some(dest_dir) = dest.parent() else {
        return Ok(());
    };
    let required = required_bytes(src);
    match available_space(dest_dir) {
        Ok(available) if available < required => Err(SuperPathError::InsufficientSpace {
            required,
            available,
            dest: dest.to_path_buf(),
        }
        .into()),
        Ok(_) => Ok(()),
        Err(e) => {
            warn!(dir = %dest_dir.display(), error = %e, "cannot determine free space; copying anyway");
            Ok(())
        }
    }
}

/// Move `src` to `dest` by copy-then-delete. `dest` must not exist and its
/// parent must. Used when a rename crosses filesystems, but works on any pair.
pub fn move_across_devices(src: &SuperPath, dest: &SuperPath) -> Result<()> {
    let meta = fs::symlink_metadata(src).map_err(io_error_with_help("stat source", src))?;
    ensure_space(src, dest)?;

    if meta.is_dir() {
        copy_tree(src, dest)?;
        fs::remove_dir_all(src).map_err(io_error_with_help("remove source directory", src))?;
    } else if meta.file_type().is_symlink() {
        copy_symlink(src, dest)?;
        fs::remove_file(src).map_err(io_error_with_help("remove source symlink", src))?;
    } else {
        copy_file_with_metadata(src, dest, &meta)?;
        fs::remove_file(src).map_err(io_error_with_help("remove source file", src))?;
    }

    info!(src = %src, dest = %dest, "moved across filesystems via copy");
    Ok(())
}

impl SuperPath {
    /// Write this file's bytes to `dest` (parents created, existing file replaced).
    ///
    /// With `only_if_newer`, nothing happens unless this file's mtime is strictly
    /// greater than `dest`'s (a missing `dest` counts as 0). With
    /// `include_properties`, the tag and mtime are copied afterwards.
    pub fn copy_to(&self, dest: &SuperPath, include_properties: bool, only_if_newer: bool) -> Result<()> {
        if only_if_newer && self.mtime() <= dest.mtime() {
            debug!(src = %self, dest = %dest, "destination is up to date; skipping copy");
            return Ok(());
        }
        safe_copy_and_rename(self, dest)?;
        if include_properties {
            self.copy_properties_to(dest)?;
        }
        Ok(())
    }

    /// Apply this path's first tag and mtime to `dest` and everything under it.
    pub fn copy_properties_to(&self, dest: &SuperPath) -> Result<()> {
        let tag = self.tag();
        let mtime = self.mtime();
        for path in dest.find() {
            match &tag {
                Some(t) => path.set_tag(t.as_str())?,
                None => path.clear_tags()?,
            }
            path.set_mtime(mtime)?;
        }
        Ok(())
    }
}
