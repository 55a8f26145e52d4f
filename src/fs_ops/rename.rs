//! Rename with parent creation, overwrite opt-in and a cross-filesystem fallback.

use anyhow::Result;
use std::fs;
use std::io;
use tracing::{debug, warn};

use super::copy::move_across_devices;
use super::helpers::io_error_with_help;
use super::remove::RmtreeOptions;
use super::util::{is_cross_device, is_dir_not_empty};
use crate::errors::SuperPathError;
use crate::path::SuperPath;

impl SuperPath {
    /// Move this path to `target` and return the realized target.
    ///
    /// - The target's parent is created when missing.
    /// - A file target is replaced as the platform rename does. A non-empty
    ///   directory target fails unless `exist_ok`, in which case it is deleted
    ///   and the rename retried.
    /// - Across filesystems an existing target is deleted when `exist_ok`,
    ///   otherwise [`SuperPathError::TargetExists`] is returned; then the
    ///   source is copied and deleted.
    pub fn rename(&self, target: impl Into<SuperPath>, exist_ok: bool) -> Result<SuperPath> {
        let target = target.into();
        target.create_parent()?;

        let err = match rename_once(self, &target, exist_ok) {
            Ok(()) => {
                debug!(src = %self, dest = %target, "renamed");
                return Ok(target);
            }
            Err(e) => e,
        };

        if exist_ok && is_dir_not_empty(&err) {
            debug!(dest = %target, "target directory not empty; removing before retry");
            target.rmtree(RmtreeOptions::default())?;
            rename_once(self, &target, exist_ok).map_err(io_error_with_help("rename onto", &target))?;
            return Ok(target);
        }

        if is_cross_device(&err) {
            if target.exists() || target.is_symlink() {
                if !exist_ok {
                    return Err(SuperPathError::TargetExists {
                        path: target.into_path_buf(),
                        source: err,
                    }
                    .into());
                }
                if target.is_dir() && !target.is_symlink() {
                    target.rmtree(RmtreeOptions::default())?;
                } else {
                    target.unlink(false)?;
                }
            } else {
                target.create_parent()?;
            }
            warn!(src = %self, dest = %target, "rename crosses filesystems; falling back to copy");
            move_across_devices(self, &target)?;
            return Ok(target);
        }

        Err(io_error_with_help("rename onto", &target)(err))
    }

    /// [`SuperPath::rename`] with `exist_ok`.
    pub fn replace(&self, target: impl Into<SuperPath>) -> Result<SuperPath> {
        self.rename(target, true)
    }

    /// Move this path up one level (`a/b/c` -> `a/c`), removing `a/b` when it
    /// ends up empty. When the name is still taken after that, the moved entry
    /// is merged into the existing one.
    pub fn pop_parent(&self) -> Result<SuperPath> {
        let parent = self.parent();
        let Some(name) = self.file_name() else {
            return Ok(self.clone());
        };
        let dest = parent.parent().join(name);

        // The destination can be our own parent (`x/x`), so go through a free name.
        let staged = dest.with_nonexistent_name();
        self.rename(&staged, false)?;

        if !parent.has_children() {
            parent.rmdir()?;
        }
        if !parent.exists() && staged != dest {
            return staged.rename(&dest, false);
        }
        if staged != dest {
            merge_into(&staged, &dest)?;
        }
        Ok(dest)
    }
}

#[cfg(windows)]
fn rename_once(src: &SuperPath, dest: &SuperPath, exist_ok: bool) -> io::Result<()> {
    if !exist_ok && dest.exists() {
        return Err(io::Error::from(io::ErrorKind::AlreadyExists));
    }
    fs::rename(src, dest)
}

#[cfg(not(windows))]
fn rename_once(src: &SuperPath, dest: &SuperPath, _exist_ok: bool) -> io::Result<()> {
    fs::rename(src, dest)
}

/// Copy everything under `src` into `dest` (overwriting files), then remove `src`.
fn merge_into(src: &SuperPath, dest: &SuperPath) -> Result<()> {
    if !src.is_dir() || !dest.is_dir() {
        src.rename(dest, true)?;
        return Ok(());
    }
    for child in src.iterdir()? {
        let Some(name) = child.file_name() else { continue };
        let target = dest.join(name);
        if child.is_dir() && target.is_dir() {
            merge_into(&child, &target)?;
        } else {
            child.rename(&target, true)?;
        }
    }
    src.rmdir()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_missing_parent() {
        let td = tempdir().unwrap();
        let src = SuperPath::from(td.path().join("a.txt"));
        fs::write(&src, b"x").unwrap();
        let dest = SuperPath::from(td.path().join("new/deeper/a.txt"));
        assert_eq!(src.rename(&dest, false).unwrap(), dest);
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"x");
    }

    #[test]
    fn nonempty_dir_needs_opt_in() {
        let td = tempdir().unwrap();
        let a = SuperPath::from(td.path().join("a"));
        let b = SuperPath::from(td.path().join("b"));
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("f"), b"from a").unwrap();
        fs::write(b.join("f"), b"from b").unwrap();

        assert!(a.rename(&b, false).is_err());
        assert_eq!(fs::read(a.join("f")).unwrap(), b"from a");
        assert_eq!(fs::read(b.join("f")).unwrap(), b"from b");

        a.replace(&b).unwrap();
        assert!(!a.exists());
        assert_eq!(fs::read(b.join("f")).unwrap(), b"from a");
    }

    #[test]
    fn pop_parent_into_same_name() {
        let td = tempdir().unwrap();
        let outer = SuperPath::from(td.path().join("pkg"));
        let inner = outer.join("pkg");
        fs::create_dir_all(&inner).unwrap();
        fs::write(inner.join("data.txt"), b"d").unwrap();

        let got = inner.pop_parent().unwrap();
        assert_eq!(got, outer);
        assert_eq!(fs::read(outer.join("data.txt")).unwrap(), b"d");
        assert!(!outer.join("pkg").exists());
    }

    #[test]
    fn pop_parent_keeps_nonempty_parent() {
        let td = tempdir().unwrap();
        let parent = SuperPath::from(td.path().join("p"));
        fs::create_dir_all(&parent).unwrap();
        fs::write(parent.join("child.txt"), b"c").unwrap();
        fs::write(parent.join("other.txt"), b"o").unwrap();

        let got = parent.join("child.txt").pop_parent().unwrap();
        assert_eq!(got, SuperPath::from(td.path().join("child.txt")));
        assert!(parent.join("other.txt").exists());
    }
}
