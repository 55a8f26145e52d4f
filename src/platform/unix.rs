//! Unix side of the platform layer: POSIX modes, ownership and durable writes.

use anyhow::{bail, Context, Result};
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::{MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;

use super::temp::tmp_sibling_name;

const PRIVATE_FILE: u32 = 0o600;
const PRIVATE_DIR: u32 = 0o700;

/// Append handle for the log file. A file created here is private to the
/// owner; an existing file keeps whatever mode it already has.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let created = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(PRIVATE_FILE)
        .open(path)?;
    if created {
        // The umask may have narrowed the create mode further; pin it.
        let _ = fs::set_permissions(path, Permissions::from_mode(PRIVATE_FILE));
    }
    Ok(file)
}

/// Stage `contents` in a private sibling file, then rename it over `path` and
/// sync the directory entry.
fn write_private_durably(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("'{}' has no parent directory", path.display()))?;
    fs::create_dir_all(dir).with_context(|| format!("create directory '{}'", dir.display()))?;

    let staged = tmp_sibling_name(path);
    let written = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(PRIVATE_FILE)
        .open(&staged)
        .and_then(|mut f| {
            f.write_all(contents)?;
            f.sync_all()
        })
        .and_then(|()| fs::rename(&staged, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&staged);
        return Err(e).with_context(|| format!("write '{}' via '{}'", path.display(), staged.display()));
    }

    File::open(dir)
        .and_then(|d| d.sync_all())
        .with_context(|| format!("sync directory '{}'", dir.display()))
}

/// Create a config file that only the owner can read. Refuses to replace an
/// existing file.
pub fn write_config_secure_new_0600(path: &Path, contents: &[u8]) -> Result<()> {
    if path.exists() {
        bail!("config file already exists: {}", path.display());
    }
    write_private_durably(path, contents)
}

pub fn set_dir_mode_0700(path: &Path) -> io::Result<()> {
    fs::set_permissions(path, Permissions::from_mode(PRIVATE_DIR))
}

pub fn set_file_mode_0600(path: &Path) -> io::Result<()> {
    fs::set_permissions(path, Permissions::from_mode(PRIVATE_FILE))
}

/// Bytes available to unprivileged callers on the filesystem holding `path`.
pub fn available_space(path: &Path) -> io::Result<u64> {
    fs2::available_space(path)
}

pub fn owner_is_root(meta: &fs::Metadata) -> bool {
    meta.uid() == 0
}
