use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::platform::tmp_sibling_name;

/// Hidden temp path inside `dst_dir`, used as the staging name for copies.
pub(super) fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    tmp_sibling_name(&dst_dir.join("staging"))
}

pub(super) fn is_cross_device(e: &io::Error) -> bool {
    // Match the raw code as well as the ErrorKind: older kernels/filesystems
    // report EXDEV without a mapped kind on some platforms.
    if e.kind() == io::ErrorKind::CrossesDevices {
        return true;
    }
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            if code == libc::EXDEV {
                return true;
            }
        }
        #[cfg(windows)]
        {
            // ERROR_NOT_SAME_DEVICE
            if code == 17 {
                return true;
            }
        }
    }
    false
}

/// Rename onto a populated directory: ENOTEMPTY, or EEXIST on some Unixes.
pub(super) fn is_dir_not_empty(e: &io::Error) -> bool {
    if e.kind() == io::ErrorKind::DirectoryNotEmpty {
        return true;
    }
    #[cfg(unix)]
    if let Some(code) = e.raw_os_error() {
        return code == libc::ENOTEMPTY || code == libc::EEXIST;
    }
    false
}

#[cfg(unix)]
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

#[cfg(windows)]
pub(super) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
