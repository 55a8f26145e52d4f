//! Metadata preservation.
//! - Copies timestamps (atime, mtime) and, on Unix, permissions (mode) from source->dest.
//! - Copies extended attributes when the `xattrs` feature is enabled.
//! - Best-effort: failures are logged and ignored.

use filetime::{set_file_times, FileTime};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

/// Preserve timestamps and permissions on `dest` using already-fetched `src_meta`.
pub(super) fn preserve_metadata(dest: &Path, src_meta: &fs::Metadata) {
    let at = FileTime::from_last_access_time(src_meta);
    let mt = FileTime::from_last_modification_time(src_meta);
    if let Err(e) = set_file_times(dest, at, mt) {
        warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination");
    } else {
        trace!(path = %dest.display(), "set atime/mtime on destination");
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let src_mode = src_meta.permissions().mode() & 0o7777;
        if let Err(e) = fs::set_permissions(dest, fs::Permissions::from_mode(src_mode)) {
            warn!(path = %dest.display(), mode = format!("{:o}", src_mode), error = %e, "failed to set permissions on destination");
        }
    }

    #[cfg(windows)]
    {
        if let Ok(meta) = fs::metadata(dest) {
            let mut perms = meta.permissions();
            perms.set_readonly(src_meta.permissions().readonly());
            if let Err(e) = fs::set_permissions(dest, perms) {
                warn!(path = %dest.display(), error = %e, "failed to set readonly attribute on destination");
            }
        }
    }
}

/// Copy every extended attribute from `src` to `dest` (no-op without the `xattrs` feature).
pub(super) fn preserve_xattrs(src: &Path, dest: &Path) {
    #[cfg(all(unix, feature = "xattrs"))]
    {
        let names = match xattr::list(src) {
            Ok(names) => names,
            Err(e) => {
                trace!(src = %src.display(), error = %e, "cannot list xattrs; skipping");
                return;
            }
        };
        for name in names {
            match xattr::get(src, &name) {
                Ok(value) => {
                    let value = value.unwrap_or_default();
                    if let Err(e) = xattr::set(dest, &name, &value) {
                        warn!(dest = %dest.display(), xattr = %name.to_string_lossy(), error = %e, "failed to set xattr on destination");
                    }
                }
                Err(e) => {
                    warn!(src = %src.display(), xattr = %name.to_string_lossy(), error = %e, "failed to read xattr from source");
                }
            }
        }
    }
    #[cfg(not(all(unix, feature = "xattrs")))]
    {
        let _ = (src, dest);
    }
}
