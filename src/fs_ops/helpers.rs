//! `map_err` adapter that names the operation and path and adds a short hint.
//!
//! The `io::Error` stays the root cause, so callers can still
//! `downcast_ref::<io::Error>()` and match on its kind:
//!
//! ```ignore
//! fs::create_dir_all(dir).map_err(io_error_with_help("create directory", dir))?;
//! ```

use std::io::{self, ErrorKind};
use std::path::Path;

/// Hints for errors std can classify on every platform.
fn hint_for_kind(kind: ErrorKind) -> Option<&'static str> {
    Some(match kind {
        ErrorKind::PermissionDenied => "permission denied; check ownership and write permissions",
        ErrorKind::NotFound => "path not found",
        ErrorKind::AlreadyExists => "already exists",
        ErrorKind::CrossesDevices => "cross-filesystem; atomic rename not possible",
        ErrorKind::DirectoryNotEmpty => "directory not empty",
        ErrorKind::StorageFull => "insufficient space on device",
        ErrorKind::ReadOnlyFilesystem => "read-only filesystem",
        _ => return None,
    })
}

/// Codes whose `ErrorKind` is not stable yet.
#[cfg(unix)]
fn hint_for_code(code: i32) -> Option<&'static str> {
    match code {
        libc::ELOOP => Some("too many symbolic link levels; possible symlink cycle"),
        libc::ENAMETOOLONG => Some("file name or path too long"),
        _ => None,
    }
}

#[cfg(windows)]
fn hint_for_code(code: i32) -> Option<&'static str> {
    match code {
        // ERROR_SHARING_VIOLATION
        32 => Some("file is open in another process"),
        // ERROR_FILENAME_EXCED_RANGE
        206 => Some("file name or path too long"),
        _ => None,
    }
}

fn describe(op: &str, path: &Path, e: &io::Error) -> String {
    let code = e.raw_os_error();
    let hint = hint_for_kind(e.kind()).or_else(|| code.and_then(hint_for_code));
    let mut msg = format!("{op} '{}'", path.display());
    if let Some(hint) = hint {
        msg.push_str(": ");
        msg.push_str(hint);
    }
    if let Some(code) = code {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

/// Returns a closure for `.map_err(...)` converting `io::Error` into an
/// `anyhow::Error` whose context names `op` and `path`.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| {
        let msg = describe(op, path, &e);
        anyhow::Error::new(e).context(msg)
    }
}
