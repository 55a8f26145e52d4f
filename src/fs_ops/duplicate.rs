//! Collision-free naming.
//!
//! `with_nonexistent_name` picks the first free `"{stem} ({i}){suffix}"` sibling.
//! The search assumes numbered siblings are contiguous from 1: once a number is
//! free, every higher number is taken to be free too. Nothing enforces this, so
//! a gap (e.g. `(1)` and `(3)` exist, `(2)` does not) can hand back `(2)` or a
//! number past the gap depending on where the bisection lands. Both are free.
//!
//! Like any check-then-use naming, the result can race with another process
//! creating the same name before the caller uses it.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use tracing::trace;

use crate::path::SuperPath;
use crate::utils::find_first_match;

impl SuperPath {
    /// The path itself when free, else the sibling `"{stem} ({i}){suffix}"` with
    /// the smallest free `i` (under the contiguity assumption above).
    pub fn with_nonexistent_name(&self) -> SuperPath {
        if !self.exists() {
            return self.clone();
        }
        let i = find_first_match(|i| !self.with_number(i).exists());
        let found = self.with_number(i);
        trace!(path = %self, candidate = %found, "picked free sibling name");
        found
    }

    /// Sibling named `"{stem} ({i}){suffix}"`, with the stem shortened if the
    /// name would exceed the platform file-name limit.
    pub fn with_number(&self, i: u64) -> SuperPath {
        let Some(name) = self.file_name() else {
            return self.clone();
        };
        let base = Path::new(name);
        let stem: OsString = base
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| name.to_os_string());
        let ext = base.extension();
        self.with_name(build_name_with_suffix(&stem, ext, &format!(" ({i})")))
    }
}

// Conservative filename limits (bytes/characters, platform-specific and approximate).
#[cfg(windows)]
const MAX_FILENAME_LEN: usize = 240; // leave headroom for legacy MAX_PATH
#[cfg(not(windows))]
const MAX_FILENAME_LEN: usize = 255; // typical POSIX/EXT limits

#[cfg(unix)]
fn name_len_units(s: &OsStr) -> usize {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().len()
}

#[cfg(windows)]
fn name_len_units(s: &OsStr) -> usize {
    s.to_string_lossy().len()
}

/// Keep whole characters of `stem` while they fit in `budget` units.
fn truncate_stem(stem: &str, budget: usize) -> String {
    let mut acc = String::new();
    for ch in stem.chars() {
        if acc.len() + ch.len_utf8() > budget {
            break;
        }
        acc.push(ch);
    }
    if acc.is_empty() {
        acc.push('f');
    }
    acc
}

#[cfg(unix)]
fn truncate_raw(stem: &OsStr, budget: usize) -> OsString {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};
    let bytes = stem.as_bytes();
    OsString::from_vec(bytes[..bytes.len().min(budget)].to_vec())
}

#[cfg(windows)]
fn truncate_raw(stem: &OsStr, budget: usize) -> OsString {
    OsString::from(truncate_stem(&stem.to_string_lossy(), budget))
}

/// `stem + suffix + ["." + ext]`, truncating the stem so the whole name fits
/// within MAX_FILENAME_LEN.
pub(super) fn build_name_with_suffix(stem: &OsStr, ext: Option<&OsStr>, suffix: &str) -> OsString {
    let mut overhead = name_len_units(OsStr::new(suffix));
    let mut ext_part = OsString::new();
    if let Some(e) = ext {
        overhead = overhead.saturating_add(1 + name_len_units(e));
        ext_part.push(".");
        ext_part.push(e);
    }

    let mut stem_os = stem.to_os_string();
    if name_len_units(&stem_os) + overhead > MAX_FILENAME_LEN {
        let budget = MAX_FILENAME_LEN.saturating_sub(overhead);
        stem_os = match stem.to_str() {
            _ if budget == 0 => OsString::from("f"),
            Some(s) => OsString::from(truncate_stem(s, budget)),
            None => truncate_raw(stem, budget),
        };
    }

    let mut new_name = stem_os;
    new_name.push(suffix);
    new_name.push(&ext_part);
    new_name
}
