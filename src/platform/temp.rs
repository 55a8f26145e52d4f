//! Staging names for write-then-rename.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static NEXT: AtomicU64 = AtomicU64::new(0);

/// Hidden name next to `target`, unique per process, clock tick and call:
/// `.superpath.tmp.<pid>.<nanos>.<seq>`.
pub fn tmp_sibling_name(target: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let seq = NEXT.fetch_add(1, Ordering::Relaxed);
    let dir = target.parent().unwrap_or(Path::new("."));
    dir.join(format!(".superpath.tmp.{}.{nanos}.{seq}", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn names_from_many_threads_never_collide() {
        let handles: Vec<_> = (0..32)
            .map(|_| thread::spawn(|| tmp_sibling_name(Path::new("store/item.bin"))))
            .collect();
        let names: HashSet<PathBuf> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(names.len(), 32);
        assert!(names.iter().all(|p| p.parent() == Some(Path::new("store"))));
    }

    #[test]
    fn bare_name_stages_in_current_dir() {
        let p = tmp_sibling_name(Path::new("item.bin"));
        // `Path::parent` of a bare name is the empty path.
        assert_eq!(p.parent(), Some(Path::new("")));
    }
}
