//! Global subscriber installation. Kept in its own test binary because the
//! global subscriber can only be set once per process.

use tempfile::tempdir;

use superpath::{init_tracing, LogLevel, SuperPath};

#[test]
fn init_once_then_refuses_replacement() {
    let td = tempdir().expect("tempdir");
    let log = td.path().join("logs").join("superpath.log");
    if superpath::path_has_symlink_ancestor(&log).unwrap() {
        eprintln!("Skipping: path has symlink ancestor: {}", log.display());
        return;
    }

    let guard = init_tracing(LogLevel::Debug, Some(&log), false).expect("first init");
    let guard = guard.expect("file layer enabled");

    let p = SuperPath::from(td.path().join("t.txt"));
    p.touch(None).unwrap();
    p.unlink(false).unwrap();
    tracing::info!(path = %p.display(), "global-init-test");

    assert!(init_tracing(LogLevel::Normal, None, true).is_err(), "second init must fail");

    drop(guard);
    let contents = std::fs::read_to_string(&log).expect("read log");
    assert!(contents.contains("global-init-test"), "contents={}", contents);
}
