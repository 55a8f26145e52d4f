use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::tempdir;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt as tsfmt, registry};

use superpath::platform::open_log_file_secure_append;
use superpath::{RmtreeOptions, SuperPath};

/// Appends written bytes into a shared in-memory buffer.
#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn library_events_carry_path_fields() {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let layer = tsfmt::layer()
        .with_writer(make_writer)
        .with_ansi(false)
        .with_target(false)
        .compact();
    // Scoped dispatcher: the global subscriber stays untouched.
    let dispatch = tracing::Dispatch::new(registry().with(EnvFilter::new("debug")).with(layer));

    let td = tempdir().expect("tempdir");
    let src = SuperPath::from(td.path().join("a.txt"));
    let dest = SuperPath::from(td.path().join("b.txt"));
    let tree = SuperPath::from(td.path().join("tree"));
    tracing::dispatcher::with_default(&dispatch, || {
        src.set_text("x").unwrap();
        src.rename(&dest, false).unwrap();
        tree.join("f").set_text("f").unwrap();
        tree.rmtree(RmtreeOptions::default()).unwrap();
    });

    let contents = String::from_utf8_lossy(&buf.lock().unwrap()).to_string();
    assert!(contents.contains("renamed"), "contents={}", contents);
    assert!(contents.contains(&dest.to_string()), "contents={}", contents);
    assert!(contents.contains("removed tree"), "contents={}", contents);
}

#[test]
fn json_file_log_records_removed_tree() {
    let td = tempdir().expect("tempdir");
    let log_path: PathBuf = td.path().join("logs").join("superpath.jsonl");

    // macOS temp dirs live under a symlink; file logging refuses those.
    if superpath::path_has_symlink_ancestor(&log_path).unwrap() {
        eprintln!("skipping: symlink ancestor above {}", log_path.display());
        return;
    }

    let file = open_log_file_secure_append(&log_path).expect("open log file");
    let (writer, guard): (tracing_appender::non_blocking::NonBlocking, WorkerGuard) =
        tracing_appender::non_blocking(file);
    let json_layer = tsfmt::layer().json().with_writer(writer).with_ansi(false);
    let dispatch = tracing::Dispatch::new(registry().with(EnvFilter::new("debug")).with(json_layer));

    let tree = SuperPath::from(td.path().join("scratch"));
    tracing::dispatcher::with_default(&dispatch, || {
        tree.join("nested/leaf.txt").set_text("leaf").unwrap();
        tree.rmtree(RmtreeOptions::default()).unwrap();
    });
    drop(guard);

    let contents = std::fs::read_to_string(&log_path).expect("read log file");
    let removal = contents
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).expect("one JSON object per line"))
        .find(|v| v["fields"]["message"] == "removed tree")
        .unwrap_or_else(|| panic!("no removal event in {contents}"));
    assert_eq!(removal["level"], "DEBUG");
    assert_eq!(removal["fields"]["path"], tree.to_string());
}
