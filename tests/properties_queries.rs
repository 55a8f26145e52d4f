use std::fs;
use tempfile::tempdir;

use superpath::SuperPath;

#[test]
fn missing_path_reads_as_empty() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("missing"));
    assert_eq!(p.mtime(), 0.0);
    assert_eq!(p.size(), 0);
    assert!(!p.has_children());
    assert_eq!(p.number_of_children(), 0);
    assert_eq!(p.content_hash().unwrap(), None);
}

#[test]
fn children_and_size() {
    let td = tempdir().unwrap();
    let dir = SuperPath::from(td.path().join("d"));
    fs::create_dir_all(&dir).unwrap();
    assert!(dir.is_empty());

    dir.join("a").set_text("12345").unwrap();
    dir.join("b").set_text("").unwrap();
    assert!(dir.has_children());
    assert_eq!(dir.number_of_children(), 2);
    assert_eq!(dir.join("a").size(), 5);
    assert_eq!(dir.iterdir().unwrap(), vec![dir.join("a"), dir.join("b")]);
}

#[test]
fn touch_sets_requested_mtime() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("new/dir/file"));
    p.touch(Some(1_000_000.25)).unwrap();
    assert!(p.is_file());
    assert_eq!(p.mtime(), 1_000_000.25);
}

#[test]
fn hash_changes_with_content() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("f"));
    p.set_text("one").unwrap();
    let first = p.content_hash().unwrap().expect("file hash");
    p.set_text("two").unwrap();
    assert_ne!(p.content_hash().unwrap().expect("file hash"), first);

    let dir = SuperPath::from(td.path());
    assert!(dir.content_hash().unwrap().is_some());
}

#[test]
fn filetype_from_extension() {
    assert_eq!(SuperPath::from("a/photo.JPG").filetype(), Some("image"));
    assert_eq!(SuperPath::from("movie.mkv").filetype(), Some("video"));
    assert_eq!(SuperPath::from("noext").filetype(), None);
}

#[cfg(unix)]
#[test]
fn root_ownership_of_nearest_ancestor() {
    assert!(SuperPath::from("/").is_root());
    assert!(SuperPath::from("/definitely/missing/below/root").is_root());
}
