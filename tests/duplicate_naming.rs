use std::fs;
use tempfile::tempdir;

use superpath::SuperPath;

#[test]
fn no_collision_returns_requested_name() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("file.txt"));
    assert_eq!(p.with_nonexistent_name(), p);
}

#[test]
fn three_taken_gives_three() {
    let td = tempdir().unwrap();
    for name in ["note.txt", "note (1).txt", "note (2).txt"] {
        fs::write(td.path().join(name), b"x").unwrap();
    }
    let p = SuperPath::from(td.path().join("note.txt"));
    assert_eq!(
        p.with_nonexistent_name(),
        SuperPath::from(td.path().join("note (3).txt"))
    );
}

#[test]
fn successive_names_are_fresh() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("f.log"));
    fs::write(&p, b"").unwrap();

    let mut seen = vec![p.clone()];
    for _ in 0..20 {
        let next = p.with_nonexistent_name();
        assert!(!next.exists());
        assert!(!seen.contains(&next));
        next.touch(None).unwrap();
        seen.push(next);
    }
    assert!(seen.contains(&SuperPath::from(td.path().join("f (20).log"))));
}

#[test]
fn dotfile_and_multi_extension() {
    let td = tempdir().unwrap();
    fs::write(td.path().join(".env"), b"a").unwrap();
    fs::write(td.path().join("archive.tar.gz"), b"a").unwrap();

    let env = SuperPath::from(td.path().join(".env"));
    assert_eq!(env.with_nonexistent_name(), SuperPath::from(td.path().join(".env (1)")));
    let arc = SuperPath::from(td.path().join("archive.tar.gz"));
    assert_eq!(
        arc.with_nonexistent_name(),
        SuperPath::from(td.path().join("archive.tar (1).gz"))
    );
}

/// Numbered siblings are assumed contiguous from 1. With a gap the search
/// still returns a free name, but not necessarily the lowest one.
#[test]
fn gap_in_numbering_still_yields_free_name() {
    let td = tempdir().unwrap();
    for name in ["a.txt", "a (1).txt", "a (2).txt", "a (4).txt", "a (5).txt"] {
        fs::write(td.path().join(name), b"x").unwrap();
    }
    let got = SuperPath::from(td.path().join("a.txt")).with_nonexistent_name();
    assert!(!got.exists());
}

#[test]
fn long_names_stay_within_limit() {
    let td = tempdir().unwrap();
    let stem = "n".repeat(250);
    let p = SuperPath::from(td.path().join(format!("{stem}.txt")));
    fs::write(&p, b"x").unwrap();
    let next = p.with_nonexistent_name();
    let name = next.name().unwrap();
    assert!(name.len() <= 255, "len {}", name.len());
    assert!(name.ends_with(" (1).txt"));
    next.touch(None).expect("name must be creatable");
}
