//! Unpacking zip and gzipped tar archives built on the fly.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

use superpath::{ArchiveFormat, SuperPath, SuperPathError, UnpackOptions};

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).expect("create zip");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        zip.start_file(*name, options).expect("start zip entry");
        zip.write_all(data).expect("write zip entry");
    }
    zip.finish().expect("finish zip");
}

/// Gzipped tar of the regular files directly inside `root`.
fn write_tar_gz(path: &Path, root: &Path) {
    let file = File::create(path).expect("create tar.gz");
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    for entry in fs::read_dir(root).expect("read staging dir") {
        let entry = entry.expect("dir entry");
        builder
            .append_path_with_name(entry.path(), entry.file_name())
            .expect("append file");
    }
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip");
}

#[test]
fn zip_extracts_next_to_archive_and_removes_it() {
    let td = tempdir().unwrap();
    let archive = SuperPath::from(td.path().join("bundle.zip"));
    write_zip(&archive, &[("a.txt", b"alpha"), ("dir/b.txt", b"beta")]);
    assert_eq!(archive.archive_format(), Some(ArchiveFormat::Zip));

    let out = archive.unpack(UnpackOptions::default()).expect("unpack");
    assert_eq!(out, SuperPath::from(td.path().join("bundle")));
    assert_eq!(out.join("a.txt").text().unwrap(), "alpha");
    assert_eq!(out.join("dir/b.txt").text().unwrap(), "beta");
    assert!(!archive.exists());
}

#[test]
fn wrapper_folder_and_macosx_are_tidied() {
    let td = tempdir().unwrap();
    let archive = SuperPath::from(td.path().join("pkg.zip"));
    write_zip(
        &archive,
        &[
            ("pkg/readme.txt", b"hi"),
            ("__MACOSX/pkg/._readme.txt", b"junk"),
        ],
    );

    let out = archive.unpack(UnpackOptions::default()).expect("unpack");
    assert_eq!(out.join("readme.txt").text().unwrap(), "hi");
    assert!(!out.join("pkg").exists());
    assert!(!out.join("__MACOSX").exists());
}

#[test]
fn nested_archives_unpack_recursively() {
    let td = tempdir().unwrap();
    let staging = td.path().join("staging");
    fs::create_dir_all(&staging).unwrap();
    write_zip(&staging.join("inner.zip"), &[("deep.txt", b"deep")]);
    fs::write(staging.join("top.txt"), b"top").unwrap();

    let archive = SuperPath::from(td.path().join("outer.tar.gz"));
    write_tar_gz(&archive, &staging);

    let out = archive.unpack(UnpackOptions::default()).expect("unpack");
    assert_eq!(out.join("top.txt").text().unwrap(), "top");
    assert_eq!(out.join("inner/deep.txt").text().unwrap(), "deep");
    assert!(!out.join("inner.zip").exists());
}

#[test]
fn explicit_directory_and_kept_original() {
    let td = tempdir().unwrap();
    let archive = SuperPath::from(td.path().join("data.zip"));
    write_zip(&archive, &[("x.txt", b"x")]);
    let target = SuperPath::from(td.path().join("elsewhere"));
    target.join("old.txt").set_text("old").unwrap();

    let options = UnpackOptions {
        remove_original: false,
        ..UnpackOptions::into_dir(&target)
    };
    let out = archive.unpack(options).expect("unpack");
    assert_eq!(out, target);
    assert!(archive.exists());
    assert!(target.join("x.txt").exists());
    assert!(!target.join("old.txt").exists());
}

#[test]
fn properties_follow_the_archive() {
    let td = tempdir().unwrap();
    let archive = SuperPath::from(td.path().join("p.zip"));
    write_zip(&archive, &[("f.txt", b"f")]);
    archive.set_mtime(1_400_000_000.0).unwrap();

    let out = archive.unpack(UnpackOptions::default()).unwrap();
    assert_eq!(out.join("f.txt").mtime(), 1_400_000_000.0);
}

#[test]
fn non_archive_is_not_unpacked() {
    let td = tempdir().unwrap();
    let p = SuperPath::from(td.path().join("plain.txt"));
    p.set_text("plain").unwrap();

    assert_eq!(p.unpack_if_archive(UnpackOptions::default()).unwrap(), None);
    assert!(p.exists());

    let err = p.unpack(UnpackOptions::default()).expect_err("not an archive");
    assert!(matches!(
        err.downcast_ref::<SuperPathError>(),
        Some(SuperPathError::UnsupportedArchive(_))
    ));
}
