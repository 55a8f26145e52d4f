//! Content hashes.
//!
//! Files hash to the SHA-512 of their bytes. Directories hash to an MD5 over
//! the sorted tree: one `"<relative path>\0<md5 of file or 'dir'>\n"` record per
//! entry, so renames and content changes both change the digest.

use anyhow::{Context, Result};
use sha2::{Digest, Sha512};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use walkdir::WalkDir;

use crate::fs_ops::helpers::io_error_with_help;
use crate::path::SuperPath;

const CHUNK: usize = 64 * 1024;

fn sha512_file(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = Sha512::new();
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn md5_file(path: &Path) -> io::Result<md5::Digest> {
    let mut f = File::open(path)?;
    let mut ctx = md5::Context::new();
    let mut buf = vec![0u8; CHUNK];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        ctx.consume(&buf[..n]);
    }
    Ok(ctx.compute())
}

fn md5_tree(root: &Path) -> Result<String> {
    let mut ctx = md5::Context::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk '{}'", root.display()))?;
        let rel = entry.path().strip_prefix(root)?;
        ctx.consume(rel.to_string_lossy().as_bytes());
        ctx.consume(b"\0");
        if entry.file_type().is_file() {
            let digest = md5_file(entry.path()).map_err(io_error_with_help("hash file", entry.path()))?;
            ctx.consume(format!("{digest:x}").as_bytes());
        } else if entry.file_type().is_dir() {
            ctx.consume(b"dir");
        } else {
            ctx.consume(b"link");
        }
        ctx.consume(b"\n");
    }
    Ok(format!("{:x}", ctx.compute()))
}

impl SuperPath {
    /// Files: SHA-512 hex. Directories: tree MD5 hex, `None` without children.
    /// A missing path has no hash.
    pub fn content_hash(&self) -> Result<Option<String>> {
        if self.is_file() {
            let digest = sha512_file(self).map_err(io_error_with_help("hash file", self))?;
            return Ok(Some(digest));
        }
        if !self.has_children() {
            return Ok(None);
        }
        md5_tree(self).map(Some)
    }
}
