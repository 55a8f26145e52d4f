//! The path entity.
//!
//! `SuperPath` is a name, not a snapshot: it owns a `PathBuf` and every kind
//! query (`exists`, `is_dir`, ...) re-reads the filesystem. Capability groups
//! (content, properties, traversal, moves, archives, temp lifecycle) are
//! inherent methods spread over the modules that implement them.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SuperPath(PathBuf);

impl SuperPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Append one or more segments.
    pub fn join(&self, segment: impl AsRef<Path>) -> SuperPath {
        SuperPath(self.0.join(segment))
    }

    /// Drop the last segment. The root is its own parent; a bare relative
    /// name has `.` as parent.
    pub fn parent(&self) -> SuperPath {
        match self.0.parent() {
            Some(p) if p.as_os_str().is_empty() => SuperPath::from("."),
            Some(p) => SuperPath::from(p),
            None => self.clone(),
        }
    }

    /// Final segment as UTF-8, if any.
    pub fn name(&self) -> Option<&str> {
        self.0.file_name().and_then(OsStr::to_str)
    }

    /// Final segment without its last extension (`archive.tar.gz` -> `archive.tar`).
    pub fn stem(&self) -> String {
        self.0
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Last extension including the dot, or an empty string.
    pub fn suffix(&self) -> String {
        self.0
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default()
    }

    pub fn with_name(&self, name: impl AsRef<OsStr>) -> SuperPath {
        SuperPath(self.0.with_file_name(name))
    }

    /// Replace the stem, keeping the suffix.
    pub fn with_stem(&self, stem: impl AsRef<OsStr>) -> SuperPath {
        let mut name = OsString::from(stem.as_ref());
        if let Some(ext) = self.0.extension() {
            name.push(".");
            name.push(ext);
        }
        self.with_name(name)
    }

    /// Replace the suffix; `suffix` includes the dot, empty removes it.
    pub fn with_suffix(&self, suffix: &str) -> SuperPath {
        SuperPath(self.0.with_extension(suffix.trim_start_matches('.')))
    }

    pub fn exists(&self) -> bool {
        self.0.exists()
    }

    pub fn is_file(&self) -> bool {
        self.0.is_file()
    }

    pub fn is_dir(&self) -> bool {
        self.0.is_dir()
    }

    /// True for a symlink, dangling or not.
    pub fn is_symlink(&self) -> bool {
        fs::symlink_metadata(&self.0)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    /// `mkdir -p` of the parent. Idempotent so concurrent callers do not race.
    pub fn create_parent(&self) -> Result<SuperPath> {
        let parent = self.parent();
        fs::create_dir_all(&parent)
            .with_context(|| format!("create parent directory '{}'", parent))?;
        Ok(parent)
    }

    /// Join `parts`, replacing separators and dots inside each part with `_`
    /// so every part stays a single plain segment.
    pub fn subpath<I, S>(&self, parts: I) -> SuperPath
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = self.clone();
        for part in parts {
            let cleaned: String = part
                .as_ref()
                .chars()
                .map(|c| if c == MAIN_SEPARATOR || c == '/' || c == '.' { '_' } else { c })
                .collect();
            path = path.join(cleaned);
        }
        path
    }

    /// Parse a `file://` URI.
    pub fn from_uri(uri: &str) -> Result<SuperPath> {
        let url = Url::parse(uri).with_context(|| format!("parse uri '{uri}'"))?;
        let path = url
            .to_file_path()
            .map_err(|_| anyhow!("uri does not name a local file: {uri}"))?;
        Ok(SuperPath(path))
    }

    /// Render as a `file://` URI. The path must be absolute.
    pub fn as_uri(&self) -> Result<String> {
        Url::from_file_path(&self.0)
            .map(String::from)
            .map_err(|_| anyhow!("cannot express a relative path as a URI: {}", self))
    }

    /// Sibling with the current UTC time (second precision) appended to the stem.
    pub fn with_timestamp(&self) -> SuperPath {
        self.with_timestamp_at(Utc::now())
    }

    pub(crate) fn with_timestamp_at(&self, at: DateTime<Utc>) -> SuperPath {
        let stamp = at.format("%Y-%m-%d %H:%M:%S%:z");
        self.with_stem(format!("{} {}", self.stem(), stamp))
    }

    /// Canonical absolute path (symlinks resolved; no `\\?\` prefix on Windows).
    pub fn resolve(&self) -> Result<SuperPath> {
        dunce::canonicalize(&self.0)
            .map(SuperPath)
            .with_context(|| format!("resolve '{}'", self))
    }
}

impl Deref for SuperPath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for SuperPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for SuperPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for SuperPath {
    fn from(p: PathBuf) -> Self {
        SuperPath(p)
    }
}

impl From<&Path> for SuperPath {
    fn from(p: &Path) -> Self {
        SuperPath(p.to_path_buf())
    }
}

impl From<&str> for SuperPath {
    fn from(s: &str) -> Self {
        SuperPath(PathBuf::from(s))
    }
}

impl From<String> for SuperPath {
    fn from(s: String) -> Self {
        SuperPath(PathBuf::from(s))
    }
}

impl From<&SuperPath> for SuperPath {
    fn from(p: &SuperPath) -> Self {
        p.clone()
    }
}

impl From<SuperPath> for PathBuf {
    fn from(p: SuperPath) -> Self {
        p.0
    }
}
