//! XDG tags stored in an extended attribute.
//!
//! Values are comma-delimited in `user.xdg.tags`. Numbers are zero-filled to
//! width 4 so file managers sort them naturally. Without extended-attribute
//! support every read is empty and every write is a no-op.

use anyhow::Result;
use std::fmt;

use crate::path::SuperPath;

pub const TAGS_XATTR: &str = "user.xdg.tags";
const DELIM: char = ',';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Text(String),
    Number(i64),
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Text(s) => f.write_str(s),
            Tag::Number(n) => write!(f, "{n:04}"),
        }
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Tag::Text(s.to_string())
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Tag::Text(s)
    }
}

impl From<&String> for Tag {
    fn from(s: &String) -> Self {
        Tag::Text(s.clone())
    }
}

impl From<i64> for Tag {
    fn from(n: i64) -> Self {
        Tag::Number(n)
    }
}

impl From<i32> for Tag {
    fn from(n: i32) -> Self {
        Tag::Number(n.into())
    }
}

impl From<u32> for Tag {
    fn from(n: u32) -> Self {
        Tag::Number(n.into())
    }
}

/// Render tags, dropping later duplicates.
fn encode<I, T>(values: I) -> String
where
    I: IntoIterator<Item = T>,
    T: Into<Tag>,
{
    let mut seen: Vec<String> = Vec::new();
    for v in values {
        let s = v.into().to_string();
        if !seen.contains(&s) {
            seen.push(s);
        }
    }
    seen.join(&DELIM.to_string())
}

fn decode(raw: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    text.split(DELIM).map(str::to_string).collect()
}

impl SuperPath {
    /// Stored tags in order; empty when missing or unsupported.
    pub fn tags(&self) -> Vec<String> {
        backend::get(self).map(|raw| decode(&raw)).unwrap_or_default()
    }

    /// Replace all tags. An empty list clears the attribute.
    pub fn set_tags<I, T>(&self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        let encoded = encode(values);
        if encoded.is_empty() {
            return self.clear_tags();
        }
        backend::set(self, encoded.as_bytes())
    }

    /// First tag, if any.
    pub fn tag(&self) -> Option<String> {
        self.tags().into_iter().next()
    }

    /// Replace all tags with a single one.
    pub fn set_tag(&self, value: impl Into<Tag>) -> Result<()> {
        self.set_tags([value.into()])
    }

    pub fn clear_tags(&self) -> Result<()> {
        backend::remove(self)
    }
}

#[cfg(all(unix, feature = "xattrs"))]
mod backend {
    use anyhow::Result;
    use std::io;

    use super::TAGS_XATTR;
    use crate::fs_ops::helpers::io_error_with_help;
    use crate::path::SuperPath;

    pub(super) fn get(path: &SuperPath) -> Option<Vec<u8>> {
        xattr::get(path, TAGS_XATTR).ok().flatten()
    }

    pub(super) fn set(path: &SuperPath, value: &[u8]) -> Result<()> {
        xattr::set(path, TAGS_XATTR, value).map_err(io_error_with_help("set tags", path))?;
        Ok(())
    }

    pub(super) fn remove(path: &SuperPath) -> Result<()> {
        match xattr::remove(path, TAGS_XATTR) {
            Ok(()) => Ok(()),
            Err(e) if is_absent(&e) => Ok(()),
            Err(e) => Err(io_error_with_help("clear tags", path)(e)),
        }
    }

    /// The attribute is not there, or cannot be there (filesystem without
    /// user xattrs, dangling link): clearing is a no-op in both cases.
    fn is_absent(e: &io::Error) -> bool {
        // ENODATA on Linux, ENOATTR elsewhere.
        #[cfg(target_os = "linux")]
        let missing_attr = libc::ENODATA;
        #[cfg(not(target_os = "linux"))]
        let missing_attr = libc::ENOATTR;
        matches!(e.raw_os_error(), Some(code) if code == missing_attr || code == libc::ENOTSUP || code == libc::ENOENT)
    }
}

#[cfg(not(all(unix, feature = "xattrs")))]
mod backend {
    use anyhow::Result;

    use crate::path::SuperPath;

    pub(super) fn get(_path: &SuperPath) -> Option<Vec<u8>> {
        None
    }

    pub(super) fn set(_path: &SuperPath, _value: &[u8]) -> Result<()> {
        Ok(())
    }

    pub(super) fn remove(_path: &SuperPath) -> Result<()> {
        Ok(())
    }
}
