//! Content I/O: bytes, text, lines, JSON, YAML and numeric arrays.
//!
//! Reads of a missing file yield empty content. Writes create missing parent
//! directories (create-if-missing, so concurrent writers do not trip over
//! each other).

mod cached;
mod npy;
mod yaml;

pub use cached::CachedContent;
pub use yaml::YamlTrust;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::fs;
use std::io;
use tracing::trace;

use crate::encryption::Cipher;
use crate::fs_ops::helpers::io_error_with_help;
use crate::path::SuperPath;

impl SuperPath {
    pub fn byte_content(&self) -> Result<Vec<u8>> {
        match fs::read(self) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(io_error_with_help("read", self)(e)),
        }
    }

    pub fn set_byte_content(&self, bytes: impl AsRef<[u8]>) -> Result<()> {
        let bytes = bytes.as_ref();
        match fs::write(self, bytes) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!(path = %self, "parent missing; creating before write");
                self.create_parent()?;
                fs::write(self, bytes).map_err(io_error_with_help("write", self))
            }
            Err(e) => Err(io_error_with_help("write", self)(e)),
        }
    }

    pub fn text(&self) -> Result<String> {
        let bytes = self.byte_content()?;
        String::from_utf8(bytes).with_context(|| format!("'{}' is not valid UTF-8", self))
    }

    pub fn set_text(&self, text: impl AsRef<str>) -> Result<()> {
        self.set_byte_content(text.as_ref().as_bytes())
    }

    pub fn lines(&self) -> Result<Vec<String>> {
        Ok(self.text()?.lines().map(str::to_string).collect())
    }

    /// Write each item on its own line (no trailing newline).
    pub fn set_lines<I, T>(&self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let joined = lines
            .into_iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        self.set_text(joined)
    }

    /// Lines with empty ones dropped.
    pub fn content_lines(&self) -> Result<Vec<String>> {
        Ok(self.lines()?.into_iter().filter(|l| !l.is_empty()).collect())
    }

    /// Like [`SuperPath::set_lines`], but items whose rendering is empty are
    /// dropped. Only the rendered text is checked, so `0` or `false` is
    /// still written.
    pub fn set_content_lines<I, T>(&self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        self.set_lines(lines.into_iter().map(|l| l.to_string()).filter(|l| !l.is_empty()))
    }

    /// Parse as JSON; an empty or missing file reads as `{}`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let text = self.text()?;
        let text = if text.is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(text).with_context(|| format!("parse JSON in '{}'", self))
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let text = serde_json::to_string(value).with_context(|| format!("serialize JSON for '{}'", self))?;
        self.set_text(text)
    }

    /// Raw bytes, falling back to the decrypted `.gpg` sibling when this file is
    /// missing. Empty when neither exists.
    pub fn content_or_encrypted(&self, cipher: &Cipher) -> Result<Vec<u8>> {
        if self.exists() {
            return self.byte_content();
        }
        let encrypted = self.encrypted_with(cipher.clone());
        if encrypted.exists() {
            trace!(path = %self, "reading encrypted sibling");
            return encrypted.byte_content();
        }
        Ok(Vec::new())
    }
}
