//! File content cached in memory and reloaded when the file's mtime changes.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use tracing::trace;

use crate::path::SuperPath;

type Load<T> = Box<dyn Fn(&SuperPath) -> Result<T> + Send + Sync>;
type Save<T> = Box<dyn Fn(&SuperPath, &T) -> Result<()> + Send + Sync>;

/// A value backed by a file. [`CachedContent::get`] re-reads the file only
/// when its modification time differs from the last load; a missing file
/// yields the default.
pub struct CachedContent<T> {
    path: SuperPath,
    default: T,
    load: Load<T>,
    save: Save<T>,
    cached: Option<(f64, T)>,
}

impl<T: fmt::Debug> fmt::Debug for CachedContent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedContent")
            .field("path", &self.path)
            .field("cached", &self.cached)
            .finish()
    }
}

impl<T: Clone> CachedContent<T> {
    pub fn new(path: SuperPath, default: T, load: Load<T>, save: Save<T>) -> Self {
        Self {
            path,
            default,
            load,
            save,
            cached: None,
        }
    }

    pub fn path(&self) -> &SuperPath {
        &self.path
    }

    pub fn get(&mut self) -> Result<&T> {
        if !self.path.exists() {
            self.cached = None;
            return Ok(&self.default);
        }
        let mtime = self.path.mtime();
        let stale = !matches!(&self.cached, Some((seen, _)) if *seen == mtime);
        if stale {
            trace!(path = %self.path, "reloading cached content");
            let value = (self.load)(&self.path)?;
            self.cached = Some((mtime, value));
        }
        match &self.cached {
            Some((_, value)) => Ok(value),
            None => Ok(&self.default),
        }
    }

    /// Write through to the file and cache the written value.
    pub fn set(&mut self, value: T) -> Result<()> {
        (self.save)(&self.path, &value)?;
        self.cached = Some((self.path.mtime(), value));
        Ok(())
    }
}

impl CachedContent<String> {
    pub fn text(path: SuperPath) -> Self {
        Self::new(
            path,
            String::new(),
            Box::new(|p: &SuperPath| p.text()),
            Box::new(|p: &SuperPath, v: &String| p.set_text(v)),
        )
    }
}

impl CachedContent<Vec<u8>> {
    pub fn bytes(path: SuperPath) -> Self {
        Self::new(
            path,
            Vec::new(),
            Box::new(|p: &SuperPath| p.byte_content()),
            Box::new(|p: &SuperPath, v: &Vec<u8>| p.set_byte_content(v)),
        )
    }
}

impl<T> CachedContent<T>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
{
    /// YAML-backed value (restricted loading).
    pub fn yaml(path: SuperPath, default: T) -> Self {
        Self::new(
            path,
            default,
            Box::new(|p: &SuperPath| p.yaml()),
            Box::new(|p: &SuperPath, v: &T| p.set_yaml(v)),
        )
    }
}

impl SuperPath {
    pub fn cached_text(&self) -> CachedContent<String> {
        CachedContent::text(self.clone())
    }

    pub fn cached_byte_content(&self) -> CachedContent<Vec<u8>> {
        CachedContent::bytes(self.clone())
    }
}
