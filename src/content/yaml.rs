//! YAML content with an explicit trust level.
//!
//! Tagged values (`!!python/object`, `!Custom`, ...) only load through
//! [`YamlTrust::Trusted`]; every default accessor uses the restricted level.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::errors::SuperPathError;
use crate::path::SuperPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YamlTrust {
    /// Reject tagged values.
    #[default]
    Restricted,
    /// Keep tagged values as they are. Only for files you control.
    Trusted,
}

fn find_tag(value: &Value) -> Option<String> {
    match value {
        Value::Tagged(t) => Some(t.tag.to_string()),
        Value::Sequence(seq) => seq.iter().find_map(find_tag),
        Value::Mapping(map) => map
            .iter()
            .find_map(|(k, v)| find_tag(k).or_else(|| find_tag(v))),
        _ => None,
    }
}

impl SuperPath {
    /// Parse the file as YAML. An empty file or a null document is an empty mapping.
    pub fn load_yaml(&self, trust: YamlTrust) -> Result<Value> {
        let text = self.text()?;
        let value: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml::from_str(&text).with_context(|| format!("parse YAML in '{}'", self))?
        };
        if trust == YamlTrust::Restricted {
            if let Some(tag) = find_tag(&value) {
                return Err(SuperPathError::UntrustedYaml {
                    path: self.to_path_buf(),
                    tag,
                }
                .into());
            }
        }
        Ok(match value {
            Value::Null => Value::Mapping(Mapping::new()),
            other => other,
        })
    }

    /// Restricted YAML load into `T`.
    pub fn yaml<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.load_yaml(YamlTrust::Restricted)?;
        serde_yaml::from_value(value).with_context(|| format!("decode YAML in '{}'", self))
    }

    pub fn set_yaml<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let text = serde_yaml::to_string(value).with_context(|| format!("serialize YAML for '{}'", self))?;
        self.set_text(text)
    }

    /// Merge `values` into the top-level mapping stored in the file (new values
    /// win) and return the merged mapping. An empty update touches nothing.
    pub fn update(&self, values: Mapping) -> Result<Mapping> {
        if values.is_empty() {
            return Ok(values);
        }
        let mut current = match self.load_yaml(YamlTrust::Restricted)? {
            Value::Mapping(m) => m,
            _ => anyhow::bail!("'{}' does not hold a YAML mapping", self),
        };
        for (k, v) in values {
            current.insert(k, v);
        }
        self.set_yaml(&current)?;
        Ok(current)
    }
}
