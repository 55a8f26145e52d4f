//! XML configuration support.
//! - Loads settings from config.xml (quick_xml).
//! - Writes a secure template on request.
//!
//! Notes:
//! - Unknown XML fields are rejected (serde deny_unknown_fields) to surface typos early.
//! - Empty elements are treated as "not set".

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use super::SUBPROCESS_TIMEOUT_DEFAULT;
use crate::platform::{set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    home: Option<String>,
    docs: Option<String>,
    scripts: Option<String>,
    script_assets: Option<String>,
    assets: Option<String>,
    draft: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    temp_in_memory: Option<bool>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    subprocess_timeout_seconds: Option<u64>,
}

// Custom deserializer that trims surrounding whitespace for optional u64
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| s.trim().parse::<u64>().ok()))
}

fn non_empty_path(s: Option<&str>) -> Option<PathBuf> {
    s.map(str::trim).filter(|t| !t.is_empty()).map(PathBuf::from)
}

// Map XmlConfig -> Config
fn xml_to_config(parsed: XmlConfig) -> Config {
    let mut cfg = Config::default();

    if let Some(home) = non_empty_path(parsed.home.as_deref()) {
        cfg.folders.home = home;
    }
    cfg.folders.docs = non_empty_path(parsed.docs.as_deref());
    cfg.folders.scripts = non_empty_path(parsed.scripts.as_deref());
    cfg.folders.script_assets = non_empty_path(parsed.script_assets.as_deref());
    cfg.folders.assets = non_empty_path(parsed.assets.as_deref());
    cfg.folders.draft = non_empty_path(parsed.draft.as_deref());
    cfg.log_file = non_empty_path(parsed.log_file.as_deref());

    if let Some(level) = parsed
        .log_level
        .as_deref()
        .and_then(|s| s.trim().parse::<LogLevel>().ok())
    {
        cfg.log_level = level;
    }
    if let Some(in_memory) = parsed.temp_in_memory {
        cfg.temp_in_memory = in_memory;
    }
    cfg.subprocess_timeout = parsed
        .subprocess_timeout_seconds
        .map(Duration::from_secs)
        .unwrap_or(SUBPROCESS_TIMEOUT_DEFAULT);

    cfg
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    Ok(xml_to_config(parsed))
}

/// Load the effective Config.
///
/// - `SUPERPATH_CONFIG` set: that file must exist and parse.
/// - Otherwise the platform default config.xml is used when present.
/// - No file: defaults.
pub fn load_config() -> Result<Config> {
    let explicit = std::env::var_os(super::CONFIG_ENV).is_some();
    let path = default_config_path()?;
    if !path.exists() && !explicit {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }
    let cfg = load_config_from_xml_path(&path)?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

/// Create a template config file and parent directory (best-effort permissions).
/// Uses secure creation to avoid following attacker-controlled symlinks on Unix.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        return Err(anyhow::anyhow!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        let _ = set_dir_mode_0700(parent);
    }

    let defaults = Config::default();
    let content = format!(
        "<!--\n  superpath configuration (XML)\n\n  Folders (each defaults to a child of the previous one):\n    home           -> base of every other folder\n    docs           -> <home>/Documents\n    scripts        -> <docs>/Scripts\n    script_assets  -> <scripts>/assets\n    assets         -> <script_assets>\n    draft          -> <docs>/draft.txt\n\n  Other fields:\n    log_level                  -> quiet | normal | info | debug\n    log_file                   -> path to log file (optional)\n    temp_in_memory             -> place temp files in /dev/shm when available\n    subprocess_timeout_seconds -> upper bound for one cipher invocation\n-->\n<config>\n  <home>{}</home>\n  <log_level>normal</log_level>\n  <temp_in_memory>true</temp_in_memory>\n  <subprocess_timeout_seconds>{}</subprocess_timeout_seconds>\n</config>\n",
        defaults.folders.home.display(),
        SUBPROCESS_TIMEOUT_DEFAULT.as_secs()
    );

    write_config_secure_new_0600(path, content.as_bytes())?;
    let _ = set_file_mode_0600(path);

    info!("Created template config at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn template_round_trips_through_loader() {
        let td = tempdir().unwrap();
        let path = td.path().join("sub").join("config.xml");
        create_template_config(&path).unwrap();
        let cfg = load_config_from_xml_path(&path).unwrap();
        assert_eq!(cfg.log_level, LogLevel::Normal);
        assert!(cfg.temp_in_memory);
        assert_eq!(cfg.subprocess_timeout, SUBPROCESS_TIMEOUT_DEFAULT);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let td = tempdir().unwrap();
        let path = td.path().join("config.xml");
        fs::write(&path, "<config><colour>blue</colour></config>").unwrap();
        assert!(load_config_from_xml_path(&path).is_err());
    }

    #[test]
    fn empty_elements_mean_unset() {
        let td = tempdir().unwrap();
        let path = td.path().join("config.xml");
        fs::write(
            &path,
            "<config><home>/h</home><docs>  </docs><log_file></log_file><subprocess_timeout_seconds> 5 </subprocess_timeout_seconds></config>",
        )
        .unwrap();
        let cfg = load_config_from_xml_path(&path).unwrap();
        assert_eq!(cfg.folders.home, PathBuf::from("/h"));
        assert_eq!(cfg.folders.docs, None);
        assert_eq!(cfg.log_file, None);
        assert_eq!(cfg.subprocess_timeout, Duration::from_secs(5));
    }
}
