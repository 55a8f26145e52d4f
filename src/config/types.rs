//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - CommonFolders names the well-known base directories ("home", "docs", ...).
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::SUBPROCESS_TIMEOUT_DEFAULT;
use crate::path::SuperPath;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Named base directories.
///
/// Each folder is derived from the one before it (`home` -> `docs` -> `scripts`
/// -> `script_assets` -> `assets`) unless explicitly overridden, so overriding
/// `docs` moves everything below it as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonFolders {
    pub home: PathBuf,
    pub docs: Option<PathBuf>,
    pub scripts: Option<PathBuf>,
    pub script_assets: Option<PathBuf>,
    pub assets: Option<PathBuf>,
    pub draft: Option<PathBuf>,
}

impl Default for CommonFolders {
    fn default() -> Self {
        let home = dirs::home_dir()
            .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_home(home)
    }
}

impl CommonFolders {
    /// Folders rooted at `home` with no overrides.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            docs: None,
            scripts: None,
            script_assets: None,
            assets: None,
            draft: None,
        }
    }

    pub fn home(&self) -> SuperPath {
        SuperPath::from(self.home.clone())
    }

    pub fn docs(&self) -> SuperPath {
        match &self.docs {
            Some(p) => SuperPath::from(p.clone()),
            None => self.home().join("Documents"),
        }
    }

    pub fn scripts(&self) -> SuperPath {
        match &self.scripts {
            Some(p) => SuperPath::from(p.clone()),
            None => self.docs().join("Scripts"),
        }
    }

    pub fn script_assets(&self) -> SuperPath {
        match &self.script_assets {
            Some(p) => SuperPath::from(p.clone()),
            None => self.scripts().join("assets"),
        }
    }

    /// Project-specific asset folder; falls back to `script_assets`.
    pub fn assets(&self) -> SuperPath {
        match &self.assets {
            Some(p) => SuperPath::from(p.clone()),
            None => self.script_assets(),
        }
    }

    pub fn draft(&self) -> SuperPath {
        match &self.draft {
            Some(p) => SuperPath::from(p.clone()),
            None => self.docs().join("draft.txt"),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Well-known base directories
    pub folders: CommonFolders,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// Place temp files in /dev/shm when available
    pub temp_in_memory: bool,
    /// Upper bound for a single external cipher invocation
    pub subprocess_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            folders: CommonFolders::default(),
            log_level: LogLevel::Normal,
            log_file: None,
            temp_in_memory: true,
            subprocess_timeout: SUBPROCESS_TIMEOUT_DEFAULT,
        }
    }
}

impl Config {
    /// Construct a Config rooted at an explicit home directory; other fields use defaults.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            folders: CommonFolders::with_home(home),
            ..Default::default()
        }
    }
}
