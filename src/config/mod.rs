//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{CommonFolders, Config, LogLevel};
pub use xml::{create_template_config, load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file (or a directory holding `config.xml`).
pub const CONFIG_ENV: &str = "SUPERPATH_CONFIG";
/// Default timeout for external cipher invocations.
pub const SUBPROCESS_TIMEOUT_DEFAULT: std::time::Duration = std::time::Duration::from_secs(60);
