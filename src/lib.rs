//! Core library for `superpath`.
//!
//! A filesystem path type with the everyday chores built in: content in
//! several formats, metadata and tags, a filtered breadth-first walk,
//! collision-free naming, moves that survive filesystem boundaries, archive
//! unpacking, scope-bound temp entries and pass-through encryption.
//!
//! Everything is synchronous. Errors are `anyhow::Error`s carrying path context;
//! well-known failures downcast to [`SuperPathError`].

pub mod config;
pub mod content;
pub mod encryption;
pub mod errors;
pub mod fs_ops;
pub mod logging;
pub mod path;
pub mod platform;
pub mod properties;
pub mod utils;

pub use config::{
    create_template_config, default_config_path, default_log_path, load_config,
    load_config_from_xml_path, path_has_symlink_ancestor, CommonFolders, Config, LogLevel,
};
pub use content::{CachedContent, YamlTrust};
pub use encryption::{Cipher, EncryptedPath, PassphraseSource};
pub use errors::SuperPathError;
pub use fs_ops::{
    move_across_devices, ArchiveFormat, Find, RmtreeOptions, TempOptions, TempPath,
    UnpackOptions,
};
pub use logging::init_tracing;
pub use path::SuperPath;
pub use properties::{Tag, TAGS_XATTR};
pub use utils::find_first_match;
