//! Typed error definitions for superpath.
//! Provides a small set of well-known failure modes for better logs and tests.
//!
//! Everything else is an `anyhow::Error` wrapping the original `std::io::Error`,
//! so callers can still `downcast_ref::<io::Error>()` on propagated OS failures.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SuperPathError {
    #[error("Target already exists: {path}")]
    TargetExists {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(PathBuf),

    #[error("Refusing to load tag '{tag}' from {path}: YAML tags require a trusted loader")]
    UntrustedYaml { path: PathBuf, tag: String },

    #[error("Malformed array file {path}: {reason}")]
    MalformedArray { path: PathBuf, reason: String },

    #[error("Cipher command '{program}' failed for {path}: {message}")]
    Cipher {
        program: String,
        path: PathBuf,
        message: String,
    },

    #[error("Cipher command '{program}' did not finish within {timeout:?} for {path}")]
    CipherTimeout {
        program: String,
        path: PathBuf,
        timeout: Duration,
    },

    #[error("Insufficient disk space for destination {dest}: need {required} bytes, have {available} bytes")]
    InsufficientSpace {
        required: u64,
        available: u64,
        dest: PathBuf,
    },
}

impl SuperPathError {
    /// Stable numeric code, usable as a structured log field.
    pub fn code(&self) -> u16 {
        match self {
            SuperPathError::TargetExists { .. } => 10,
            SuperPathError::UnsupportedArchive(_) => 20,
            SuperPathError::UntrustedYaml { .. } => 30,
            SuperPathError::MalformedArray { .. } => 31,
            SuperPathError::Cipher { .. } => 40,
            SuperPathError::CipherTimeout { .. } => 41,
            SuperPathError::InsufficientSpace { .. } => 50,
        }
    }
}
