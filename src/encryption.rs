//! Transparent symmetric encryption through an external cipher command.
//!
//! The cipher reads plaintext (or ciphertext) on stdin and writes the other on
//! stdout. Each invocation is bounded by a timeout; a hung cipher is killed.
//! The passphrase is looked up at most once per [`EncryptedPath`].

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::config::{Config, SUBPROCESS_TIMEOUT_DEFAULT};
use crate::errors::SuperPathError;
use crate::path::SuperPath;

pub const ENCRYPTED_SUFFIX: &str = ".gpg";
pub const PASSPHRASE_ENV: &str = "SUPERPATH_PASSPHRASE";
const PASSPHRASE_PLACEHOLDER: &str = "{passphrase}";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Where the passphrase comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PassphraseSource {
    Fixed(String),
    /// Environment variable.
    Env(String),
    /// Program plus arguments; the trimmed stdout is the passphrase.
    Command(Vec<String>),
    /// `SUPERPATH_PASSPHRASE` when set, else a `ksshaskpass` prompt.
    #[default]
    EnvOrPrompt,
}

impl PassphraseSource {
    fn prompt() -> Vec<String> {
        vec![
            "ksshaskpass".to_string(),
            "--".to_string(),
            "Enter passphrase for file encryption: ".to_string(),
        ]
    }

    fn resolve(&self) -> Result<String> {
        match self {
            PassphraseSource::Fixed(p) => Ok(p.clone()),
            PassphraseSource::Env(var) => std::env::var(var)
                .with_context(|| format!("passphrase variable {var} is not set")),
            PassphraseSource::Command(argv) => run_prompt(argv),
            PassphraseSource::EnvOrPrompt => match std::env::var(PASSPHRASE_ENV) {
                Ok(p) => Ok(p),
                Err(_) => run_prompt(&Self::prompt()),
            },
        }
    }
}

fn run_prompt(argv: &[String]) -> Result<String> {
    let (program, args) = argv
        .split_first()
        .context("passphrase command is empty")?;
    let out = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .output()
        .with_context(|| format!("run passphrase command '{program}'"))?;
    if !out.status.success() {
        anyhow::bail!("passphrase command '{program}' exited with {}", out.status);
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim_end_matches(['\n', '\r']).to_string())
}

/// External cipher invocation. `{passphrase}` in the argument lists is replaced
/// with the resolved passphrase; when no argument mentions it, no passphrase
/// is ever requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cipher {
    pub program: String,
    pub encrypt_args: Vec<String>,
    pub decrypt_args: Vec<String>,
    pub passphrase: PassphraseSource,
    pub timeout: Duration,
}

impl Default for Cipher {
    fn default() -> Self {
        Self::gpg()
    }
}

impl Cipher {
    /// Symmetric gpg with the passphrase passed in batch mode.
    pub fn gpg() -> Self {
        let decrypt_args: Vec<String> = [
            "--batch",
            "--quiet",
            "--yes",
            "--pinentry-mode",
            "loopback",
            "--passphrase",
            PASSPHRASE_PLACEHOLDER,
        ]
        .map(String::from)
        .to_vec();
        let mut encrypt_args = decrypt_args.clone();
        encrypt_args.push("-c".to_string());
        Self {
            program: "gpg".to_string(),
            encrypt_args,
            decrypt_args,
            passphrase: PassphraseSource::default(),
            timeout: SUBPROCESS_TIMEOUT_DEFAULT,
        }
    }

    /// Default cipher with the configured subprocess timeout.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            timeout: cfg.subprocess_timeout,
            ..Self::gpg()
        }
    }

    fn needs_passphrase(&self) -> bool {
        self.encrypt_args
            .iter()
            .chain(&self.decrypt_args)
            .any(|a| a.contains(PASSPHRASE_PLACEHOLDER))
    }

    fn render(args: &[String], passphrase: Option<&str>) -> Vec<String> {
        args.iter()
            .map(|a| match passphrase {
                Some(p) => a.replace(PASSPHRASE_PLACEHOLDER, p),
                None => a.clone(),
            })
            .collect()
    }

    /// Feed `input` to the cipher and collect its stdout, killing it past the timeout.
    fn run(&self, args: &[String], input: &[u8], path: &SuperPath) -> Result<Vec<u8>> {
        let cipher_error = |message: String| SuperPathError::Cipher {
            program: self.program.clone(),
            path: path.to_path_buf(),
            message,
        };
        let program = which::which(&self.program)
            .map_err(|e| cipher_error(format!("program not found: {e}")))?;

        let mut child = Command::new(&program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| cipher_error(format!("spawn failed: {e}")))?;
        trace!(program = %self.program, path = %path, "cipher started");

        // Pipes are drained on their own threads so a full pipe never blocks the child.
        let stdin = child.stdin.take();
        let input = input.to_vec();
        let writer = thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                let _ = stdin.write_all(&input);
            }
        });
        let stdout = child.stdout.take();
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout {
                let _ = out.read_to_end(&mut buf);
            }
            buf
        });
        let stderr = child.stderr.take();
        let err_reader = thread::spawn(move || {
            let mut buf = String::new();
            if let Some(mut err) = stderr {
                let _ = err.read_to_string(&mut buf);
            }
            buf
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait().context("wait for cipher process")? {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!(program = %self.program, path = %path, timeout = ?self.timeout, "cipher timed out; killed");
                    return Err(SuperPathError::CipherTimeout {
                        program: self.program.clone(),
                        path: path.to_path_buf(),
                        timeout: self.timeout,
                    }
                    .into());
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        let _ = writer.join();
        let output = reader.join().unwrap_or_default();
        let stderr = err_reader.join().unwrap_or_default();
        if !status.success() {
            return Err(cipher_error(format!("exited with {status}: {}", stderr.trim())).into());
        }
        Ok(output)
    }
}

/// The encrypted sibling of a path, read and written through a [`Cipher`].
#[derive(Debug)]
pub struct EncryptedPath {
    path: SuperPath,
    cipher: Cipher,
    passphrase: OnceLock<String>,
}

impl SuperPath {
    /// `<path>.gpg` (unchanged when the suffix is already `.gpg`) with the default cipher.
    pub fn encrypted(&self) -> EncryptedPath {
        self.encrypted_with(Cipher::default())
    }

    pub fn encrypted_with(&self, cipher: Cipher) -> EncryptedPath {
        let path = if self.suffix() == ENCRYPTED_SUFFIX {
            self.clone()
        } else {
            let mut name = self.as_os_str().to_os_string();
            name.push(ENCRYPTED_SUFFIX);
            SuperPath::from(std::path::PathBuf::from(name))
        };
        EncryptedPath {
            path,
            cipher,
            passphrase: OnceLock::new(),
        }
    }
}

impl EncryptedPath {
    pub fn path(&self) -> &SuperPath {
        &self.path
    }

    pub fn cipher(&self) -> &Cipher {
        &self.cipher
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn unlink(&self, missing_ok: bool) -> Result<()> {
        self.path.unlink(missing_ok)
    }

    fn passphrase(&self) -> Result<Option<&str>> {
        if !self.cipher.needs_passphrase() {
            return Ok(None);
        }
        if self.passphrase.get().is_none() {
            let p = self.cipher.passphrase.resolve()?;
            debug!(path = %self.path, "passphrase obtained");
            let _ = self.passphrase.set(p);
        }
        Ok(self.passphrase.get().map(String::as_str))
    }

    /// Decrypted content; a missing or empty file reads as empty.
    pub fn byte_content(&self) -> Result<Vec<u8>> {
        let encrypted = self.path.byte_content()?;
        if encrypted.is_empty() {
            return Ok(encrypted);
        }
        let args = Cipher::render(&self.cipher.decrypt_args, self.passphrase()?);
        self.cipher.run(&args, &encrypted, &self.path)
    }

    pub fn set_byte_content(&self, data: impl AsRef<[u8]>) -> Result<()> {
        let args = Cipher::render(&self.cipher.encrypt_args, self.passphrase()?);
        let encrypted = self.cipher.run(&args, data.as_ref(), &self.path)?;
        self.path.set_byte_content(encrypted)
    }

    pub fn text(&self) -> Result<String> {
        let bytes = self.byte_content()?;
        String::from_utf8(bytes).with_context(|| format!("decrypted '{}' is not UTF-8", self.path))
    }

    pub fn set_text(&self, text: impl AsRef<str>) -> Result<()> {
        self.set_byte_content(text.as_ref().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_is_not_doubled() {
        let p = SuperPath::from("/d/notes.txt");
        assert_eq!(p.encrypted().path(), &SuperPath::from("/d/notes.txt.gpg"));
        let already = SuperPath::from("/d/notes.txt.gpg");
        assert_eq!(already.encrypted().path(), &already);
    }

    #[test]
    fn gpg_args_carry_placeholder() {
        let c = Cipher::gpg();
        assert!(c.needs_passphrase());
        assert_eq!(c.encrypt_args.last().map(String::as_str), Some("-c"));
        let rendered = Cipher::render(&c.decrypt_args, Some("pw"));
        assert!(rendered.contains(&"pw".to_string()));
        assert!(!rendered.iter().any(|a| a.contains(PASSPHRASE_PLACEHOLDER)));
    }

    #[test]
    fn fixed_passphrase_is_cached() {
        let cipher = Cipher {
            passphrase: PassphraseSource::Fixed("secret".into()),
            ..Cipher::gpg()
        };
        let e = SuperPath::from("/tmp/x").encrypted_with(cipher);
        assert_eq!(e.passphrase().unwrap(), Some("secret"));
        assert_eq!(e.passphrase.get().map(String::as_str), Some("secret"));
    }

    #[test]
    fn empty_ciphertext_skips_cipher() {
        let td = tempfile::tempdir().unwrap();
        let cipher = Cipher {
            program: "definitely-not-a-real-cipher".into(),
            ..Cipher::gpg()
        };
        let e = SuperPath::from(td.path().join("f")).encrypted_with(cipher);
        assert!(e.byte_content().unwrap().is_empty());
    }
}
