//! Access key resolution and storage
//!
//! The key is resolved once per run from a chain of providers, in order:
//!
//! | Provider | Source |
//! |----------|--------|
//! | [`KeyFile`] | `openblu.key` in the working directory (configurable) |
//! | [`StaticKey`] | `--key` on the command line |
//! | [`EnvKey`] | `OPENBLU_ACCESS_KEY` |

use crate::error::ValidationError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{debug, info};

pub const ACCESS_KEY_ENV: &str = "OPENBLU_ACCESS_KEY";

static PROMPT_ACTIVE: AtomicBool = AtomicBool::new(false);

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("No access key available")]
    Missing,
    #[error("Failed to read access key from {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("Cannot save access key to {path}: {source}")]
    Persistence { path: PathBuf, source: io::Error },
    #[error("Failed to read access key from terminal: {0}")]
    PromptError(io::Error),
    #[error("Aborted")]
    Interrupted,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A source of the API access key
pub trait CredentialProvider {
    fn name(&self) -> &'static str;
    /// `Ok(None)` when this source has no key
    fn access_key(&self) -> Result<Option<String>, CredentialError>;
}

/// Single-line key file
pub struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, key: &str) -> Result<(), CredentialError> {
        fs::write(&self.path, format!("{key}\n")).map_err(|source| {
            CredentialError::Persistence {
                path: self.path.clone(),
                source,
            }
        })
    }
}

impl CredentialProvider for KeyFile {
    fn name(&self) -> &'static str {
        "key file"
    }

    fn access_key(&self) -> Result<Option<String>, CredentialError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(non_empty(content.lines().next().unwrap_or_default())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CredentialError::ReadError {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Key given on the command line
pub struct StaticKey(Option<String>);

impl StaticKey {
    pub fn new(key: Option<String>) -> Self {
        Self(key)
    }
}

impl CredentialProvider for StaticKey {
    fn name(&self) -> &'static str {
        "--key"
    }

    fn access_key(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.0.as_deref().and_then(non_empty))
    }
}

/// Key taken from the environment
pub struct EnvKey<F> {
    get_var: F,
}

impl EnvKey<fn(&str) -> Result<String, std::env::VarError>> {
    pub fn from_env() -> Self {
        Self {
            get_var: |key| std::env::var(key),
        }
    }
}

impl<F> EnvKey<F>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    /// Use a custom getter (for testing)
    pub fn with_getter(get_var: F) -> Self {
        Self { get_var }
    }
}

impl<F> CredentialProvider for EnvKey<F>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    fn name(&self) -> &'static str {
        ACCESS_KEY_ENV
    }

    fn access_key(&self) -> Result<Option<String>, CredentialError> {
        Ok((self.get_var)(ACCESS_KEY_ENV).ok().as_deref().and_then(non_empty))
    }
}

/// Ordered list of providers, first hit wins
pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Key file, then `--key`, then environment
    pub fn standard(key_file: &Path, flag: Option<String>) -> Self {
        Self::new(vec![
            Box::new(KeyFile::new(key_file)),
            Box::new(StaticKey::new(flag)),
            Box::new(EnvKey::from_env()),
        ])
    }

    pub fn resolve(&self) -> Result<String, CredentialError> {
        for provider in &self.providers {
            if let Some(key) = provider.access_key()? {
                debug!("Using access key from {}", provider.name());
                return Ok(key);
            }
        }
        Err(CredentialError::Missing)
    }
}

/// Interactive input of a new access key
pub trait KeyPrompt {
    fn prompt(&self, message: &str) -> Result<String, CredentialError>;
}

/// Reads from the terminal without echo
pub struct TerminalPrompt;

impl KeyPrompt for TerminalPrompt {
    fn prompt(&self, message: &str) -> Result<String, CredentialError> {
        PROMPT_ACTIVE.store(true, Ordering::SeqCst);
        let answer = rpassword::prompt_password(message);
        PROMPT_ACTIVE.store(false, Ordering::SeqCst);

        answer.map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof | io::ErrorKind::Interrupted => {
                CredentialError::Interrupted
            }
            _ => CredentialError::PromptError(e),
        })
    }
}

/// Whether a no-echo prompt currently owns the terminal
pub fn prompt_active() -> bool {
    PROMPT_ACTIVE.load(Ordering::SeqCst)
}

/// Turn echo back on for `tty`, e.g. after Ctrl+C cut a prompt short
#[cfg(unix)]
pub fn restore_echo<Fd: std::os::fd::AsFd>(tty: Fd) -> nix::Result<()> {
    use nix::sys::termios::{tcgetattr, tcsetattr, LocalFlags, SetArg};

    let mut attrs = tcgetattr(&tty)?;
    attrs.local_flags.insert(LocalFlags::ECHO);
    tcsetattr(&tty, SetArg::TCSANOW, &attrs)
}

/// Prompt for a key and store it in `file`. Empty input stores nothing.
pub fn set_access_key(prompt: &dyn KeyPrompt, file: &KeyFile) -> Result<(), CredentialError> {
    let answer = prompt.prompt("Enter your OpenBlu access key: ")?;
    let key = non_empty(&answer).ok_or(ValidationError::EmptyAccessKey)?;

    file.save(&key)?;
    info!("Access key saved to {}", file.path().display());
    Ok(())
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
