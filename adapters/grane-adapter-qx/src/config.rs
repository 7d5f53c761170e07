//! Adapter configuration: credentials, backend selection, shot count.
//!
//! Credential lookup order mirrors the historical client: a
//! `~/.qx_config` file, then a file named by `QX_CONFIG`, then the
//! `QX_API_KEY` environment variable. The remaining knobs
//! (`QX_URL`, `QX_BACKEND`, `QX_SHOTS`, `QX_WRITE_QASM`) come from the
//! environment and override file values.

use std::fmt;
use std::path::{Path, PathBuf};

use grane_hal::PollPolicy;

use crate::api::DEFAULT_ENDPOINT;
use crate::error::{QxError, QxResult};

/// Default backend when none is configured.
pub const DEFAULT_BACKEND: &str = "ibmqx_qasm_simulator";

/// Default shot count when none is configured.
pub const DEFAULT_SHOTS: u32 = 1024;

/// Credit ceiling sent with every submission.
pub const DEFAULT_MAX_CREDITS: u32 = 5;

/// Configuration for a [`crate::QxAccelerator`].
#[derive(Clone)]
pub struct QxConfig {
    /// API endpoint URL.
    pub url: String,
    /// API key exchanged for an access token at login.
    pub api_key: Option<String>,
    /// Selected backend name.
    pub backend: String,
    /// Shots per circuit.
    pub shots: u32,
    /// Credit ceiling for submissions.
    pub max_credits: u32,
    /// When set, decoded assembly text is dumped to
    /// `<dir>/<circuit-name>.qasm` at submission time.
    pub write_qasm_dir: Option<PathBuf>,
    /// Status polling policy.
    pub poll: PollPolicy,
}

impl Default for QxConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            backend: DEFAULT_BACKEND.to_string(),
            shots: DEFAULT_SHOTS,
            max_credits: DEFAULT_MAX_CREDITS,
            write_qasm_dir: None,
            poll: PollPolicy::default(),
        }
    }
}

impl fmt::Debug for QxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QxConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("backend", &self.backend)
            .field("shots", &self.shots)
            .field("max_credits", &self.max_credits)
            .field("write_qasm_dir", &self.write_qasm_dir)
            .field("poll", &self.poll)
            .finish()
    }
}

impl QxConfig {
    /// Configuration with an explicit API key and defaults elsewhere.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Set the endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Select a backend.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    /// Set the shot count.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Dump decoded assembly to files under `dir` at submission time.
    pub fn with_write_qasm_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.write_qasm_dir = Some(dir.into());
        self
    }

    /// Set the polling policy.
    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Load configuration from the config file and environment.
    ///
    /// Fails with a configuration error when no API key is found
    /// anywhere.
    pub fn from_env() -> QxResult<Self> {
        let mut config = Self::default();

        let home_config = dirs::home_dir().map(|home| home.join(".qx_config"));
        if let Some(path) = home_config.filter(|p| p.exists()) {
            config.apply_file(&path)?;
        } else if let Ok(path) = std::env::var("QX_CONFIG") {
            config.apply_file(Path::new(&path))?;
        }

        if let Ok(key) = std::env::var("QX_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("QX_URL") {
            config.url = url;
        }
        if let Ok(backend) = std::env::var("QX_BACKEND") {
            config.backend = backend;
        }
        if let Ok(shots) = std::env::var("QX_SHOTS") {
            config.shots = shots.parse().map_err(|_| {
                QxError::InvalidConfig(format!("QX_SHOTS is not a number: {shots:?}"))
            })?;
        }
        if let Ok(dir) = std::env::var("QX_WRITE_QASM") {
            config.write_qasm_dir = Some(PathBuf::from(dir));
        }

        match &config.api_key {
            Some(key) if !key.is_empty() => Ok(config),
            _ => Err(QxError::MissingApiKey),
        }
    }

    fn apply_file(&mut self, path: &Path) -> QxResult<()> {
        let contents = std::fs::read_to_string(path)?;
        let (key, url) = parse_config_text(&contents);
        if let Some(key) = key {
            self.api_key = Some(key);
        }
        if let Some(url) = url {
            self.url = url;
        }
        Ok(())
    }
}

/// Parse `key:` and `url:` lines out of a config file body.
fn parse_config_text(contents: &str) -> (Option<String>, Option<String>) {
    let mut key = None;
    let mut url = None;
    for line in contents.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("key:") {
            key = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("url:") {
            url = Some(value.trim().to_string());
        }
    }
    (key, url)
}
