//! Configuration management for the meinETA client

use crate::error::{MeinEtaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, time::Duration};
use url::Url;

/// Default HTTP port of the controller's REST API
pub const DEFAULT_PORT: u16 = 80;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of attempts per document fetch
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Connection settings for a single ETA controller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Hostname or IP address of the controller
    pub host: String,

    /// Port the REST API listens on
    pub port: u16,

    /// Total timeout per request (connect + read)
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Maximum number of attempts for a document fetch
    pub max_retries: u32,

    /// Pause between attempts after a network failure
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::ZERO,
        }
    }
}

impl ClientConfig {
    /// Create a config for `host` with default port and timeout
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("MEINETA_HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("MEINETA_PORT") {
            config.port = port
                .parse()
                .map_err(|e| MeinEtaError::config(format!("Invalid MEINETA_PORT: {e}")))?;
        }

        if let Ok(timeout) = env::var("MEINETA_TIMEOUT") {
            config.timeout = Duration::from_secs(
                timeout
                    .parse()
                    .map_err(|e| MeinEtaError::config(format!("Invalid MEINETA_TIMEOUT: {e}")))?,
            );
        }

        if let Ok(retries) = env::var("MEINETA_MAX_RETRIES") {
            config.max_retries = retries
                .parse()
                .map_err(|e| MeinEtaError::config(format!("Invalid MEINETA_MAX_RETRIES: {e}")))?;
        }

        if let Ok(delay) = env::var("MEINETA_RETRY_DELAY_MS") {
            config.retry_delay = Duration::from_millis(delay.parse().map_err(|e| {
                MeinEtaError::config(format!("Invalid MEINETA_RETRY_DELAY_MS: {e}"))
            })?);
        }

        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| MeinEtaError::config(format!("Invalid config file: {e}")))
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            MeinEtaError::config(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(MeinEtaError::config("Host cannot be empty"));
        }

        if self.timeout.is_zero() {
            return Err(MeinEtaError::config("Timeout must be greater than zero"));
        }

        if self.max_retries == 0 {
            return Err(MeinEtaError::config("At least one attempt is required"));
        }

        self.base_url().map(|_| ())
    }

    /// Root URL of the controller API, e.g. `http://192.168.1.100:8080/`
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&format!("http://{}:{}/", self.host, self.port))
            .map_err(|e| MeinEtaError::config(format!("Invalid host {}: {e}", self.host)))
    }

    /// Discovery endpoint serving the menu tree
    pub fn menu_url(&self) -> Result<Url> {
        join(&self.base_url()?, "user/menu")
    }

    /// Data endpoint for one device address
    ///
    /// Addresses from the sensor map start with `/`; one leading slash is
    /// dropped so the path keeps a single separator. The rest is appended
    /// as literal path segments, so `?` or `#` are percent-encoded.
    pub fn var_url(&self, address: &str) -> Result<Url> {
        let address = address.strip_prefix('/').unwrap_or(address);
        let mut url = self.base_url()?;
        url.path_segments_mut()
            .map_err(|_| MeinEtaError::config(format!("Invalid host {}", self.host)))?
            .pop_if_empty()
            .extend(["user", "var"])
            .extend(address.split('/'));
        Ok(url)
    }
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| MeinEtaError::config(format!("Invalid URL path {path}: {e}")))
}
