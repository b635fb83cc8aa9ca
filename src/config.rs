//! Server configuration: address, transport timeouts, and directories.
//!
//! Loaded from a TOML file with every field optional, or constructed via
//! `Default`. The bind address can additionally be overridden through the
//! `RELAYKIT_ADDR` environment variable, which wins over the file.

use std::env;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// Default config file probed by [`WebConfig::load_default`].
pub const DEFAULT_CONFIG_FILE: &str = "config/web.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address, e.g. `127.0.0.1:8080`.
    pub address: String,
    /// Read timeout in seconds. The bundled coroutine transport does not
    /// enforce per-connection deadlines; the value is surfaced to process
    /// `register` hooks for their own I/O budgets.
    pub read_timeout: u64,
    /// Write timeout in seconds. Same enforcement caveat as `read_timeout`.
    pub write_timeout: u64,
    /// Maximum number of request headers the transport parses. Rounded up
    /// to the next bound the transport supports (8, 16, 32 or 64).
    pub max_headers: usize,
    /// Application root directory.
    pub root_dir: String,
    /// Configuration directory.
    pub config_dir: String,
    /// Public (static asset) directory.
    pub public_dir: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8080".to_string(),
            read_timeout: 30,
            write_timeout: 30,
            max_headers: 32,
            root_dir: ".".to_string(),
            config_dir: "config".to_string(),
            public_dir: "public".to_string(),
        }
    }
}

impl WebConfig {
    /// Load configuration from a TOML file, then apply env overrides.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut config: WebConfig = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    /// Load [`DEFAULT_CONFIG_FILE`], falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load_default() -> Self {
        Self::load(DEFAULT_CONFIG_FILE).unwrap_or_else(|_| {
            let mut config = Self::default();
            config.apply_env();
            config
        })
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = env::var("RELAYKIT_ADDR") {
            if !addr.is_empty() {
                self.address = addr;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let c = WebConfig::default();
        assert_eq!(c.address, "127.0.0.1:8080");
        assert_eq!(c.read_timeout, 30);
        assert_eq!(c.max_headers, 32);
        assert_eq!(c.public_dir, "public");
    }

    #[test]
    fn partial_toml_fills_missing_fields_from_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "address = \"0.0.0.0:9090\"\nread_timeout = 5\nmax_headers = 48"
        )
        .unwrap();
        let c = WebConfig::load(file.path()).unwrap();
        assert_eq!(c.address, "0.0.0.0:9090");
        assert_eq!(c.read_timeout, 5);
        assert_eq!(c.max_headers, 48);
        assert_eq!(c.write_timeout, 30);
        assert_eq!(c.root_dir, ".");
    }

    #[test]
    fn missing_file_is_an_error_but_load_default_falls_back() {
        assert!(WebConfig::load("/definitely/not/here.toml").is_err());
        let c = WebConfig::load_default();
        assert_eq!(c.write_timeout, 30);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "address = [not toml").unwrap();
        assert!(WebConfig::load(file.path()).is_err());
    }
}
