//! Configuration loaded from TOML.
//!
//! ```toml
//! directory = "/var/lib/app/crashes"
//! clear_policy = "forwarded"   # or "all"
//!
//! [probe]
//! address = "telemetry.example.com:443"
//! timeout_ms = 3000
//! ```

use crate::error::{Error, Result};
use crashlog_drain::{ClearPolicy, TcpProbe};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default TCP probe timeout in milliseconds
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3_000;

/// Settings for a [`CrashLog`](crate::CrashLog).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrashLogConfig {
    /// Directory holding record files; must already exist
    pub directory: PathBuf,

    /// Fixed session id; a random one is generated when absent
    #[serde(default)]
    pub session_id: Option<String>,

    /// What a drain deletes
    #[serde(default)]
    pub clear_policy: ClearPolicy,

    /// Optional TCP connectivity probe
    #[serde(default)]
    pub probe: Option<ProbeConfig>,
}

/// TCP connectivity probe settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    /// `host:port` to connect to
    pub address: String,

    /// Connect timeout in milliseconds
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

impl CrashLogConfig {
    /// Config with just a directory and defaults for everything else
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            session_id: None,
            clear_policy: ClearPolicy::default(),
            probe: None,
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// The configured TCP probe, if any
    pub fn tcp_probe(&self) -> Option<TcpProbe> {
        self.probe
            .as_ref()
            .map(|p| TcpProbe::new(p.address.clone(), Duration::from_millis(p.timeout_ms)))
    }

    fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(Error::Config("directory must not be empty".into()));
        }
        if let Some(probe) = &self.probe {
            if probe.address.is_empty() {
                return Err(Error::Config("probe.address must not be empty".into()));
            }
            if probe.timeout_ms == 0 {
                return Err(Error::Config("probe.timeout_ms must be positive".into()));
            }
        }
        if matches!(&self.session_id, Some(id) if id.is_empty()) {
            return Err(Error::Config("session_id must not be empty".into()));
        }
        Ok(())
    }
}
