//! Session settings, loadable from YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HeliumError, Result};
use crate::poll::POLL_WAIT_US;
use crate::transport::Baud;

/// Default serial device.
pub const DEFAULT_PORT: &str = "/dev/serial0";

/// Default bound on how long a read waits for the Atom.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1_000;

/// How to reach the Atom.
///
/// ```yaml
/// port: /dev/ttyUSB0
/// baud: 115200
/// read_timeout_ms: 500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Serial device path.
    pub port: String,
    /// Link speed.
    pub baud: Baud,
    /// Longest wait for a reply byte, in milliseconds.
    pub read_timeout_ms: u64,
    /// Wait after a "not ready" poll reply, in microseconds.
    pub poll_wait_us: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            port: DEFAULT_PORT.to_string(),
            baud: Baud::default(),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            poll_wait_us: POLL_WAIT_US,
        }
    }
}

impl SessionConfig {
    /// Parse settings from YAML. Missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| HeliumError::Config(e.to_string()))
    }

    /// Load settings from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| HeliumError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }
}
