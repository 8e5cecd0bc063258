// Serial link defaults and configuration
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{JaguarError, Result};

// Serial port for the Jaguar RS232 adapter
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

// The Jaguar serial interface runs at 115200 8N1
pub const DEFAULT_BAUDRATE: u32 = 115_200;

// Per-byte read timeout on the port
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

// Deadline for assembling one whole frame (0 = bounded by the port timeout only)
pub const DEFAULT_FRAME_TIMEOUT_MS: u64 = 500;

/// Serial link settings, loadable from a JSON file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub port: String,
    pub baudrate: u32,
    pub read_timeout_ms: u64,
    pub frame_timeout_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baudrate: DEFAULT_BAUDRATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            frame_timeout_ms: DEFAULT_FRAME_TIMEOUT_MS,
        }
    }
}

impl LinkConfig {
    /// Load settings from a JSON file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
            .map_err(|e| JaguarError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Frame deadline, `None` when disabled
    pub fn frame_timeout(&self) -> Option<Duration> {
        (self.frame_timeout_ms > 0).then(|| Duration::from_millis(self.frame_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = LinkConfig::from_json(r#"{ "port": "/dev/ttyS1" }"#).unwrap();
        assert_eq!(config.port, "/dev/ttyS1");
        assert_eq!(config.baudrate, DEFAULT_BAUDRATE);
        assert_eq!(config.frame_timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_zero_frame_timeout_disables_deadline() {
        let config = LinkConfig::from_json(r#"{ "frame_timeout_ms": 0 }"#).unwrap();
        assert_eq!(config.frame_timeout(), None);
    }

    #[test]
    fn test_unknown_file_is_io_error() {
        let err = LinkConfig::from_file("/nonexistent/jaguar.json").unwrap_err();
        assert!(matches!(err, JaguarError::Io(_)));
    }
}
