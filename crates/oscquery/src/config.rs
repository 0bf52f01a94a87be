// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Query service configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Transport protocol of the paired OSC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OscTransport {
    #[default]
    Udp,
    Tcp,
}

impl fmt::Display for OscTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Udp => f.write_str("UDP"),
            Self::Tcp => f.write_str("TCP"),
        }
    }
}

/// Query service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, advertised and returned as `NAME` in host info
    #[serde(default = "default_name")]
    pub name: String,

    /// Address the HTTP server binds to (default: 0.0.0.0)
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// HTTP query port (default: 9020)
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Address of the paired OSC endpoint
    #[serde(default = "default_osc_ip")]
    pub osc_ip: IpAddr,

    /// Port of the paired OSC endpoint (default: 9021)
    #[serde(default = "default_osc_port")]
    pub osc_port: u16,

    /// Transport of the paired OSC endpoint
    #[serde(default)]
    pub osc_transport: OscTransport,

    /// Announce the service on the local network
    #[serde(default = "default_true")]
    pub advertise: bool,
}

fn default_name() -> String {
    "oscquery".to_string()
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_http_port() -> u16 {
    9020
}

fn default_osc_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_osc_port() -> u16 {
    9021
}

fn default_true() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            bind_address: default_bind_address(),
            http_port: default_http_port(),
            osc_ip: default_osc_ip(),
            osc_port: default_osc_port(),
            osc_transport: OscTransport::default(),
            advertise: true,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// HTTP listen address.
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.http_port)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name cannot be empty".into()));
        }
        if self.http_port == 0 {
            return Err(ConfigError::Invalid("http_port cannot be 0".into()));
        }
        if self.osc_port == 0 {
            return Err(ConfigError::Invalid("osc_port cannot be 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.http_port, 9020);
        assert_eq!(config.osc_port, 9021);
        assert_eq!(config.osc_transport, OscTransport::Udp);
        assert!(config.advertise);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"name": "Test-Service", "osc_transport": "TCP"}"#).unwrap();
        assert_eq!(config.name, "Test-Service");
        assert_eq!(config.osc_transport, OscTransport::Tcp);
        assert_eq!(config.http_port, 9020);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.json");

        let config = ServiceConfig {
            name: "Round trip".into(),
            http_port: 8080,
            advertise: false,
            ..Default::default()
        };
        config.to_file(&path).unwrap();

        let loaded = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = ServiceConfig::from_file("/nonexistent/service.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation() {
        let config = ServiceConfig {
            http_port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            name: "  ".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            osc_port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_http_addr() {
        let config = ServiceConfig::default();
        assert_eq!(config.http_addr().to_string(), "0.0.0.0:9020");
    }
}
