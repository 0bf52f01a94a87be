// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Local-network service discovery (mDNS / DNS-SD).
//!
//! A running query service is announced twice:
//!
//! ```text
//! _oscjson._tcp.local.   HTTP query endpoint    (browsed)
//! _osc._udp.local.       paired OSC endpoint    (_osc._tcp.local. for TCP)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use oscquery::discovery::{ServiceAdvertiser, ServiceBrowser};
//!
//! let advertiser = ServiceAdvertiser::start(&config)?;
//! let browser = ServiceBrowser::start()?;
//! std::thread::sleep(Duration::from_secs(2));
//! for service in browser.discovered() {
//!     println!("{} at {}", service.name, service.socket_addr());
//! }
//! ```

mod advertiser;
mod browser;

pub use advertiser::ServiceAdvertiser;
pub use browser::{BrowserConfig, ServiceBrowser};

use crate::config::OscTransport;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

/// Service type of the HTTP query endpoint.
pub const OSCJSON_SERVICE_TYPE: &str = "_oscjson._tcp.local.";

/// Service type of a UDP OSC endpoint.
pub const OSC_UDP_SERVICE_TYPE: &str = "_osc._udp.local.";

/// Service type of a TCP OSC endpoint.
pub const OSC_TCP_SERVICE_TYPE: &str = "_osc._tcp.local.";

/// Service type announced for the paired transport endpoint.
pub fn osc_service_type(transport: OscTransport) -> &'static str {
    match transport {
        OscTransport::Udp => OSC_UDP_SERVICE_TYPE,
        OscTransport::Tcp => OSC_TCP_SERVICE_TYPE,
    }
}

/// Discovery errors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("mDNS error: {0}")]
    Mdns(#[from] mdns_sd::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no usable local address to advertise: {0}")]
    NoAddress(String),
}

/// An HTTP query endpoint seen on the local network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveredService {
    /// Instance name, as announced.
    pub name: String,
    /// Fully qualified DNS-SD name (`<name>.<type>`).
    pub fullname: String,
    pub address: IpAddr,
    pub port: u16,
}

impl DiscoveredService {
    pub fn new(name: impl Into<String>, address: IpAddr, port: u16) -> Self {
        let name = name.into();
        Self {
            fullname: format!("{}.{}", name, OSCJSON_SERVICE_TYPE),
            name,
            address,
            port,
        }
    }

    /// Build from a resolved mDNS record; `None` when it carries no address.
    pub fn from_resolved(info: &mdns_sd::ServiceInfo) -> Option<Self> {
        let addresses = info.get_addresses();
        let address = addresses
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addresses.iter().next())
            .copied()?;

        let fullname = info.get_fullname().to_string();
        let name = instance_name(&fullname, info.get_type()).to_string();
        Some(Self {
            name,
            fullname,
            address,
            port: info.get_port(),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

fn instance_name<'a>(fullname: &'a str, service_type: &str) -> &'a str {
    fullname
        .strip_suffix(service_type)
        .map(|name| name.trim_end_matches('.'))
        .unwrap_or(fullname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_osc_service_type() {
        assert_eq!(osc_service_type(OscTransport::Udp), "_osc._udp.local.");
        assert_eq!(osc_service_type(OscTransport::Tcp), "_osc._tcp.local.");
    }

    #[test]
    fn test_instance_name() {
        assert_eq!(
            instance_name("Test-Service._oscjson._tcp.local.", OSCJSON_SERVICE_TYPE),
            "Test-Service"
        );
        assert_eq!(instance_name("odd", OSCJSON_SERVICE_TYPE), "odd");
    }

    #[test]
    fn test_from_resolved() {
        let info = mdns_sd::ServiceInfo::new(
            OSCJSON_SERVICE_TYPE,
            "Test-Service",
            "test-host.local.",
            "127.1.1.1",
            9020,
            HashMap::<String, String>::new(),
        )
        .unwrap();

        let service = DiscoveredService::from_resolved(&info).unwrap();
        assert_eq!(service.name, "Test-Service");
        assert_eq!(service.fullname, "Test-Service._oscjson._tcp.local.");
        assert_eq!(service.port, 9020);
        assert_eq!(service.socket_addr().to_string(), "127.1.1.1:9020");
    }

    #[test]
    fn test_new_builds_fullname() {
        let service = DiscoveredService::new("svc", "127.0.0.1".parse().unwrap(), 9020);
        assert_eq!(service.fullname, "svc._oscjson._tcp.local.");
    }
}
