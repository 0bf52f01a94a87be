// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Announces a query service and its paired OSC endpoint.

use super::{osc_service_type, DiscoveryError, OSCJSON_SERVICE_TYPE};
use crate::config::ServiceConfig;
use mdns_sd::{ServiceDaemon, ServiceInfo};
use std::collections::HashMap;
use std::net::IpAddr;
use tracing::{debug, info, warn};

/// Keeps the two announcements of a running service alive.
///
/// Both announcements are withdrawn by [`shutdown`](Self::shutdown) or when
/// the advertiser is dropped.
pub struct ServiceAdvertiser {
    daemon: ServiceDaemon,
    registered: Vec<String>,
}

impl ServiceAdvertiser {
    /// Register the HTTP and OSC announcements for `config`.
    pub fn start(config: &ServiceConfig) -> Result<Self, DiscoveryError> {
        let http_ip = advertised_ip(config.bind_address)?;
        let host_name = host_name()?;
        let daemon = ServiceDaemon::new()?;

        let mut advertiser = Self {
            daemon,
            registered: Vec::with_capacity(2),
        };

        advertiser.register(
            OSCJSON_SERVICE_TYPE,
            &config.name,
            &host_name,
            http_ip,
            config.http_port,
        )?;
        advertiser.register(
            osc_service_type(config.osc_transport),
            &config.name,
            &host_name,
            config.osc_ip,
            config.osc_port,
        )?;

        Ok(advertiser)
    }

    fn register(
        &mut self,
        service_type: &str,
        name: &str,
        host_name: &str,
        ip: IpAddr,
        port: u16,
    ) -> Result<(), DiscoveryError> {
        let properties = HashMap::from([("txtvers".to_string(), "1".to_string())]);
        let info = ServiceInfo::new(service_type, name, host_name, ip, port, properties)?;
        let fullname = info.get_fullname().to_string();

        debug!(
            "Registering {} host_name={} ip={} port={}",
            fullname, host_name, ip, port
        );
        self.daemon.register(info)?;
        info!("Advertised {} at {}:{}", fullname, ip, port);

        self.registered.push(fullname);
        Ok(())
    }

    /// Fully qualified names currently announced.
    pub fn registered(&self) -> &[String] {
        &self.registered
    }

    /// Withdraw every announcement and stop the mDNS daemon.
    pub fn shutdown(&mut self) -> Result<(), DiscoveryError> {
        if self.registered.is_empty() {
            return Ok(());
        }
        for fullname in self.registered.drain(..) {
            match self.daemon.unregister(&fullname) {
                Ok(_) => info!("Withdrew {}", fullname),
                Err(e) => warn!("Failed to withdraw {}: {}", fullname, e),
            }
        }
        self.daemon.shutdown()?;
        Ok(())
    }
}

impl Drop for ServiceAdvertiser {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Advertiser shutdown failed: {}", e);
        }
    }
}

/// Address to announce for an HTTP server bound to `bind_address`.
///
/// An unspecified bind address is replaced by the host's primary local IP.
fn advertised_ip(bind_address: IpAddr) -> Result<IpAddr, DiscoveryError> {
    if !bind_address.is_unspecified() {
        return Ok(bind_address);
    }
    local_ip_address::local_ip().map_err(|e| DiscoveryError::NoAddress(e.to_string()))
}

fn host_name() -> Result<String, DiscoveryError> {
    let name = hostname::get()?
        .into_string()
        .unwrap_or_else(|_| "oscquery".to_string());
    Ok(format!("{}.local.", name))
}
