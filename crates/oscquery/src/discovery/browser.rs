// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Background browser for query services on the local network.

use super::{DiscoveredService, DiscoveryError, OSCJSON_SERVICE_TYPE};
use mdns_sd::{ServiceDaemon, ServiceEvent};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Browser configuration.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// DNS-SD type to browse (default: `_oscjson._tcp.local.`)
    pub service_type: String,
    /// How long the browse thread waits for an event before re-checking
    /// the stop flag.
    pub poll_interval: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            service_type: OSCJSON_SERVICE_TYPE.to_string(),
            poll_interval: Duration::from_millis(100),
        }
    }
}

type ServiceTable = Arc<RwLock<BTreeMap<String, DiscoveredService>>>;

/// Collects query services announced on the local network.
///
/// Resolution runs on a dedicated thread. The table only grows: services
/// that later leave the network stay listed, and a service resolved again
/// at a new address or port is updated in place.
pub struct ServiceBrowser {
    daemon: ServiceDaemon,
    service_type: String,
    services: ServiceTable,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ServiceBrowser {
    /// Browse for `_oscjson._tcp.local.` services.
    pub fn start() -> Result<Self, DiscoveryError> {
        Self::with_config(BrowserConfig::default())
    }

    pub fn with_config(config: BrowserConfig) -> Result<Self, DiscoveryError> {
        let daemon = ServiceDaemon::new()?;
        let receiver = daemon.browse(&config.service_type)?;

        let services: ServiceTable = Arc::new(RwLock::new(BTreeMap::new()));
        let running = Arc::new(AtomicBool::new(true));

        let thread_services = services.clone();
        let thread_running = running.clone();
        let poll_interval = config.poll_interval;

        let handle = std::thread::Builder::new()
            .name("oscquery-browser".into())
            .spawn(move || {
                while thread_running.load(Ordering::Relaxed) {
                    match receiver.recv_timeout(poll_interval) {
                        Ok(event) => handle_event(&thread_services, event),
                        Err(_) if receiver.is_disconnected() => {
                            debug!("Browse channel closed");
                            break;
                        }
                        Err(_) => {}
                    }
                }
            })?;

        info!("Browsing for {}", config.service_type);

        Ok(Self {
            daemon,
            service_type: config.service_type,
            services,
            running,
            handle: Some(handle),
        })
    }

    /// Snapshot of every service resolved so far, ordered by full name.
    pub fn discovered(&self) -> Vec<DiscoveredService> {
        self.services.read().values().cloned().collect()
    }

    /// Look up a resolved service by instance name.
    pub fn find(&self, name: &str) -> Option<DiscoveredService> {
        self.services
            .read()
            .values()
            .find(|service| service.name == name)
            .cloned()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stop browsing and join the browse thread. Already resolved services
    /// remain available through [`discovered`](Self::discovered).
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Err(e) = self.daemon.stop_browse(&self.service_type) {
            warn!("Failed to stop browsing {}: {}", self.service_type, e);
        }
        if let Err(e) = self.daemon.shutdown() {
            warn!("mDNS daemon shutdown failed: {}", e);
        }
        if let Some(handle) = self.handle.take() {
            join_browse_thread(handle);
        }
        info!("Stopped browsing {}", self.service_type);
    }
}

impl Drop for ServiceBrowser {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Returns false when the browse thread panicked.
fn join_browse_thread(handle: JoinHandle<()>) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(_) => {
            warn!("Browse thread panicked");
            false
        }
    }
}

fn handle_event(services: &ServiceTable, event: ServiceEvent) {
    match event {
        ServiceEvent::ServiceResolved(info) => {
            let Some(service) = DiscoveredService::from_resolved(&info) else {
                debug!("Ignoring {} without address", info.get_fullname());
                return;
            };
            let mut table = services.write();
            match table.get_mut(&service.fullname) {
                Some(known) if *known == service => {}
                Some(known) => {
                    info!(
                        "'{}' moved from {} to {}",
                        service.name,
                        known.socket_addr(),
                        service.socket_addr()
                    );
                    *known = service;
                }
                None => {
                    info!(
                        "Discovered '{}' at {}",
                        service.name,
                        service.socket_addr()
                    );
                    table.insert(service.fullname.clone(), service);
                }
            }
        }
        ServiceEvent::ServiceRemoved(_, fullname) => {
            debug!("{} left the network", fullname);
        }
        other => trace!("mDNS event: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolved(name: &str, ip: &str) -> ServiceEvent {
        resolved_at(name, ip, 9020)
    }

    fn resolved_at(name: &str, ip: &str, port: u16) -> ServiceEvent {
        let info = mdns_sd::ServiceInfo::new(
            OSCJSON_SERVICE_TYPE,
            name,
            "test-host.local.",
            ip,
            port,
            HashMap::<String, String>::new(),
        )
        .unwrap();
        ServiceEvent::ServiceResolved(info)
    }

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert_eq!(config.service_type, "_oscjson._tcp.local.");
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_resolved_services_accumulate() {
        let table: ServiceTable = Arc::new(RwLock::new(BTreeMap::new()));
        handle_event(&table, resolved("Service-A", "127.1.1.1"));
        handle_event(&table, resolved("Service-B", "127.1.1.2"));
        handle_event(&table, resolved("Service-A", "127.1.1.1"));

        let table = table.read();
        assert_eq!(table.len(), 2);
        assert!(table.contains_key("Service-A._oscjson._tcp.local."));
    }

    #[test]
    fn test_re_resolution_updates_entry() {
        let table: ServiceTable = Arc::new(RwLock::new(BTreeMap::new()));
        handle_event(&table, resolved_at("Service-A", "127.1.1.1", 9020));
        handle_event(&table, resolved_at("Service-A", "127.1.1.9", 9030));

        let table = table.read();
        assert_eq!(table.len(), 1);
        let service = &table["Service-A._oscjson._tcp.local."];
        assert_eq!(service.socket_addr().to_string(), "127.1.1.9:9030");
    }

    #[test]
    fn test_join_reports_panicked_thread() {
        let healthy = std::thread::spawn(|| {});
        assert!(join_browse_thread(healthy));

        let crashed = std::thread::spawn(|| panic!("browse loop failed"));
        assert!(!join_browse_thread(crashed));
    }

    #[test]
    fn test_removal_keeps_entry() {
        let table: ServiceTable = Arc::new(RwLock::new(BTreeMap::new()));
        handle_event(&table, resolved("Service-A", "127.1.1.1"));
        handle_event(
            &table,
            ServiceEvent::ServiceRemoved(
                OSCJSON_SERVICE_TYPE.to_string(),
                "Service-A._oscjson._tcp.local.".to_string(),
            ),
        );
        assert_eq!(table.read().len(), 1);
    }

    #[test]
    #[ignore = "Requires multicast-capable network"]
    fn test_browser_start_stop() {
        let mut browser = ServiceBrowser::start().unwrap();
        assert!(browser.is_running());
        browser.stop();
        assert!(!browser.is_running());
    }
}
