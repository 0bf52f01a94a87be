// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Announce-and-browse round trip over real mDNS.

use oscquery::{ServiceAdvertiser, ServiceBrowser, ServiceConfig};
use std::time::{Duration, Instant};

#[test]
#[ignore = "Requires multicast-capable network"]
fn test_advertised_service_is_discovered() {
    let config = ServiceConfig {
        name: "Discovery-Test".into(),
        http_port: 19020,
        osc_port: 19021,
        bind_address: "127.0.0.1".parse().unwrap(),
        ..Default::default()
    };

    let mut advertiser = ServiceAdvertiser::start(&config).unwrap();
    assert_eq!(advertiser.registered().len(), 2);

    let mut browser = ServiceBrowser::start().unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    let found = loop {
        if let Some(service) = browser.find("Discovery-Test") {
            break Some(service);
        }
        if Instant::now() > deadline {
            break None;
        }
        std::thread::sleep(Duration::from_millis(100));
    };

    let service = found.expect("service not discovered");
    assert_eq!(service.port, 19020);

    browser.stop();
    // Entries survive stopping.
    assert!(!browser.discovered().is_empty());

    advertiser.shutdown().unwrap();
    assert!(advertiser.registered().is_empty());
}
