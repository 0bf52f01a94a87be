// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `HOST_INFO` payload.

use crate::config::{OscTransport, ServiceConfig};
use crate::wire::Attribute;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query string that selects the host info instead of a node.
pub const HOST_INFO_QUERY: &str = "HOST_INFO";

/// Description of a service and its paired OSC transport endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct HostInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osc_ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osc_port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osc_transport: Option<OscTransport>,

    /// Optional protocol features and whether they are supported.
    #[serde(default)]
    pub extensions: BTreeMap<String, bool>,
}

impl HostInfo {
    /// Host info served for `config`.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let extensions = [Attribute::Access, Attribute::Value, Attribute::Description]
            .into_iter()
            .map(|attr| (attr.key().to_string(), true))
            .collect();

        Self {
            name: config.name.clone(),
            osc_ip: Some(config.osc_ip.to_string()),
            osc_port: Some(config.osc_port),
            osc_transport: Some(config.osc_transport),
            extensions,
        }
    }

    /// Whether the host declares support for `extension`.
    pub fn supports(&self, extension: &str) -> bool {
        self.extensions.get(extension).copied().unwrap_or(false)
    }
}
