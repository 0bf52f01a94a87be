// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OSCQuery
//!
//! Publishes a tree of typed OSC parameters as JSON over HTTP and finds
//! other such services on the local network.
//!
//! # Features
//!
//! - **Address Space**: hierarchical container/method nodes with typed values
//! - **Query Server**: `GET <path>[?<ATTRIBUTE>]` answered from the live tree
//! - **Discovery**: mDNS announcement and browsing of `_oscjson._tcp` services
//! - **Query Client**: host info and node retrieval from a discovered service
//! - **Dispatch**: shape-checked routing of method invocations to callbacks
//!
//! # Quick Start
//!
//! ```bash
//! # Serve a tree on port 9020 and announce it
//! oscquery serve --tree tree.json --name "My Synth"
//!
//! # List services on the network
//! oscquery browse --settle 2 --path /
//! ```
//!
//! # Library
//!
//! ```ignore
//! use oscquery::{Access, AddressSpace, Node, QueryServer, ServiceConfig};
//!
//! let space = AddressSpace::new().into_shared();
//! let server = QueryServer::new(ServiceConfig::default(), space.clone())?;
//! tokio::spawn({
//!     let server = server.clone();
//!     async move { server.run().await }
//! });
//!
//! // Visible to the next request.
//! space.write().insert(
//!     Node::builder("/filter/cutoff")
//!         .value(440.0)
//!         .access(Access::ReadWrite)
//!         .build()?,
//! )?;
//! ```

pub mod address_space;
pub mod client;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod host_info;
pub mod node;
pub mod path;
pub mod query;
pub mod server;
pub mod value;
pub mod wire;

pub use address_space::{AddressSpace, SharedAddressSpace};
pub use client::{ClientError, QueryClient};
pub use config::{ConfigError, OscTransport, ServiceConfig};
pub use discovery::{
    BrowserConfig, DiscoveredService, DiscoveryError, ServiceAdvertiser, ServiceBrowser,
};
pub use dispatch::{DispatchError, Dispatcher, MethodCallback, MethodHandler};
pub use error::NodeError;
pub use host_info::HostInfo;
pub use node::{Access, Node, NodeBuilder};
pub use query::QueryResponse;
pub use server::{QueryServer, ServerError};
pub use value::{OscValue, ValueKind};
pub use wire::Attribute;
