// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP query server.
//!
//! Every GET is split into `(path, attribute)` and handed to
//! [`query::resolve`](crate::query::resolve) under the address-space read
//! lock. Requests run concurrently on the tokio runtime; application code
//! may insert nodes at any time through the same [`SharedAddressSpace`].

use crate::address_space::SharedAddressSpace;
use crate::config::ServiceConfig;
use crate::host_info::HostInfo;
use crate::query::{self, QueryResponse};
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Bind error on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Host info serialization error: {0}")]
    HostInfo(#[from] serde_json::Error),

    #[error("Server already running")]
    AlreadyRunning,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

struct QueryState {
    space: SharedAddressSpace,
    host_info: HostInfo,
    host_info_json: Value,
}

/// HTTP server exposing an address space as OSCQuery JSON.
#[derive(Clone)]
pub struct QueryServer {
    config: Arc<ServiceConfig>,
    state: Arc<QueryState>,
    shutdown: Arc<Notify>,
    running: Arc<AtomicBool>,
}

impl QueryServer {
    /// Create a new query server for `space`.
    pub fn new(config: ServiceConfig, space: SharedAddressSpace) -> Result<Self, ServerError> {
        config.validate()?;

        let host_info = HostInfo::from_config(&config);
        let host_info_json = serde_json::to_value(&host_info)?;
        Ok(Self {
            config: Arc::new(config),
            state: Arc::new(QueryState {
                space,
                host_info,
                host_info_json,
            }),
            shutdown: Arc::new(Notify::new()),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn host_info(&self) -> &HostInfo {
        &self.state.host_info
    }

    pub fn address_space(&self) -> &SharedAddressSpace {
        &self.state.space
    }

    /// Router answering every GET path.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(handle_query))
            .route("/*path", get(handle_query))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until [`shutdown`](Self::shutdown).
    pub async fn run(&self) -> Result<(), ServerError> {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until [`shutdown`](Self::shutdown).
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyRunning);
        }

        let local_addr = listener.local_addr()?;
        info!(
            "OSCQuery server '{}' listening on http://{}",
            self.config.name, local_addr
        );

        let shutdown = self.shutdown.clone();
        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.notified().await;
                debug!("Shutdown signal received");
            })
            .await;

        self.running.store(false, Ordering::SeqCst);
        info!("OSCQuery server '{}' stopped", self.config.name);
        result.map_err(ServerError::from)
    }

    /// Signal the server to stop and release its socket.
    ///
    /// A signal sent before the server starts serving is kept and stops it
    /// as soon as it does.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Check if server is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

async fn handle_query(State(state): State<Arc<QueryState>>, uri: Uri) -> Response {
    let path = urlencoding::decode(uri.path())
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| uri.path().to_string());

    let response = {
        let space = state.space.read();
        query::resolve(&space, &state.host_info_json, &path, uri.query())
    };
    debug!("GET {} -> {}", uri, response.status());

    response.into_response()
}

impl IntoResponse for QueryResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Json(body) => (StatusCode::OK, Json(body)).into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
            Self::BadRequest => StatusCode::BAD_REQUEST.into_response(),
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
        }
    }
}
