// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Blocking HTTP client for a discovered query service.

use crate::discovery::DiscoveredService;
use crate::error::NodeError;
use crate::host_info::{HostInfo, HOST_INFO_QUERY};
use crate::node::Node;
use crate::value::OscValue;
use crate::wire::{self, Attribute};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid node: {0}")]
    Decode(#[from] NodeError),
}

/// Query client bound to one service.
#[derive(Debug, Clone)]
pub struct QueryClient {
    service: DiscoveredService,
    http: Client,
    base_url: String,
}

impl QueryClient {
    pub fn new(service: DiscoveredService) -> Result<Self, ClientError> {
        Self::with_timeout(service, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(service: DiscoveredService, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = format!("http://{}", service.socket_addr());
        Ok(Self {
            service,
            http,
            base_url,
        })
    }

    pub fn service(&self) -> &DiscoveredService {
        &self.service
    }

    /// Fetch the service's host information.
    pub fn host_info(&self) -> Result<HostInfo, ClientError> {
        let response = self.get("/", Some(HOST_INFO_QUERY))?;
        match response.status() {
            StatusCode::OK => Ok(serde_json::from_str(&response.text()?)?),
            status => Err(ClientError::Status(status.as_u16())),
        }
    }

    /// Fetch the node at `path` with its whole subtree.
    ///
    /// Returns `Ok(None)` when the service has no node at `path`.
    pub fn query_node(&self, path: &str) -> Result<Option<Node>, ClientError> {
        let response = self.get(path, None)?;
        match response.status() {
            StatusCode::OK => {
                let json: Value = serde_json::from_str(&response.text()?)?;
                Ok(Some(Node::from_wire(&json)?))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(ClientError::Status(status.as_u16())),
        }
    }

    /// Fetch only the current value at `path`.
    ///
    /// Returns `Ok(None)` when the node is missing or its value is not
    /// disclosed.
    pub fn query_value(&self, path: &str) -> Result<Option<Vec<OscValue>>, ClientError> {
        let response = self.get(path, Some(Attribute::Value.key()))?;
        match response.status() {
            StatusCode::OK => {
                let json: Value = serde_json::from_str(&response.text()?)?;
                let object = json.as_object().ok_or_else(|| {
                    NodeError::Malformed(format!("expected an attribute object, got {}", json))
                })?;
                let values = wire::decode_value_attribute(path, object)?;
                Ok(Some(values.unwrap_or_default()))
            }
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(None),
            status => Err(ClientError::Status(status.as_u16())),
        }
    }

    /// Issue a raw GET and return the JSON body, if any, with the status code.
    pub fn get_json(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> Result<(u16, Option<Value>), ClientError> {
        let response = self.get(path, query)?;
        let status = response.status().as_u16();
        let text = response.text()?;
        if text.is_empty() {
            return Ok((status, None));
        }
        Ok((status, Some(serde_json::from_str(&text)?)))
    }

    fn get(&self, path: &str, query: Option<&str>) -> Result<Response, ClientError> {
        let url = self.url(path, query);
        debug!("GET {}", url);
        Ok(self.http.get(url).send()?)
    }

    fn url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(query) => format!("{}{}?{}", self.base_url, path, query),
            None => format!("{}{}", self.base_url, path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn client() -> QueryClient {
        let service = DiscoveredService::new("svc", "127.0.0.1".parse().unwrap(), 9020);
        QueryClient::new(service).unwrap()
    }

    #[test]
    fn test_url_building() {
        let client = client();
        assert_eq!(client.url("/", None), "http://127.0.0.1:9020/");
        assert_eq!(
            client.url("/", Some(HOST_INFO_QUERY)),
            "http://127.0.0.1:9020/?HOST_INFO"
        );
        assert_eq!(
            client.url("/foo/bar", Some("VALUE")),
            "http://127.0.0.1:9020/foo/bar?VALUE"
        );
    }

    /// Answer exactly one request with `status` and `body`, then close.
    fn serve_once(status: &'static str, body: &'static str) -> DiscoveredService {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 512];
            while !request.ends_with(b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        DiscoveredService::new("canned", addr.ip(), addr.port())
    }

    #[test]
    fn test_query_value_placeholder() {
        let client = QueryClient::new(serve_once("200 OK", r#"{"VALUE":[{}]}"#)).unwrap();
        assert_eq!(client.query_value("/x").unwrap(), Some(vec![]));
    }

    #[test]
    fn test_query_value_coerced_by_type() {
        let client =
            QueryClient::new(serve_once("200 OK", r#"{"TYPE":"fi","VALUE":[1,2]}"#)).unwrap();
        assert_eq!(
            client.query_value("/x").unwrap(),
            Some(vec![OscValue::Float(1.0), OscValue::Int(2)])
        );
    }

    #[test]
    fn test_query_value_not_disclosed() {
        let client = QueryClient::new(serve_once("204 No Content", "")).unwrap();
        assert_eq!(client.query_value("/x").unwrap(), None);
    }

    #[test]
    fn test_query_value_rejects_non_object() {
        let client = QueryClient::new(serve_once("200 OK", "[1]")).unwrap();
        assert!(matches!(
            client.query_value("/x"),
            Err(ClientError::Decode(NodeError::Malformed(_)))
        ));
    }

    #[test]
    #[ignore = "Requires query service running"]
    fn test_client_host_info() {
        let info = client().host_info().unwrap();
        assert!(!info.name.is_empty());
    }
}
