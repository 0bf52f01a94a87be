// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Query resolution: HTTP path + optional attribute to a protocol outcome.
//!
//! | request                       | outcome                         |
//! |-------------------------------|---------------------------------|
//! | `/?HOST_INFO`                 | 200, host info                  |
//! | unknown path                  | 404                             |
//! | `<path>`                      | 200, full node                  |
//! | `<path>?<ATTR>`               | 200, `{ATTR: value}`            |
//! | `<path>?<ATTR>` not disclosed | 204 (e.g. VALUE of write-only)  |
//! | `<path>?<UNKNOWN>`            | 400                             |

use crate::address_space::AddressSpace;
use crate::host_info::HOST_INFO_QUERY;
use crate::path::ROOT_PATH;
use crate::wire::{self, Attribute};
use serde_json::Value;
use tracing::debug;

/// Outcome of resolving a query. None of these are failures.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// 200 with a JSON body.
    Json(Value),
    /// 204: the attribute exists but is not disclosed.
    NoContent,
    /// 400: unrecognized attribute.
    BadRequest,
    /// 404: no node at the path.
    NotFound,
}

impl QueryResponse {
    pub fn status(&self) -> u16 {
        match self {
            Self::Json(_) => 200,
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::NotFound => 404,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Json(body) => Some(body),
            _ => None,
        }
    }
}

/// Resolve `path` and an optional attribute `query` against `space`.
///
/// `host_info` is the already serialized `HOST_INFO` payload.
pub fn resolve(
    space: &AddressSpace,
    host_info: &Value,
    path: &str,
    query: Option<&str>,
) -> QueryResponse {
    let query = query.filter(|q| !q.is_empty());

    if path == ROOT_PATH && query == Some(HOST_INFO_QUERY) {
        return QueryResponse::Json(host_info.clone());
    }

    let Some(node) = space.find(path) else {
        debug!("No node at {}", path);
        return QueryResponse::NotFound;
    };

    let Some(query) = query else {
        return QueryResponse::Json(wire::encode(node, None));
    };

    match query.parse::<Attribute>() {
        Ok(attribute) if wire::is_disclosed(node, attribute) => {
            QueryResponse::Json(wire::encode(node, Some(attribute)))
        }
        Ok(attribute) => {
            debug!("{} of {} is not disclosed", attribute, path);
            QueryResponse::NoContent
        }
        Err(e) => {
            debug!("Rejecting query on {}: {}", path, e);
            QueryResponse::BadRequest
        }
    }
}
