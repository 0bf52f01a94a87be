// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Address-space construction and decoding errors.

use crate::value::ValueKind;
use thiserror::Error;

/// Errors raised while building, mutating or decoding address-space nodes.
///
/// These are always surfaced to the caller; nothing in the tree code
/// recovers from them internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NodeError {
    #[error("invalid path {0:?}: must start with '/' and must not contain any of {chars:?}", chars = crate::path::DISALLOWED_PATH_CHARS)]
    InvalidPath(String),

    #[error("node {0} has access other than NO_VALUE but no value sequence")]
    MissingValue(String),

    #[error("a node already exists at {0}")]
    DuplicatePath(String),

    #[error("{path} is not below {parent}")]
    OutsideSubtree { parent: String, path: String },

    #[error("unknown OSC type tag {0:?}")]
    UnknownTypeTag(char),

    #[error("invalid access mode {0}")]
    InvalidAccess(u64),

    #[error("malformed node JSON: {0}")]
    Malformed(String),

    #[error("value kinds {found:?} do not match declared kinds {expected:?} at {path}")]
    ValueMismatch {
        path: String,
        expected: Vec<ValueKind>,
        found: Vec<ValueKind>,
    },

    #[error("value {index} of {path} is not a finite number")]
    NonFiniteValue { path: String, index: usize },

    #[error("no node at {0}")]
    NotFound(String),
}
