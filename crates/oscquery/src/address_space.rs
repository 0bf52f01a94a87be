// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The address space: the root node plus a cached node count.

use crate::error::NodeError;
use crate::node::{Iter, Node};
use crate::value::OscValue;
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Address space shared between the query server and application code.
///
/// Insertions take the write lock; lookups, encodes and counts take the
/// read lock, so readers never observe a partially inserted subtree.
pub type SharedAddressSpace = Arc<RwLock<AddressSpace>>;

/// Tree of addressable nodes rooted at `/`.
#[derive(Debug)]
pub struct AddressSpace {
    root: Node,
    /// Cleared on every mutation of the tree shape, filled on first read.
    node_count: OnceLock<usize>,
}

impl AddressSpace {
    /// Create an address space holding only the root node.
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            node_count: OnceLock::new(),
        }
    }

    /// Wrap this address space for sharing with a server.
    pub fn into_shared(self) -> SharedAddressSpace {
        Arc::new(RwLock::new(self))
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Insert `node` under its structural parent, creating missing containers.
    pub fn insert(&mut self, node: Node) -> Result<(), NodeError> {
        self.node_count = OnceLock::new();
        self.root.add_child(node)
    }

    /// Look up the node at `path`.
    pub fn find(&self, path: &str) -> Option<&Node> {
        self.root.find_subnode(path)
    }

    /// Replace the current value of the node at `path`.
    pub fn set_value(&mut self, path: &str, values: Vec<OscValue>) -> Result<(), NodeError> {
        self.root
            .find_subnode_mut(path)
            .ok_or_else(|| NodeError::NotFound(path.to_string()))?
            .set_value(values)
    }

    /// Number of nodes in the tree, root included.
    pub fn count(&self) -> usize {
        *self.node_count.get_or_init(|| self.root.iter().count())
    }

    /// Pre-order traversal of the whole tree.
    pub fn iter(&self) -> Iter<'_> {
        self.root.iter()
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddressSpace({} nodes)", self.count())
    }
}
