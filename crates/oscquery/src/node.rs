// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Address-space nodes.
//!
//! A node owns its children by value, so the tree is acyclic by
//! construction and every traversal is a plain recursive walk.
//!
//! A node without children is a *method* (an addressable parameter);
//! a node with children is a *container*.

use crate::error::NodeError;
use crate::path::{self, ROOT_PATH};
use crate::value::{self, OscValue, ValueKind};
use std::fmt;

/// Access mode of a node's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Access {
    #[default]
    NoValue = 0,
    ReadOnly = 1,
    WriteOnly = 2,
    ReadWrite = 3,
}

impl Access {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_readable(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }
}

impl TryFrom<u64> for Access {
    type Error = NodeError;

    fn try_from(code: u64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::NoValue),
            1 => Ok(Self::ReadOnly),
            2 => Ok(Self::WriteOnly),
            3 => Ok(Self::ReadWrite),
            other => Err(NodeError::InvalidAccess(other)),
        }
    }
}

/// A node of the OSC address space.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    full_path: String,
    children: Vec<Node>,
    value: Option<Vec<OscValue>>,
    type_tags: Option<String>,
    access: Access,
    description: Option<String>,
}

impl Node {
    /// Create a bare container node at `path`.
    pub fn new(path: impl Into<String>) -> Result<Self, NodeError> {
        Self::builder(path).build()
    }

    /// Start building a node at `path`.
    pub fn builder(path: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(path)
    }

    /// The root node of a fresh address space.
    pub(crate) fn root() -> Self {
        Self {
            full_path: ROOT_PATH.to_string(),
            children: Vec::new(),
            value: None,
            type_tags: None,
            access: Access::NoValue,
            description: Some("root node".to_string()),
        }
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The value sequence, `None` for containers that never carried one.
    pub fn value(&self) -> Option<&[OscValue]> {
        self.value.as_deref()
    }

    /// Type tags derived from the value sequence.
    pub fn type_tags(&self) -> Option<&str> {
        self.type_tags.as_deref()
    }

    /// Kinds of the value sequence (empty when there is none).
    pub fn value_kinds(&self) -> Vec<ValueKind> {
        self.value.as_deref().map(value::kinds).unwrap_or_default()
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_method(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first search over this node and its descendants.
    pub fn find_subnode(&self, path: &str) -> Option<&Node> {
        if self.full_path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_subnode(path))
    }

    pub(crate) fn find_subnode_mut(&mut self, path: &str) -> Option<&mut Node> {
        if self.full_path == path {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_subnode_mut(path))
    }

    /// Insert `child` below its structural parent in this subtree.
    ///
    /// Missing intermediate containers are created on the way down. Nodes are
    /// never merged: a path that already exists is rejected and the tree is
    /// left untouched.
    pub fn add_child(&mut self, child: Node) -> Result<(), NodeError> {
        if !path::is_below(&self.full_path, &child.full_path) {
            if child.full_path == self.full_path {
                return Err(NodeError::DuplicatePath(child.full_path));
            }
            return Err(NodeError::OutsideSubtree {
                parent: self.full_path.clone(),
                path: child.full_path,
            });
        }
        if self.find_subnode(&child.full_path).is_some() {
            return Err(NodeError::DuplicatePath(child.full_path));
        }

        let parent_path = path::parent_path(&child.full_path).to_string();
        if self.find_subnode(&parent_path).is_none() {
            self.add_child(Node::new(parent_path.clone())?)?;
        }

        match self.find_subnode_mut(&parent_path) {
            Some(parent) => {
                parent.children.push(child);
                Ok(())
            }
            None => Err(NodeError::NotFound(parent_path)),
        }
    }

    /// Replace the value sequence, keeping the declared shape.
    pub(crate) fn set_value(&mut self, values: Vec<OscValue>) -> Result<(), NodeError> {
        value::check_finite(&self.full_path, &values)?;
        let found = value::kinds(&values);
        let expected = self.value_kinds();
        if found != expected {
            return Err(NodeError::ValueMismatch {
                path: self.full_path.clone(),
                expected,
                found,
            });
        }
        self.type_tags = Some(value::type_tags(&values));
        self.value = Some(values);
        Ok(())
    }

    /// Pre-order traversal starting at this node.
    ///
    /// Each call walks the tree as it is now; nothing is snapshotted.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Node @ {} (D: {:?} T: {:?} V: {:?})>",
            self.full_path, self.description, self.type_tags, self.value
        )
    }
}

impl<'a> IntoIterator for &'a Node {
    type Item = &'a Node;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy pre-order iterator over a subtree.
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Builder for [`Node`].
#[derive(Debug, Default)]
pub struct NodeBuilder {
    full_path: String,
    children: Vec<Node>,
    access: Access,
    description: Option<String>,
    value: Option<Vec<OscValue>>,
}

impl NodeBuilder {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            full_path: path.into(),
            ..Default::default()
        }
    }

    /// Set a single scalar value; it becomes a one-element sequence.
    pub fn value(mut self, value: impl Into<OscValue>) -> Self {
        self.value = Some(vec![value.into()]);
        self
    }

    /// Set the full value sequence (may be empty).
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<OscValue>,
    {
        self.value = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Validate and build the node.
    ///
    /// Children are placed with [`Node::add_child`], so they must lie below
    /// this path and must not collide with each other.
    pub fn build(self) -> Result<Node, NodeError> {
        if !path::is_valid_path(&self.full_path) {
            return Err(NodeError::InvalidPath(self.full_path));
        }
        if self.access != Access::NoValue && self.value.is_none() {
            return Err(NodeError::MissingValue(self.full_path));
        }
        if let Some(values) = &self.value {
            value::check_finite(&self.full_path, values)?;
        }

        let type_tags = self.value.as_deref().map(value::type_tags);
        let mut node = Node {
            full_path: self.full_path,
            children: Vec::with_capacity(self.children.len()),
            value: self.value,
            type_tags,
            access: self.access,
            description: self.description,
        };
        for child in self.children {
            node.add_child(child)?;
        }
        Ok(node)
    }
}
