// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OSCQuery JSON wire format for address-space nodes.
//!
//! Wire format (one object per node, keyed by attribute name):
//! ```text
//! {
//!   "FULL_PATH":   "/test",
//!   "CONTENTS":    { "<last segment>": { ...node... }, ... },
//!   "TYPE":        "i",
//!   "VALUE":       [99],
//!   "ACCESS":      1,
//!   "DESCRIPTION": "Test node"
//! }
//! ```
//!
//! Encoding walks [`ATTRIBUTE_CODECS`] in order; full and single-attribute
//! encodes share that one path.

use crate::error::NodeError;
use crate::node::{Access, Node};
use crate::path;
use crate::value::{self, OscValue};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Node attributes understood by this implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    FullPath,
    Contents,
    Type,
    Value,
    Access,
    Description,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Self::FullPath,
        Self::Contents,
        Self::Type,
        Self::Value,
        Self::Access,
        Self::Description,
    ];

    /// Wire key of this attribute.
    pub fn key(self) -> &'static str {
        match self {
            Self::FullPath => "FULL_PATH",
            Self::Contents => "CONTENTS",
            Self::Type => "TYPE",
            Self::Value => "VALUE",
            Self::Access => "ACCESS",
            Self::Description => "DESCRIPTION",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returned when a query names an attribute this implementation does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAttribute(pub String);

impl fmt::Display for UnknownAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown attribute {:?}", self.0)
    }
}

impl std::error::Error for UnknownAttribute {}

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.key() == s)
            .ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}

/// One row of the encoding table.
pub struct AttributeCodec {
    pub attribute: Attribute,
    /// Whether the node carries this attribute at all.
    pub present: fn(&Node) -> bool,
    pub encode: fn(&Node) -> Value,
}

/// Encoding table, evaluated in order for every encode.
pub const ATTRIBUTE_CODECS: [AttributeCodec; 6] = [
    AttributeCodec {
        attribute: Attribute::FullPath,
        present: |_| true,
        encode: |node| Value::String(node.full_path().to_string()),
    },
    AttributeCodec {
        attribute: Attribute::Contents,
        present: |node| !node.children().is_empty(),
        encode: encode_contents,
    },
    AttributeCodec {
        attribute: Attribute::Type,
        present: |node| node.type_tags().is_some(),
        encode: |node| Value::String(node.type_tags().unwrap_or_default().to_string()),
    },
    AttributeCodec {
        attribute: Attribute::Value,
        present: |node| node.value().is_some(),
        encode: |node| {
            Value::Array(
                node.value()
                    .unwrap_or_default()
                    .iter()
                    .map(OscValue::to_json)
                    .collect(),
            )
        },
    },
    AttributeCodec {
        attribute: Attribute::Access,
        present: |_| true,
        encode: |node| Value::from(node.access().code()),
    },
    AttributeCodec {
        attribute: Attribute::Description,
        present: |node| node.description().is_some(),
        encode: |node| Value::String(node.description().unwrap_or_default().to_string()),
    },
];

fn encode_contents(node: &Node) -> Value {
    let contents: Map<String, Value> = node
        .children()
        .iter()
        .map(|child| {
            (
                path::last_segment(child.full_path()).to_string(),
                encode(child, None),
            )
        })
        .collect();
    Value::Object(contents)
}

fn codec(attribute: Attribute) -> &'static AttributeCodec {
    // Every attribute has exactly one row.
    &ATTRIBUTE_CODECS[attribute as usize]
}

/// Whether `attribute` may be disclosed for `node`.
///
/// False when the node does not carry the attribute, and for the value of
/// a write-only node.
pub fn is_disclosed(node: &Node, attribute: Attribute) -> bool {
    if attribute == Attribute::Value && node.access() == Access::WriteOnly {
        return false;
    }
    (codec(attribute).present)(node)
}

/// Encode `node` as a wire object.
///
/// With a filter only that attribute is emitted. The filter applies to this
/// node only; children under `CONTENTS` are always encoded in full.
pub fn encode(node: &Node, filter: Option<Attribute>) -> Value {
    let object: Map<String, Value> = ATTRIBUTE_CODECS
        .iter()
        .filter(|c| filter.map_or(true, |f| f == c.attribute))
        .filter(|c| (c.present)(node))
        .map(|c| (c.attribute.key().to_string(), (c.encode)(node)))
        .collect();
    Value::Object(object)
}

/// Decode a wire object into a node, recursing through `CONTENTS`.
pub fn decode(json: &Value) -> Result<Node, NodeError> {
    decode_at(json, None)
}

fn decode_at(json: &Value, inferred_path: Option<String>) -> Result<Node, NodeError> {
    let object = json
        .as_object()
        .ok_or_else(|| NodeError::Malformed(format!("expected a node object, got {}", json)))?;

    // Some peers omit FULL_PATH on nested nodes.
    let full_path = match (object.get(Attribute::FullPath.key()), inferred_path) {
        (Some(Value::String(p)), Some(inferred)) if *p != inferred => {
            return Err(NodeError::Malformed(format!(
                "FULL_PATH {} does not match its CONTENTS entry {}",
                p, inferred
            )))
        }
        (Some(Value::String(p)), _) => p.clone(),
        (Some(other), _) => {
            return Err(NodeError::Malformed(format!(
                "FULL_PATH is not a string: {}",
                other
            )))
        }
        (None, Some(inferred)) => inferred,
        (None, None) => return Err(NodeError::Malformed("missing FULL_PATH".into())),
    };

    let mut children = Vec::new();
    if let Some(contents) = object.get(Attribute::Contents.key()) {
        let contents = contents
            .as_object()
            .ok_or_else(|| NodeError::Malformed(format!("CONTENTS of {} is not an object", full_path)))?;
        for (segment, child) in contents {
            if segment.is_empty() || segment.contains('/') {
                return Err(NodeError::Malformed(format!(
                    "CONTENTS key {:?} of {} is not a path segment",
                    segment, full_path
                )));
            }
            children.push(decode_at(child, Some(path::join(&full_path, segment)))?);
        }
    }

    let access = match object.get(Attribute::Access.key()) {
        None | Some(Value::Null) => Access::NoValue,
        Some(code) => {
            let code = code
                .as_u64()
                .ok_or_else(|| NodeError::Malformed(format!("ACCESS is not an integer: {}", code)))?;
            Access::try_from(code)?
        }
    };

    let description = match object.get(Attribute::Description.key()) {
        None | Some(Value::Null) => None,
        Some(Value::String(d)) => Some(d.clone()),
        Some(other) => {
            return Err(NodeError::Malformed(format!(
                "DESCRIPTION of {} is not a string: {}",
                full_path, other
            )))
        }
    };

    let values = decode_value_attribute(&full_path, object)?;
    // A readable/writable node whose value the peer did not send.
    let values = match values {
        None if access != Access::NoValue => Some(Vec::new()),
        v => v,
    };

    let mut builder = Node::builder(full_path)
        .access(access)
        .children(children);
    if let Some(values) = values {
        builder = builder.values(values);
    }
    if let Some(description) = description {
        builder = builder.description(description);
    }
    builder.build()
}

/// Decode the `VALUE` of a wire object, coerced by its `TYPE` when present.
///
/// `None` when the object carries no `VALUE`.
pub(crate) fn decode_value_attribute(
    full_path: &str,
    object: &Map<String, Value>,
) -> Result<Option<Vec<OscValue>>, NodeError> {
    let kinds = match object.get(Attribute::Type.key()) {
        None | Some(Value::Null) => None,
        Some(Value::String(tags)) => Some(value::parse_type_tags(tags)?),
        Some(other) => {
            return Err(NodeError::Malformed(format!(
                "TYPE of {} is not a string: {}",
                full_path, other
            )))
        }
    };

    match object.get(Attribute::Value.key()) {
        None => Ok(None),
        Some(Value::Array(items)) => decode_values(full_path, items, kinds.as_deref()).map(Some),
        Some(other) => Err(NodeError::Malformed(format!(
            "VALUE of {} is not an array: {}",
            full_path, other
        ))),
    }
}

fn decode_values(
    full_path: &str,
    items: &[Value],
    kinds: Option<&[value::ValueKind]>,
) -> Result<Vec<OscValue>, NodeError> {
    // An empty object stands for "value not known yet".
    if items
        .iter()
        .any(|item| item.as_object().is_some_and(Map::is_empty))
    {
        return Ok(Vec::new());
    }

    match kinds {
        Some(kinds) if !items.is_empty() => {
            if kinds.len() != items.len() {
                return Err(NodeError::Malformed(format!(
                    "{} declares {} type tags but carries {} values",
                    full_path,
                    kinds.len(),
                    items.len()
                )));
            }
            items
                .iter()
                .zip(kinds)
                .map(|(item, kind)| OscValue::from_json_as(item, *kind))
                .collect()
        }
        _ => items.iter().map(OscValue::from_json).collect(),
    }
}

impl Node {
    /// Encode this node; see [`encode`].
    pub fn to_wire(&self, filter: Option<Attribute>) -> Value {
        encode(self, filter)
    }

    /// Decode a node from a wire object; see [`decode`].
    pub fn from_wire(json: &Value) -> Result<Node, NodeError> {
        decode(json)
    }
}
