// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar node values and OSC type-tag mapping.
//!
//! | kind           | encode      | decode            |
//! |----------------|-------------|-------------------|
//! | integer        | `i`         | `i`               |
//! | floating-point | `f`         | `f` `h` `d` `t`   |
//! | boolean        | `T` / `F`   | `T` `F`           |
//! | string         | `s`         | `s`               |

use crate::error::NodeError;
use serde_json::Value;
use std::fmt;

/// Runtime kind of a scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
    Bool,
    String,
}

impl ValueKind {
    /// Map a single OSC type tag to a value kind.
    pub fn from_tag(tag: char) -> Result<Self, NodeError> {
        match tag {
            'i' => Ok(Self::Int),
            'f' | 'h' | 'd' | 't' => Ok(Self::Float),
            'T' | 'F' => Ok(Self::Bool),
            's' => Ok(Self::String),
            other => Err(NodeError::UnknownTypeTag(other)),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "integer",
            Self::Float => "float",
            Self::Bool => "boolean",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// A single element of a node's value sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum OscValue {
    Int(i32),
    Float(f64),
    Bool(bool),
    String(String),
}

impl OscValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Bool(_) => ValueKind::Bool,
            Self::String(_) => ValueKind::String,
        }
    }

    /// OSC type tag for this value. Booleans carry their state in the tag.
    pub fn type_tag(&self) -> char {
        match self {
            Self::Int(_) => 'i',
            Self::Float(_) => 'f',
            Self::Bool(true) => 'T',
            Self::Bool(false) => 'F',
            Self::String(_) => 's',
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(v) => Value::from(*v),
            Self::Float(v) => Value::from(*v),
            Self::Bool(v) => Value::Bool(*v),
            Self::String(v) => Value::String(v.clone()),
        }
    }

    /// Decode a JSON scalar, inferring its kind.
    pub fn from_json(json: &Value) -> Result<Self, NodeError> {
        match json {
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Number(n) => match n.as_i64().and_then(|v| i32::try_from(v).ok()) {
                Some(v) => Ok(Self::Int(v)),
                None => n
                    .as_f64()
                    .map(Self::Float)
                    .ok_or_else(|| NodeError::Malformed(format!("unrepresentable number {}", n))),
            },
            other => Err(NodeError::Malformed(format!(
                "expected a scalar value, got {}",
                other
            ))),
        }
    }

    /// Decode a JSON scalar as the given kind.
    pub fn from_json_as(json: &Value, kind: ValueKind) -> Result<Self, NodeError> {
        let decoded = match kind {
            ValueKind::Int => json
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Self::Int),
            ValueKind::Float => json.as_f64().map(Self::Float),
            ValueKind::Bool => json.as_bool().map(Self::Bool),
            ValueKind::String => json.as_str().map(|s| Self::String(s.to_string())),
        };
        decoded.ok_or_else(|| NodeError::Malformed(format!("{} is not a valid {}", json, kind)))
    }
}

impl From<i32> for OscValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for OscValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for OscValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for OscValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for OscValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for OscValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Type-tag string for a value sequence, one tag per element.
pub fn type_tags(values: &[OscValue]) -> String {
    values.iter().map(OscValue::type_tag).collect()
}

/// Parse a type-tag string into value kinds.
pub fn parse_type_tags(tags: &str) -> Result<Vec<ValueKind>, NodeError> {
    tags.chars().map(ValueKind::from_tag).collect()
}

/// Reject NaN and infinite floats, which have no JSON representation.
pub fn check_finite(path: &str, values: &[OscValue]) -> Result<(), NodeError> {
    match values
        .iter()
        .position(|v| matches!(v, OscValue::Float(f) if !f.is_finite()))
    {
        Some(index) => Err(NodeError::NonFiniteValue {
            path: path.to_string(),
            index,
        }),
        None => Ok(()),
    }
}

/// Kinds of a value sequence, in order.
pub fn kinds(values: &[OscValue]) -> Vec<ValueKind> {
    values.iter().map(OscValue::kind).collect()
}
