// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Routes incoming method invocations to application callbacks.
//!
//! Each handler remembers the value shape of the node it was mapped for and
//! rejects invocations whose arguments do not match it. Packet framing is
//! left to the OSC transport; this module only sees decoded addresses and
//! argument lists.

use crate::address_space::SharedAddressSpace;
use crate::error::NodeError;
use crate::node::Node;
use crate::value::{self, OscValue, ValueKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Application callback: receives the invoked address and its arguments.
pub type MethodCallback = Arc<dyn Fn(&str, &[OscValue]) + Send + Sync>;

/// Dispatch errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("{path} takes {expected} arguments, got {found}")]
    Arity {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {index} should be {expected}, got {found}")]
    TypeMismatch {
        index: usize,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error(transparent)]
    Node(#[from] NodeError),
}

/// A callback bound to one node's value shape.
#[derive(Clone)]
pub struct MethodHandler {
    path: String,
    kinds: Vec<ValueKind>,
    callback: MethodCallback,
}

impl MethodHandler {
    pub fn for_node(node: &Node, callback: MethodCallback) -> Self {
        Self {
            path: node.full_path().to_string(),
            kinds: node.value_kinds(),
            callback,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kinds(&self) -> &[ValueKind] {
        &self.kinds
    }

    /// Check `args` against the node shape, then run the callback.
    pub fn invoke(&self, address: &str, args: &[OscValue]) -> Result<(), DispatchError> {
        if args.len() != self.kinds.len() {
            return Err(DispatchError::Arity {
                path: self.path.clone(),
                expected: self.kinds.len(),
                found: args.len(),
            });
        }

        let found = value::kinds(args);
        if let Some((index, (expected, found))) = self
            .kinds
            .iter()
            .zip(&found)
            .enumerate()
            .find(|(_, (expected, found))| expected != found)
        {
            return Err(DispatchError::TypeMismatch {
                index,
                expected: *expected,
                found: *found,
            });
        }

        (self.callback)(address, args);
        Ok(())
    }
}

impl fmt::Debug for MethodHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandler")
            .field("path", &self.path)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

/// Address-to-handler table.
#[derive(Debug, Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Vec<MethodHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `callback` to the path of `node`.
    ///
    /// When `space` is given the node is inserted there first; a failed
    /// insertion leaves the table unchanged.
    pub fn map_node(
        &mut self,
        node: Node,
        callback: MethodCallback,
        space: Option<&SharedAddressSpace>,
    ) -> Result<(), DispatchError> {
        let handler = MethodHandler::for_node(&node, callback);
        if let Some(space) = space {
            space.write().insert(node)?;
        }

        debug!("Mapped handler at {} ({:?})", handler.path, handler.kinds);
        self.handlers
            .entry(handler.path.clone())
            .or_default()
            .push(handler);
        Ok(())
    }

    /// Invoke every handler mapped at exactly `address`.
    ///
    /// Returns how many callbacks ran. Stops at the first handler that
    /// rejects the arguments.
    pub fn dispatch(&self, address: &str, args: &[OscValue]) -> Result<usize, DispatchError> {
        let Some(handlers) = self.handlers.get(address) else {
            debug!("No handler at {}", address);
            return Ok(0);
        };

        for handler in handlers {
            if let Err(e) = handler.invoke(address, args) {
                warn!("Rejected message to {}: {}", address, e);
                return Err(e);
            }
        }
        Ok(handlers.len())
    }

    pub fn is_mapped(&self, address: &str) -> bool {
        self.handlers.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_space::AddressSpace;
    use crate::node::Access;
    use parking_lot::Mutex;

    fn recorder() -> (MethodCallback, Arc<Mutex<Vec<(String, Vec<OscValue>)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let callback: MethodCallback = Arc::new(move |address: &str, args: &[OscValue]| {
            sink.lock().push((address.to_string(), args.to_vec()));
        });
        (callback, calls)
    }

    fn volume() -> Node {
        Node::builder("/mixer/volume")
            .values([OscValue::Float(0.5), OscValue::Int(1)])
            .access(Access::ReadWrite)
            .build()
            .unwrap()
    }

    #[test]
    fn test_invoke_matching_args() {
        let (callback, calls) = recorder();
        let handler = MethodHandler::for_node(&volume(), callback);
        assert_eq!(handler.kinds(), &[ValueKind::Float, ValueKind::Int]);

        handler
            .invoke("/mixer/volume", &[OscValue::Float(0.8), OscValue::Int(2)])
            .unwrap();

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/mixer/volume");
        assert_eq!(calls[0].1, vec![OscValue::Float(0.8), OscValue::Int(2)]);
    }

    #[test]
    fn test_invoke_wrong_arity() {
        let (callback, calls) = recorder();
        let handler = MethodHandler::for_node(&volume(), callback);

        let err = handler
            .invoke("/mixer/volume", &[OscValue::Float(0.8)])
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::Arity {
                path: "/mixer/volume".into(),
                expected: 2,
                found: 1,
            }
        );
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_invoke_wrong_kind() {
        let (callback, calls) = recorder();
        let handler = MethodHandler::for_node(&volume(), callback);

        let err = handler
            .invoke("/mixer/volume", &[OscValue::Float(0.8), OscValue::Bool(true)])
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::TypeMismatch {
                index: 1,
                expected: ValueKind::Int,
                found: ValueKind::Bool,
            }
        );
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_dispatch_unmapped() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.dispatch("/nowhere", &[]).unwrap(), 0);
    }

    #[test]
    fn test_map_node_inserts_into_space() {
        let space = AddressSpace::new().into_shared();
        let mut dispatcher = Dispatcher::new();
        let (callback, calls) = recorder();

        dispatcher
            .map_node(volume(), callback.clone(), Some(&space))
            .unwrap();
        assert!(space.read().find("/mixer/volume").is_some());
        assert!(space.read().find("/mixer").is_some());

        // Second handler at the same path, table only.
        let extra = Node::builder("/mixer/volume")
            .values([OscValue::Float(0.0), OscValue::Int(0)])
            .access(Access::WriteOnly)
            .build()
            .unwrap();
        dispatcher.map_node(extra, callback, None).unwrap();
        assert_eq!(dispatcher.len(), 2);

        let invoked = dispatcher
            .dispatch("/mixer/volume", &[OscValue::Float(1.0), OscValue::Int(3)])
            .unwrap();
        assert_eq!(invoked, 2);
        assert_eq!(calls.lock().len(), 2);
    }

    #[test]
    fn test_map_node_duplicate_insert_fails() {
        let space = AddressSpace::new().into_shared();
        let mut dispatcher = Dispatcher::new();
        let (callback, _) = recorder();

        dispatcher
            .map_node(volume(), callback.clone(), Some(&space))
            .unwrap();
        let err = dispatcher
            .map_node(volume(), callback, Some(&space))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Node(NodeError::DuplicatePath(_))));
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn test_dispatch_rejects_bad_args() {
        let mut dispatcher = Dispatcher::new();
        let (callback, calls) = recorder();
        dispatcher.map_node(volume(), callback, None).unwrap();

        assert!(dispatcher
            .dispatch("/mixer/volume", &[OscValue::from("loud"), OscValue::Int(1)])
            .is_err());
        assert!(calls.lock().is_empty());
    }
}
