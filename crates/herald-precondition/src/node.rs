//! The precondition tree: a tagged union with one leaf and two composites.
//!
//! `Single` holds a registry name plus node-local context; `And` and `Or`
//! hold ordered children. A tree never owns predicate implementations,
//! only names: resolution happens at evaluation time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key/value context attached to precondition runs.
pub type Context = HashMap<String, serde_json::Value>;

/// One node of a precondition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreconditionNode {
    /// A named check. `name` resolves against the registry when the tree
    /// is evaluated, not when it is built.
    Single {
        name: String,
        #[serde(default)]
        context: Context,
    },
    /// Passes only if every child passes, in order. Empty passes vacuously.
    And { children: Vec<PreconditionNode> },
    /// Passes if any child passes, in order. Empty fails vacuously.
    Or { children: Vec<PreconditionNode> },
}

impl PreconditionNode {
    /// A leaf referencing a registered precondition by name.
    pub fn single(name: impl Into<String>) -> Self {
        PreconditionNode::Single {
            name: name.into(),
            context: Context::new(),
        }
    }

    /// A leaf with node-local context attached.
    pub fn single_with(name: impl Into<String>, context: Context) -> Self {
        PreconditionNode::Single {
            name: name.into(),
            context,
        }
    }

    /// An `And` composite over the given children.
    pub fn all(children: Vec<PreconditionNode>) -> Self {
        PreconditionNode::And { children }
    }

    /// An `Or` composite over the given children.
    pub fn any(children: Vec<PreconditionNode>) -> Self {
        PreconditionNode::Or { children }
    }
}

/// Merge the caller-supplied context with a node's own context.
///
/// Starts from `caller`, then overwrites any key also present in `node`
/// with the node's value, so node-local values win on collision. A node can
/// therefore shadow caller-provided keys; that precedence is part of the
/// contract.
pub fn merge_context(caller: &Context, node: &Context) -> Context {
    let mut merged = caller.clone();
    for (key, value) in node {
        merged.insert(key.clone(), value.clone());
    }
    merged
}
