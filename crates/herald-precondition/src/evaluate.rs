//! Recursive evaluation of a precondition tree.
//!
//! One function switching on the node tag. Composites await children
//! strictly one at a time so short-circuiting reliably skips the side
//! effects of later children.

use std::future::Future;
use std::pin::Pin;

use herald_types::{DispatchError, Message};

use crate::node::{merge_context, Context, PreconditionNode};
use crate::registry::{Command, PreconditionRegistry};
use crate::verdict::Verdict;

/// Evaluate `node` against the live registry.
///
/// Returns `Ok(Verdict)` for the normal pass/fail outcomes. An
/// unregistered name in any `Single` leaf is a wiring bug and returns
/// `Err(DispatchError::UnknownPrecondition)` immediately, cutting through
/// any enclosing composite.
pub async fn evaluate(
    node: &PreconditionNode,
    registry: &dyn PreconditionRegistry,
    message: &Message,
    command: &Command,
    caller_context: &Context,
) -> Result<Verdict, DispatchError> {
    evaluate_inner(node, registry, message, command, caller_context).await
}

// Boxed so the async recursion has a known size.
fn evaluate_inner<'a>(
    node: &'a PreconditionNode,
    registry: &'a dyn PreconditionRegistry,
    message: &'a Message,
    command: &'a Command,
    caller_context: &'a Context,
) -> Pin<Box<dyn Future<Output = Result<Verdict, DispatchError>> + Send + 'a>> {
    Box::pin(async move {
        match node {
            PreconditionNode::Single { name, context } => {
                let Some(precondition) = registry.get(name) else {
                    tracing::error!(
                        precondition = %name,
                        command = %command.name,
                        "precondition tree references an unregistered name"
                    );
                    return Err(DispatchError::UnknownPrecondition(name.clone()));
                };
                let merged = merge_context(caller_context, context);
                let verdict = precondition.run(message, command, &merged).await;
                tracing::debug!(
                    precondition = %name,
                    command = %command.name,
                    pass = verdict.is_pass(),
                    "precondition evaluated"
                );
                Ok(verdict)
            }
            PreconditionNode::And { children } => {
                for child in children {
                    let verdict =
                        evaluate_inner(child, registry, message, command, caller_context).await?;
                    if !verdict.is_pass() {
                        return Ok(verdict);
                    }
                }
                Ok(Verdict::pass())
            }
            PreconditionNode::Or { children } => {
                let mut last_fail = Verdict::fail_silent();
                for child in children {
                    let verdict =
                        evaluate_inner(child, registry, message, command, caller_context).await?;
                    if verdict.is_pass() {
                        return Ok(verdict);
                    }
                    last_fail = verdict;
                }
                Ok(last_fail)
            }
        }
    })
}
