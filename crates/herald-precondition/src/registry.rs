//! The precondition trait and the in-memory name registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use herald_types::Message;

use crate::node::{Context, PreconditionNode};
use crate::verdict::Verdict;

/// A command as seen by the precondition layer: its name and the tree
/// gating it. How the name was matched from the message is upstream of
/// this crate and not modeled here.
#[derive(Debug, Clone)]
pub struct Command {
    /// Canonical command name.
    pub name: String,
    /// The precondition tree evaluated before invocation.
    pub preconditions: PreconditionNode,
}

impl Command {
    /// A command with an empty (vacuously passing) precondition tree.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preconditions: PreconditionNode::all(Vec::new()),
        }
    }

    /// Attach a precondition tree.
    pub fn with_preconditions(mut self, node: PreconditionNode) -> Self {
        self.preconditions = node;
        self
    }
}

/// A named boolean check gating command execution. May suspend.
#[async_trait]
pub trait Precondition: Send + Sync {
    /// Run the check. Any non-pass outcome is treated as a fail by the
    /// evaluator; only an unresolvable name is an error.
    async fn run(&self, message: &Message, command: &Command, context: &Context) -> Verdict;
}

/// Resolves precondition names to implementations.
///
/// The evaluator takes this as an explicit argument so it has no hidden
/// global dependency and can be tested with a fake registry.
pub trait PreconditionRegistry: Send + Sync {
    /// Look up a precondition by name. `None` means the name is
    /// unregistered, which the evaluator treats as fatal.
    fn get(&self, name: &str) -> Option<Arc<dyn Precondition>>;
}

/// In-memory registry keyed by name.
///
/// Registration may happen at any time, including between tree
/// construction and evaluation; in-flight evaluations are not coordinated
/// with mutation and may observe either the old or the new definition.
#[derive(Default)]
pub struct MemoryRegistry {
    entries: RwLock<HashMap<String, Arc<dyn Precondition>>>,
}

impl MemoryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a precondition under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, precondition: Arc<dyn Precondition>) {
        let name = name.into();
        tracing::debug!(precondition = %name, "registering precondition");
        self.write_entries().insert(name, precondition);
    }

    /// Register a synchronous closure as a precondition. Convenient for
    /// simple checks and for test spies.
    pub fn register_fn<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&Message, &Command, &Context) -> Verdict + Send + Sync + 'static,
    {
        self.register(name, Arc::new(FnPrecondition(f)));
    }

    /// Remove a precondition by name. Later lookups fail fatally.
    pub fn unregister(&self, name: &str) {
        self.write_entries().remove(name);
    }

    // Lock poisoning cannot leave the map in a partial state (plain
    // inserts/removes), so a poisoned lock is recovered rather than
    // propagated.
    fn write_entries(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<dyn Precondition>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl PreconditionRegistry for MemoryRegistry {
    fn get(&self, name: &str) -> Option<Arc<dyn Precondition>> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }
}

/// Adapter wrapping a synchronous closure as a [`Precondition`].
struct FnPrecondition<F>(F);

#[async_trait]
impl<F> Precondition for FnPrecondition<F>
where
    F: Fn(&Message, &Command, &Context) -> Verdict + Send + Sync,
{
    async fn run(&self, message: &Message, command: &Command, context: &Context) -> Verdict {
        (self.0)(message, command, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_and_resolve() {
        let registry = MemoryRegistry::new();
        registry.register_fn("always", |_, _, _| Verdict::pass());

        let precondition = registry.get("always").expect("registered name resolves");
        let msg = Message::direct("hi", "1", "100");
        let command = Command::new("ping");
        let verdict = precondition.run(&msg, &command, &Context::new()).await;
        assert!(verdict.is_pass());
    }

    #[test]
    fn unregistered_name_is_absent() {
        let registry = MemoryRegistry::new();
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn redefinition_replaces_entry() {
        let registry = MemoryRegistry::new();
        registry.register_fn("check", |_, _, _| Verdict::pass());
        registry.register_fn("check", |_, _, _| Verdict::fail("redefined"));
        registry.register_fn("gone", |_, _, _| Verdict::pass());
        registry.unregister("gone");
        assert!(registry.get("check").is_some());
        assert!(registry.get("gone").is_none());
    }
}
