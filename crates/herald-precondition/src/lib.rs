//! Named precondition registry and the recursive And/Or tree evaluator.
//!
//! A command declares a [`PreconditionNode`] tree; before the command runs,
//! [`evaluate`] walks the tree against a live [`PreconditionRegistry`].
//! Names bind late: a `Single` leaf resolves its predicate at evaluation
//! time, so redefining a registered precondition takes effect for every
//! later evaluation without rebuilding trees.

pub mod builtin;
pub mod evaluate;
pub mod node;
pub mod registry;
pub mod verdict;

pub use evaluate::evaluate;
pub use node::{merge_context, Context, PreconditionNode};
pub use registry::{Command, MemoryRegistry, Precondition, PreconditionRegistry};
pub use verdict::Verdict;
