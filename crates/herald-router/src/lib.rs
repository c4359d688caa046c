//! Message-to-command routing for chat platforms.
//!
//! The router sits between the platform gateway and the command layer:
//! an inbound message passes the permission gate, then the prefix
//! resolution pipeline (mention, then pattern, then dynamically fetched
//! prefixes, strict precedence), and a `prefixed_message` event is
//! emitted for downstream command matching. Bare-mention messages emit
//! `mention_prefix_only` instead.
//!
//! This crate is the application-facing surface; it re-exports the
//! listener bus and the precondition evaluator.

pub mod client;
pub mod gate;
pub mod handler;
pub mod prefix;

pub use client::ChatClient;
pub use gate::can_act_in;
pub use handler::Router;
pub use prefix::{
    PrefixCandidates, PrefixProvider, PrefixResolver, Resolution, ResolvedPrefix,
    StaticPrefixProvider,
};

pub use herald_listener as listener;
pub use herald_precondition as precondition;
pub use herald_types as types;
