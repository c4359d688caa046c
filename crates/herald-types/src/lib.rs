//! Core types shared across all Herald crates.
//!
//! Defines the inbound message model, strongly-typed platform identifiers,
//! permission bitfields, dispatch events, configuration, and error types
//! used by the router, precondition evaluator, and listener bus.

pub mod config;
pub mod error;
pub mod event;
pub mod ids;
pub mod message;
pub mod permissions;

pub use config::RouterConfig;
pub use error::DispatchError;
pub use event::DispatchEvent;
pub use ids::{ChannelId, GuildId, UserId};
pub use message::{ChannelKind, Message};
pub use permissions::{PermissionView, Permissions};
