//! Event bus and listener lifecycle for the Herald dispatch core.
//!
//! [`EventBus`] is a named-event publish/subscribe source with
//! `on`/`once`/`off`/`emit` semantics and sequential async delivery.
//! [`ListenerSet`] manages loadable listener pieces on top of it: each
//! handler is wrapped so its failures become `listener_error` events
//! instead of propagating, and `once` listeners self-unload after their
//! single firing.

pub mod bus;
pub mod listener;

pub use bus::{EventBus, Handler, HandlerFuture, ListenerId};
pub use listener::{Listener, ListenerDescriptor, ListenerSet};
