//! Dispatch events flowing through the listener bus.
//!
//! Each variant is one event the core consumes or produces. The enum is
//! serialized to JSON with `snake_case` variant names, matching the event
//! name strings listeners subscribe under.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Events consumed or produced by the dispatch core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DispatchEvent {
    /// An inbound platform message (input to the pipeline).
    Message { message: Message },

    /// The message was exactly the bare bot mention with nothing after it.
    /// No prefix is resolved; downstream typically replies with help text.
    MentionPrefixOnly { message: Message },

    /// A prefix matched; carries the message and the resolved prefix text.
    /// Command-name matching happens downstream of this event.
    PrefixedMessage { message: Message, prefix: String },

    /// A listener handler failed. Emitted by the lifecycle wrapper instead
    /// of propagating the error; carries the listener's identity. The
    /// `event` field names the event the failing listener was subscribed
    /// to; it is serialized as `source_event` because the enum's own tag
    /// already occupies the `event` key.
    ListenerError {
        error: String,
        name: String,
        #[serde(rename = "source_event")]
        event: String,
        path: String,
    },
}

impl DispatchEvent {
    /// The canonical event name listeners subscribe under.
    pub fn event_name(&self) -> &'static str {
        match self {
            DispatchEvent::Message { .. } => "message",
            DispatchEvent::MentionPrefixOnly { .. } => "mention_prefix_only",
            DispatchEvent::PrefixedMessage { .. } => "prefixed_message",
            DispatchEvent::ListenerError { .. } => "listener_error",
        }
    }
}
