//! The message-event handler tying the pipeline together.
//!
//! Gate, then prefix resolution, then a downstream event: bare mentions
//! emit `mention_prefix_only`, matched prefixes emit `prefixed_message`.
//! Gated-out and prefix-less messages stop silently.

use std::sync::Arc;

use herald_listener::{EventBus, Listener, ListenerSet};
use herald_types::{DispatchEvent, Message};

use crate::client::ChatClient;
use crate::prefix::{PrefixProvider, PrefixResolver, Resolution};

/// Routes inbound message events into downstream dispatch events.
pub struct Router<P> {
    client: Arc<dyn ChatClient>,
    resolver: PrefixResolver<P>,
    bus: Arc<EventBus>,
}

impl<P: PrefixProvider + 'static> Router<P> {
    pub fn new(client: Arc<dyn ChatClient>, provider: P, bus: Arc<EventBus>) -> Self {
        Self {
            client,
            resolver: PrefixResolver::new(provider),
            bus,
        }
    }

    /// The bus downstream events are emitted on.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Run the full pipeline for one inbound message.
    pub async fn handle_message(&self, message: Message) {
        if !crate::gate::can_act_in(self.client.as_ref(), &message).await {
            return;
        }

        let bot_id = self.client.bot_id();
        match self.resolver.resolve(bot_id.as_ref(), &message).await {
            Resolution::MentionOnly => {
                self.bus
                    .emit(DispatchEvent::MentionPrefixOnly { message })
                    .await;
            }
            Resolution::Prefix(prefix) => {
                self.bus
                    .emit(DispatchEvent::PrefixedMessage {
                        prefix: prefix.as_str().to_string(),
                        message,
                    })
                    .await;
            }
            Resolution::None => {}
        }
    }

    /// Load this router as the `message` listener on `set`.
    ///
    /// The handler is error-isolated like any other listener, though the
    /// pipeline itself reports failures as silence rather than errors.
    pub fn install(self: Arc<Self>, set: &ListenerSet) {
        let router = Arc::clone(&self);
        set.load(Listener::new(
            "command-router",
            "message",
            Arc::new(move |event| {
                let router = Arc::clone(&router);
                Box::pin(async move {
                    if let DispatchEvent::Message { message } = event {
                        router.handle_message(message).await;
                    }
                    Ok(())
                })
            }),
        ));
    }
}
