//! The seam to the underlying chat-platform client.
//!
//! Connection, gateway, and REST concerns stay with the real client;
//! the router only needs the bot's own identity and a per-channel
//! permission view.

use async_trait::async_trait;

use herald_types::{ChannelId, GuildId, PermissionView, UserId};

/// What the router needs from the platform client.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// The bot's own user id, once known. `None` before the gateway has
    /// identified; mention detection is skipped until then.
    fn bot_id(&self) -> Option<UserId>;

    /// Resolve the bot's own permission view for a guild channel,
    /// fetching its guild membership if not cached.
    ///
    /// `None` means the membership could not be resolved; the gate
    /// treats that as a denial.
    async fn own_permissions(
        &self,
        guild: &GuildId,
        channel: &ChannelId,
    ) -> Option<Box<dyn PermissionView + Send>>;
}
