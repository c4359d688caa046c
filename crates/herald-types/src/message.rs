//! The inbound message model consumed by the dispatch pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, GuildId, UserId};

/// Where a message arrived from the platform's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// A direct/private message channel. No permission object exists here.
    Direct,
    /// A channel inside a guild, identified by the guild it belongs to.
    Guild(GuildId),
}

/// An inbound chat message as delivered by the platform gateway.
///
/// Only the fields the dispatch core inspects are modeled; rich content
/// (attachments, embeds, reactions) stays with the external client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Raw message text, byte-for-byte as received. Prefix checks run
    /// against this without trimming or normalization.
    pub content: String,
    /// The author of the message.
    pub author: UserId,
    /// The channel the message arrived in.
    pub channel: ChannelId,
    /// Direct or guild origin.
    pub kind: ChannelKind,
    /// Whether the channel is marked age-restricted.
    #[serde(default)]
    pub nsfw: bool,
    /// Platform timestamp of the message.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a guild message with the current timestamp.
    pub fn guild(
        content: impl Into<String>,
        author: impl Into<UserId>,
        channel: impl Into<ChannelId>,
        guild: impl Into<GuildId>,
    ) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
            channel: channel.into(),
            kind: ChannelKind::Guild(guild.into()),
            nsfw: false,
            timestamp: Utc::now(),
        }
    }

    /// Create a direct message with the current timestamp.
    pub fn direct(
        content: impl Into<String>,
        author: impl Into<UserId>,
        channel: impl Into<ChannelId>,
    ) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
            channel: channel.into(),
            kind: ChannelKind::Direct,
            nsfw: false,
            timestamp: Utc::now(),
        }
    }

    /// Mark the channel as age-restricted.
    pub fn with_nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = nsfw;
        self
    }

    /// The guild this message belongs to, if any.
    pub fn guild_id(&self) -> Option<&GuildId> {
        match &self.kind {
            ChannelKind::Guild(id) => Some(id),
            ChannelKind::Direct => None,
        }
    }

    /// Whether this message arrived in a direct message channel.
    pub fn is_direct(&self) -> bool {
        matches!(self.kind, ChannelKind::Direct)
    }
}
