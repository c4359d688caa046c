//! The permission gate: may the bot act in this channel at all?

use herald_types::{permissions::REQUIRED_TO_ACT, Message};

use crate::client::ChatClient;

/// Whether the bot is permitted to act on `message`.
///
/// Direct message channels are always permitted; no permission object
/// exists there. In guild channels the bot's own membership is resolved
/// (fetched if uncached) and its effective permissions must include
/// {view-channel, send-messages}, counting grants from any applicable
/// rule, not only explicit ones. Unresolvable membership denies.
///
/// Denial is silent by design: no event, no error, dispatch just stops.
pub async fn can_act_in(client: &dyn ChatClient, message: &Message) -> bool {
    let Some(guild) = message.guild_id() else {
        return true;
    };

    match client.own_permissions(guild, &message.channel).await {
        Some(view) => {
            let allowed = view.has(REQUIRED_TO_ACT, false);
            if !allowed {
                tracing::debug!(
                    guild = %guild,
                    channel = %message.channel,
                    "missing view/send permissions, ignoring message"
                );
            }
            allowed
        }
        None => {
            tracing::debug!(
                guild = %guild,
                channel = %message.channel,
                "own membership unresolvable, ignoring message"
            );
            false
        }
    }
}
