//! Built-in preconditions shipped with the registry.
//!
//! These cover the common gating needs of a chat bot: restricting a
//! command to guilds or DMs, to age-restricted channels, to configured
//! owners, or throttling per-user invocation rate. Applications register
//! their own preconditions alongside these under any names they like.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use herald_types::{Message, RouterConfig, UserId};

use crate::node::Context;
use crate::registry::{Command, MemoryRegistry, Precondition};
use crate::verdict::Verdict;

/// Default cooldown window when the node context does not override it.
const DEFAULT_COOLDOWN_SECS: u64 = 3;

/// Context key the cooldown builtin reads its window from.
pub const WINDOW_SECS_KEY: &str = "window_secs";

/// Register all built-in preconditions on `registry`.
///
/// Names: `guild_only`, `dm_only`, `nsfw`, `owner_only`, `cooldown`.
pub fn register_builtins(registry: &MemoryRegistry, config: &RouterConfig) {
    registry.register("guild_only", Arc::new(GuildOnly));
    registry.register("dm_only", Arc::new(DmOnly));
    registry.register("nsfw", Arc::new(Nsfw));
    registry.register(
        "owner_only",
        Arc::new(OwnerOnly {
            owners: config.owners.clone(),
        }),
    );
    registry.register("cooldown", Arc::new(Cooldown::default()));
}

/// Passes only for messages arriving in a guild channel.
pub struct GuildOnly;

#[async_trait]
impl Precondition for GuildOnly {
    async fn run(&self, message: &Message, _command: &Command, _context: &Context) -> Verdict {
        if message.guild_id().is_some() {
            Verdict::pass()
        } else {
            Verdict::fail("command is only available in guilds")
        }
    }
}

/// Passes only for direct messages.
pub struct DmOnly;

#[async_trait]
impl Precondition for DmOnly {
    async fn run(&self, message: &Message, _command: &Command, _context: &Context) -> Verdict {
        if message.is_direct() {
            Verdict::pass()
        } else {
            Verdict::fail("command is only available in direct messages")
        }
    }
}

/// Passes only in age-restricted channels.
pub struct Nsfw;

#[async_trait]
impl Precondition for Nsfw {
    async fn run(&self, message: &Message, _command: &Command, _context: &Context) -> Verdict {
        if message.nsfw {
            Verdict::pass()
        } else {
            Verdict::fail("command is only available in age-restricted channels")
        }
    }
}

/// Passes only for authors in the configured owner set.
pub struct OwnerOnly {
    /// Owner ids, taken from [`RouterConfig::owners`].
    pub owners: Vec<UserId>,
}

#[async_trait]
impl Precondition for OwnerOnly {
    async fn run(&self, message: &Message, _command: &Command, _context: &Context) -> Verdict {
        if self.owners.contains(&message.author) {
            Verdict::pass()
        } else {
            Verdict::fail_silent()
        }
    }
}

/// Per-user fixed-window throttle, keyed by (command, author).
///
/// The window defaults to [`DEFAULT_COOLDOWN_SECS`] and can be overridden
/// per command through the node context key [`WINDOW_SECS_KEY`].
pub struct Cooldown {
    /// Expiry deadline per (command, author). Expired entries are pruned
    /// on every check so the map stays bounded by active cooldowns.
    deadlines: Mutex<HashMap<(String, UserId), Instant>>,
}

impl Default for Cooldown {
    fn default() -> Self {
        Self {
            deadlines: Mutex::new(HashMap::new()),
        }
    }
}

impl Cooldown {
    fn window(context: &Context) -> Duration {
        let secs = context
            .get(WINDOW_SECS_KEY)
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_COOLDOWN_SECS);
        Duration::from_secs(secs)
    }

    /// Check and record one invocation at `now`. Separate from `run` so
    /// tests can drive the clock instead of sleeping.
    fn check(&self, key: (String, UserId), window: Duration, now: Instant) -> Verdict {
        let mut deadlines = self.deadlines.lock().unwrap_or_else(|e| e.into_inner());
        deadlines.retain(|_, expiry| *expiry > now);

        match deadlines.get(&key) {
            Some(expiry) => {
                let remaining = *expiry - now;
                Verdict::fail(format!(
                    "on cooldown for another {}s",
                    remaining.as_secs().max(1)
                ))
            }
            None => {
                deadlines.insert(key, now + window);
                Verdict::pass()
            }
        }
    }
}

#[async_trait]
impl Precondition for Cooldown {
    async fn run(&self, message: &Message, command: &Command, context: &Context) -> Verdict {
        let window = Self::window(context);
        let key = (command.name.clone(), message.author.clone());
        self.check(key, window, Instant::now())
    }
}
