//! Prefix resolution: mention, then pattern, then dynamic prefixes.
//!
//! Resolution runs per message, first match wins, no fallthrough once a
//! tier matches. All literal checks are exact byte-wise `starts_with`
//! tests: no trimming, no case folding, no Unicode normalization.

use async_trait::async_trait;
use regex::Regex;

use herald_types::{Message, RouterConfig, UserId};

/// Marker opening a mention token.
const MENTION_OPEN: &str = "<@";

/// Marker closing a mention token.
const MENTION_CLOSE: u8 = b'>';

/// Marker for the nickname mention form, directly after the open marker.
const NICKNAME_MARKER: u8 = b'!';

/// Shortest text that can contain a mention token. Platform ids are long
/// enough that anything shorter cannot hold `<@id>`.
const MIN_MENTION_LEN: usize = 20;

/// A prefix candidate value fetched from the external provider:
/// one literal, or an ordered list tried first-to-last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixCandidates {
    One(String),
    Many(Vec<String>),
}

impl PrefixCandidates {
    fn iter(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            PrefixCandidates::One(s) => std::slice::from_ref(s),
            PrefixCandidates::Many(list) => list.as_slice(),
        };
        slice.iter().map(String::as_str)
    }
}

impl From<&str> for PrefixCandidates {
    fn from(s: &str) -> Self {
        PrefixCandidates::One(s.to_string())
    }
}

impl From<Vec<String>> for PrefixCandidates {
    fn from(list: Vec<String>) -> Self {
        PrefixCandidates::Many(list)
    }
}

/// The client options surface the resolver reads prefixes from.
#[async_trait]
pub trait PrefixProvider: Send + Sync {
    /// Compiled pattern prefix, if one is configured. The tier applies
    /// only when the pattern matches at the start of the message; the
    /// resolved prefix then carries the pattern source verbatim, and
    /// full application to the text happens downstream.
    fn regex_prefix(&self) -> Option<&Regex>;

    /// Fetch the dynamic prefix value for this message. `None` means no
    /// dynamic prefix applies. May suspend (per-guild lookups usually
    /// hit a database or cache).
    async fn fetch_prefix(&self, message: &Message) -> Option<PrefixCandidates>;
}

/// Provider backed by static [`RouterConfig`] values.
pub struct StaticPrefixProvider {
    prefixes: Vec<String>,
    regex: Option<Regex>,
}

impl StaticPrefixProvider {
    /// Build from config, compiling the pattern prefix once.
    pub fn from_config(config: &RouterConfig) -> Result<Self, regex::Error> {
        let regex = config.regex_prefix.as_deref().map(Regex::new).transpose()?;
        Ok(Self {
            prefixes: config.prefixes.clone(),
            regex,
        })
    }
}

#[async_trait]
impl PrefixProvider for StaticPrefixProvider {
    fn regex_prefix(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }

    async fn fetch_prefix(&self, _message: &Message) -> Option<PrefixCandidates> {
        if self.prefixes.is_empty() {
            None
        } else {
            Some(PrefixCandidates::Many(self.prefixes.clone()))
        }
    }
}

/// A prefix resolved for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPrefix {
    /// The full mention token from the start of the message.
    Mention(String),
    /// The configured pattern, passed through verbatim.
    Pattern(String),
    /// A literal prefix the message starts with.
    Literal(String),
}

impl ResolvedPrefix {
    /// The textual form carried on the `prefixed_message` event.
    pub fn as_str(&self) -> &str {
        match self {
            ResolvedPrefix::Mention(s)
            | ResolvedPrefix::Pattern(s)
            | ResolvedPrefix::Literal(s) => s,
        }
    }
}

/// Outcome of resolving one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A prefix applies; the message is a command invocation.
    Prefix(ResolvedPrefix),
    /// The message is exactly the bare bot mention: no prefix, the
    /// distinct mention-only signal fires instead.
    MentionOnly,
    /// No prefix applies; the message is not a command invocation.
    None,
}

/// Resolves which prefix, if any, applies to a message.
pub struct PrefixResolver<P> {
    provider: P,
}

impl<P: PrefixProvider> PrefixResolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Resolve the prefix for `message`. Call only after the permission
    /// gate has passed.
    ///
    /// Precedence: mention (only when `bot_id` is known), then the
    /// configured pattern, then dynamically fetched prefixes.
    pub async fn resolve(&self, bot_id: Option<&UserId>, message: &Message) -> Resolution {
        if let Some(bot_id) = bot_id {
            match mention_prefix(bot_id, &message.content) {
                MentionMatch::Prefix(token) => {
                    tracing::debug!(channel = %message.channel, "mention prefix matched");
                    return Resolution::Prefix(ResolvedPrefix::Mention(token));
                }
                MentionMatch::MentionOnly => {
                    tracing::debug!(channel = %message.channel, "bare mention, no command text");
                    return Resolution::MentionOnly;
                }
                MentionMatch::None => {}
            }
        }

        if let Some(pattern) = self.provider.regex_prefix() {
            if pattern
                .find(&message.content)
                .is_some_and(|m| m.start() == 0)
            {
                return Resolution::Prefix(ResolvedPrefix::Pattern(pattern.as_str().to_string()));
            }
        }

        if let Some(candidates) = self.provider.fetch_prefix(message).await {
            for candidate in candidates.iter() {
                if message.content.starts_with(candidate) {
                    return Resolution::Prefix(ResolvedPrefix::Literal(candidate.to_string()));
                }
            }
        }

        Resolution::None
    }
}

enum MentionMatch {
    Prefix(String),
    MentionOnly,
    None,
}

/// Detect a mention of `bot_id` at the start of `content`.
///
/// The token must be `<@id>` or the nickname form `<@!id>`, with the
/// close marker exactly at `offset + id.len()` and the id substring
/// byte-for-byte equal to the bot's id. A message consisting of nothing
/// but the token is mention-only.
fn mention_prefix(bot_id: &UserId, content: &str) -> MentionMatch {
    let bytes = content.as_bytes();
    if bytes.len() < MIN_MENTION_LEN || !content.starts_with(MENTION_OPEN) {
        return MentionMatch::None;
    }

    let offset = if bytes.get(MENTION_OPEN.len()) == Some(&NICKNAME_MARKER) {
        MENTION_OPEN.len() + 1
    } else {
        MENTION_OPEN.len()
    };

    let id = bot_id.as_str();
    let close_at = offset + id.len();
    if bytes.get(close_at) != Some(&MENTION_CLOSE) {
        return MentionMatch::None;
    }
    if &bytes[offset..close_at] != id.as_bytes() {
        return MentionMatch::None;
    }

    let token_len = close_at + 1;
    if content.len() == token_len {
        MentionMatch::MentionOnly
    } else {
        MentionMatch::Prefix(content[..token_len].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_ID: &str = "123456789012345678";

    fn id() -> UserId {
        UserId::new(BOT_ID)
    }

    fn resolver(config: RouterConfig) -> PrefixResolver<StaticPrefixProvider> {
        PrefixResolver::new(StaticPrefixProvider::from_config(&config).unwrap())
    }

    fn msg(content: &str) -> Message {
        Message::guild(content, "1", "100", "900")
    }

    #[tokio::test]
    async fn plain_mention_prefix_matches() {
        let r = resolver(RouterConfig::default());
        let content = format!("<@{BOT_ID}> help");
        let resolution = r.resolve(Some(&id()), &msg(&content)).await;
        assert_eq!(
            resolution,
            Resolution::Prefix(ResolvedPrefix::Mention(format!("<@{BOT_ID}>")))
        );
    }

    #[tokio::test]
    async fn nickname_mention_prefix_matches() {
        let r = resolver(RouterConfig::default());
        let content = format!("<@!{BOT_ID}> help");
        let resolution = r.resolve(Some(&id()), &msg(&content)).await;
        assert_eq!(
            resolution,
            Resolution::Prefix(ResolvedPrefix::Mention(format!("<@!{BOT_ID}>")))
        );
    }

    #[tokio::test]
    async fn bare_mention_is_mention_only() {
        let r = resolver(RouterConfig::default());
        let content = format!("<@{BOT_ID}>");
        let resolution = r.resolve(Some(&id()), &msg(&content)).await;
        assert_eq!(resolution, Resolution::MentionOnly);
    }

    #[tokio::test]
    async fn mention_with_trailing_space_is_a_prefix() {
        // Content is one byte longer than the token, so this is a real
        // (if empty) command invocation, not mention-only.
        let r = resolver(RouterConfig::default());
        let content = format!("<@{BOT_ID}> ");
        let resolution = r.resolve(Some(&id()), &msg(&content)).await;
        assert_eq!(
            resolution,
            Resolution::Prefix(ResolvedPrefix::Mention(format!("<@{BOT_ID}>")))
        );
    }

    #[tokio::test]
    async fn missing_close_marker_falls_through() {
        let r = resolver(RouterConfig::with_prefix("<"));
        let content = format!("<@{BOT_ID}] help");
        let resolution = r.resolve(Some(&id()), &msg(&content)).await;
        assert_eq!(
            resolution,
            Resolution::Prefix(ResolvedPrefix::Literal("<".to_string())),
            "broken mention must fall through to the dynamic tier"
        );
    }

    #[tokio::test]
    async fn wrong_id_falls_through() {
        let r = resolver(RouterConfig::default());
        let content = "<@999999999999999999> help";
        let resolution = r.resolve(Some(&id()), &msg(content)).await;
        assert_eq!(resolution, Resolution::None);
    }

    #[tokio::test]
    async fn mention_requires_known_bot_id() {
        let r = resolver(RouterConfig::default());
        let content = format!("<@{BOT_ID}> help");
        let resolution = r.resolve(None, &msg(&content)).await;
        assert_eq!(resolution, Resolution::None);
    }

    #[tokio::test]
    async fn short_message_skips_mention_detection() {
        let r = resolver(RouterConfig::default());
        let resolution = r.resolve(Some(&UserId::new("123")), &msg("<@123> hi")).await;
        assert_eq!(resolution, Resolution::None, "below the minimum mention length");
    }

    #[tokio::test]
    async fn mention_wins_over_pattern_and_dynamic() {
        let config = RouterConfig {
            prefixes: vec!["<".to_string()],
            regex_prefix: Some("^<".to_string()),
            owners: vec![],
        };
        let r = resolver(config);
        let content = format!("<@{BOT_ID}> help");
        let resolution = r.resolve(Some(&id()), &msg(&content)).await;
        assert!(matches!(
            resolution,
            Resolution::Prefix(ResolvedPrefix::Mention(_))
        ));
    }

    #[tokio::test]
    async fn pattern_wins_over_dynamic() {
        let config = RouterConfig {
            prefixes: vec!["herald".to_string()],
            regex_prefix: Some(r"^herald[,!]\s*".to_string()),
            owners: vec![],
        };
        let r = resolver(config);
        let resolution = r.resolve(Some(&id()), &msg("herald, ping")).await;
        assert_eq!(
            resolution,
            Resolution::Prefix(ResolvedPrefix::Pattern(r"^herald[,!]\s*".to_string()))
        );
    }

    #[tokio::test]
    async fn unmatched_pattern_falls_through_to_dynamic() {
        let config = RouterConfig {
            prefixes: vec!["!".to_string()],
            regex_prefix: Some(r"^herald,\s*".to_string()),
            owners: vec![],
        };
        let r = resolver(config);
        let resolution = r.resolve(Some(&id()), &msg("!help")).await;
        assert_eq!(
            resolution,
            Resolution::Prefix(ResolvedPrefix::Literal("!".to_string()))
        );
    }

    #[tokio::test]
    async fn unmatched_pattern_yields_none_for_plain_chat() {
        let config = RouterConfig {
            prefixes: vec!["!".to_string()],
            regex_prefix: Some(r"^herald,\s*".to_string()),
            owners: vec![],
        };
        let r = resolver(config);
        let resolution = r.resolve(Some(&id()), &msg("just chatting")).await;
        assert_eq!(resolution, Resolution::None);
    }

    #[tokio::test]
    async fn mid_message_pattern_match_does_not_count() {
        let config = RouterConfig {
            prefixes: vec![],
            regex_prefix: Some(r"herald,\s*".to_string()),
            owners: vec![],
        };
        let r = resolver(config);
        let resolution = r.resolve(Some(&id()), &msg("hey herald, ping")).await;
        assert_eq!(resolution, Resolution::None, "pattern must match at offset 0");
    }

    #[tokio::test]
    async fn first_matching_dynamic_candidate_wins() {
        let r = resolver(RouterConfig {
            prefixes: vec!["!".to_string(), "?".to_string()],
            ..RouterConfig::default()
        });
        let resolution = r.resolve(Some(&id()), &msg("!help")).await;
        assert_eq!(
            resolution,
            Resolution::Prefix(ResolvedPrefix::Literal("!".to_string()))
        );
    }

    #[tokio::test]
    async fn dynamic_match_is_case_sensitive() {
        let r = resolver(RouterConfig::with_prefix("Herald "));
        let resolution = r.resolve(Some(&id()), &msg("herald ping")).await;
        assert_eq!(resolution, Resolution::None);
    }

    #[tokio::test]
    async fn no_candidates_yields_none() {
        let r = resolver(RouterConfig::default());
        let resolution = r.resolve(Some(&id()), &msg("hello there")).await;
        assert_eq!(resolution, Resolution::None);
    }
}
