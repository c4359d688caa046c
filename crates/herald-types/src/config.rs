//! Router configuration.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Static configuration for the dispatch router.
///
/// Deserialized from the host application's config file; every field has
/// a default so partial configs load cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RouterConfig {
    /// Literal prefixes tried in order by the default prefix provider.
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Optional regex source for the pattern prefix tier. Compiled once
    /// at router construction, not per message.
    #[serde(default)]
    pub regex_prefix: Option<String>,

    /// User ids the `owner_only` builtin precondition accepts.
    #[serde(default)]
    pub owners: Vec<UserId>,
}

impl RouterConfig {
    /// Config with a single literal prefix and no owners.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefixes: vec![prefix.into()],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_deserializes() {
        let config: RouterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn full_config_roundtrip() {
        let config = RouterConfig {
            prefixes: vec!["!".to_string(), "?".to_string()],
            regex_prefix: Some(r"^herald[,!]\s*".to_string()),
            owners: vec![UserId::new("42")],
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: RouterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
