//! Strongly-typed identifier wrappers to prevent accidental misuse of strings.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Create a new identifier from any string-like value.
            pub fn new(id: impl Into<Arc<str>>) -> Self {
                Self(id.into())
            }

            /// Borrow as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::new(s))
            }
        }
    };
}

id_type! {
    /// A platform user identifier (the numeric snowflake as its textual form).
    /// Uses `Arc<str>` internally so cloning is an atomic increment instead
    /// of a heap allocation.
    UserId
}

id_type! {
    /// A platform channel identifier.
    ChannelId
}

id_type! {
    /// A platform guild (server) identifier.
    GuildId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_as_str() {
        let id = UserId::new("123456789012345678");
        assert_eq!(id.as_str(), "123456789012345678");
        assert_eq!(id.to_string(), "123456789012345678");
    }

    #[test]
    fn equality_with_str() {
        let id = ChannelId::from("42");
        assert_eq!(id, "42");
        assert_ne!(id, "43");
    }

    #[test]
    fn serde_roundtrip_as_plain_string() {
        let id = GuildId::new("987");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"987\"");
        let back: GuildId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
