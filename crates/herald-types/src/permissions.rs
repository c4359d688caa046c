//! Permission bitfields and the per-channel permission view.
//!
//! The platform represents channel permissions as a 64-bit field. Herald
//! only ever asks one question of it: does the bot hold a minimal required
//! set, counting permissions granted through any applicable rule (role,
//! category inheritance, channel overwrite) rather than only explicit
//! per-channel grants.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// A set of platform permissions packed into a 64-bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(pub u64);

/// Permission to see a channel and read its history.
pub const VIEW_CHANNEL: Permissions = Permissions(1 << 10);

/// Permission to send messages in a channel.
pub const SEND_MESSAGES: Permissions = Permissions(1 << 11);

/// The minimal set the bot needs before it will act on a message:
/// it must be able to see the channel and reply in it.
pub const REQUIRED_TO_ACT: Permissions = Permissions(VIEW_CHANNEL.0 | SEND_MESSAGES.0);

impl Permissions {
    /// The empty permission set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Whether every bit of `required` is present in this set.
    pub const fn contains(self, required: Permissions) -> bool {
        self.0 & required.0 == required.0
    }
}

impl BitOr for Permissions {
    type Output = Permissions;

    fn bitor(self, rhs: Permissions) -> Permissions {
        Permissions(self.0 | rhs.0)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A per-channel permission object resolved for one member.
///
/// `has` distinguishes the effective view (permissions granted via any
/// applicable rule) from the explicit view (only directly-assigned
/// grants). The gate always asks for the effective view.
pub trait PermissionView {
    /// Whether the member holds every permission in `required`.
    ///
    /// With `explicit_only` set, only directly-assigned grants count;
    /// otherwise permissions inherited from roles or overwrites count too.
    fn has(&self, required: Permissions, explicit_only: bool) -> bool;
}

/// A resolved permission pair: the effective field and the subset that
/// was granted explicitly on the channel itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolvedPermissions {
    /// Permissions granted through any applicable rule.
    pub effective: Permissions,
    /// Permissions granted directly on the channel.
    pub explicit: Permissions,
}

impl ResolvedPermissions {
    /// A view where all effective permissions were granted explicitly.
    pub fn uniform(permissions: Permissions) -> Self {
        Self {
            effective: permissions,
            explicit: permissions,
        }
    }
}

impl PermissionView for ResolvedPermissions {
    fn has(&self, required: Permissions, explicit_only: bool) -> bool {
        if explicit_only {
            self.explicit.contains(required)
        } else {
            self.effective.contains(required)
        }
    }
}
