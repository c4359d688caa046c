//! The pass/fail outcome of a precondition check.

use serde::{Deserialize, Serialize};

/// Outcome of running one precondition or a whole tree.
///
/// A failure is normal control flow, not an error: it is the expected
/// negative branch of And/Or evaluation. Anything that is not a pass is
/// treated uniformly as a fail by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The check passed; execution may proceed.
    Pass,
    /// The check failed, optionally saying why.
    Fail { reason: Option<String> },
}

impl Verdict {
    /// A passing verdict.
    pub fn pass() -> Self {
        Verdict::Pass
    }

    /// A failing verdict with a reason.
    pub fn fail(reason: impl Into<String>) -> Self {
        Verdict::Fail {
            reason: Some(reason.into()),
        }
    }

    /// A failing verdict with no reason attached.
    pub fn fail_silent() -> Self {
        Verdict::Fail { reason: None }
    }

    /// Whether this verdict is a pass.
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl From<bool> for Verdict {
    fn from(pass: bool) -> Self {
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail { reason: None }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_conversion() {
        assert!(Verdict::from(true).is_pass());
        assert!(!Verdict::from(false).is_pass());
    }

    #[test]
    fn fail_carries_reason() {
        let verdict = Verdict::fail("guild only");
        assert_eq!(
            verdict,
            Verdict::Fail {
                reason: Some("guild only".to_string())
            }
        );
    }
}
