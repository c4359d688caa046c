//! Error types shared across all Herald crates.

/// Errors that can occur across the Herald dispatch core.
///
/// Permission denials and failed preconditions are deliberately absent:
/// both are normal control flow, not errors. Listener handler failures
/// never propagate past the lifecycle wrapper either; they are captured
/// into `listener_error` events there.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A precondition tree referenced a name no registry entry resolves.
    /// This is a configuration bug and is fatal to the evaluation.
    #[error("unknown precondition: {0}")]
    UnknownPrecondition(String),

    /// A handler reported a plain failure message.
    #[error("{0}")]
    Handler(String),

    /// A handler failed with an underlying error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl DispatchError {
    /// Shorthand for a plain handler failure.
    pub fn handler(msg: impl Into<String>) -> Self {
        Self::Handler(msg.into())
    }
}
