//! User-facing error taxonomy.
//!
//! Internal plumbing propagates `anyhow::Error` throughout; at the action
//! dispatch boundary (see [`crate::ui::menu`]) errors are classified into
//! [`ActionError`] to decide whether to re-prompt, abort the action, or treat
//! the failure as an authentication failure per the error-handling design.

use thiserror::Error;

/// Coarse-grained error classification surfaced to the operator.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("input not found: {0}")]
    InputNotFound(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    #[error("read error: {0}")]
    ReadError(String),

    #[error("write error: {0}")]
    WriteError(String),

    #[error("seek error: {0}")]
    SeekError(String),

    #[error("fsync error: {0}")]
    FsyncError(String),

    #[error("decryption failed: invalid data or incorrect keys")]
    AuthenticationFailure,

    #[error("decryption failed: invalid data or incorrect keys")]
    SizeValidation,

    #[error("operation canceled")]
    UserCancel,

    #[error("operation terminated by signal")]
    Signal,
}

impl ActionError {
    /// Whether this error should send the operator back to the same prompt
    /// (bad path, no permission) rather than aborting the whole action.
    #[must_use]
    pub fn is_reprompt(&self) -> bool {
        matches!(self, Self::InputNotFound(_) | Self::Permission(_))
    }
}
