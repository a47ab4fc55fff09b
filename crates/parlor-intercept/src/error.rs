//! Error types for the interceptor layer.

use parlor_protocol::ProtocolError;

/// Why a task ended without a result.
///
/// Protocol-level refusals (room full, placement rejected) are not errors;
/// tasks report those through their own result type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// A packet could not be composed, or a subscribed message failed to
    /// decode.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The outbound channel to the host is closed.
    #[error("outbound channel closed")]
    Send,

    /// The task was cancelled, directly or by its timeout.
    #[error("task cancelled")]
    Cancelled,

    /// The interceptor was dropped before the task finished.
    #[error("task detached before completion")]
    Detached,
}
