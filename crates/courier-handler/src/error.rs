//! Error types for the update handler.

use thiserror::Error;

use crate::dispatcher::LifecycleState;

/// Errors reported by [`BotHandler`](crate::BotHandler) lifecycle calls.
///
/// Both variants describe misuse, not failure: the handler's state is left
/// unchanged and the caller decides whether to retry or give up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// `start` was called while the handler was not stopped.
    #[error("update handler is already running (state: {0:?})")]
    AlreadyRunning(LifecycleState),

    /// `stop` was called while the handler was not running.
    #[error("update handler is not running (state: {0:?})")]
    NotRunning(LifecycleState),
}

/// Result type for handler lifecycle operations.
pub type HandlerResult<T> = Result<T, HandlerError>;
