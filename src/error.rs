//! Error types for callback registration and dispatch.

use thiserror::Error;

/// Error returned by a handler. Handlers are free to produce any error type.
pub type HandlerError = anyhow::Error;

/// Result returned by every handler shape.
pub type HandlerResult = std::result::Result<(), HandlerError>;

#[derive(Debug, Error)]
pub enum CallbackError {
    /// The joint or sequential wait was cancelled before natural completion.
    #[error("callback invocation was cancelled")]
    Cancelled,

    /// A handler returned an error or panicked.
    ///
    /// For concurrent dispatch only one representative failure is reported when
    /// several handlers fail; which one depends on completion order.
    #[error("handler failed: {0:#}")]
    HandlerFailure(HandlerError),

    /// A dispatch boundary lost track of a handler's outcome.
    #[error("dispatch invariant violated: {0}")]
    InvariantViolation(String),

    #[error("cannot remove a handler from an absent registry")]
    MissingRegistry,

    /// Blocking invocation was requested on a current-thread runtime.
    #[error("blocking invoke requires a multi-threaded runtime or no runtime at all")]
    BlockingContext,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CallbackError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CallbackError::Cancelled)
    }

    /// The handler's own error, when this is a handler failure.
    pub fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            CallbackError::HandlerFailure(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CallbackError>;
