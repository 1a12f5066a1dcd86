//! Error types for store operations.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a [`Store`](crate::Store).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store was built without a delivery strategy and tried to notify.
    #[error("notification delivery is not implemented")]
    UnimplementedNotification,

    /// `dispatch` was called with a name that is not registered.
    #[error("action \"{name}\" does not exist")]
    UnknownAction {
        /// The requested action name.
        name: String,
    },

    /// A JSON value used as state was not an object.
    #[error("state must be a JSON object, found {found}")]
    NotAnObject {
        /// Kind of the value that was supplied.
        found: &'static str,
    },

    /// Failure raised from inside an action.
    #[error("action failed: {0}")]
    Action(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Create an unknown action error.
    #[inline]
    pub fn unknown_action(name: impl Into<String>) -> Self {
        StoreError::UnknownAction { name: name.into() }
    }

    /// Wrap an error raised by action code.
    #[inline]
    pub fn action(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        StoreError::Action(err.into())
    }
}
