//! Storage error types shared by every collaborator backend.

use std::fmt;

/// Errors that can occur while traversing or mutating the node graph.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested node was not found.
    #[error("Node not found: {type_name}/{id}")]
    NotFound {
        /// The node type that was looked up.
        type_name: String,
        /// The ID that was looked up.
        id: String,
    },

    /// The update payload could not be applied to the node.
    #[error("Invalid node params: {message}")]
    InvalidParams {
        /// Description of why the params are invalid.
        message: String,
    },

    /// A pagination cursor could not be decoded.
    #[error("Invalid cursor: {cursor}")]
    InvalidCursor {
        /// The cursor as received from the client.
        cursor: String,
    },

    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    /// Creates a new `InvalidParams` error.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidCursor` error.
    #[must_use]
    pub fn invalid_cursor(cursor: impl Into<String>) -> Self {
        Self::InvalidCursor {
            cursor: cursor.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidParams { .. } | Self::InvalidCursor { .. } => ErrorCategory::Validation,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Node not found.
    NotFound,
    /// Bad input from the caller.
    Validation,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
