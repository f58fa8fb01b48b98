//! Remote table service error types

use crate::model::RowId;
use crate::model::TableId;

/// The remote operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Definition,
    Create,
    Search,
    Save,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Definition => "definition",
            Self::Create => "create",
            Self::Search => "search",
            Self::Save => "save",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when talking to a [`TableService`](crate::service::TableService).
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    /// The table does not exist.
    #[error("Table '{0}' not found")]
    TableNotFound(TableId),

    /// The row does not exist.
    #[error("Row '{0}' not found")]
    RowNotFound(RowId),

    /// The service refused the request (validation, permissions, ...).
    #[error("{operation} rejected: {message}")]
    Rejected {
        /// The operation that was rejected.
        operation: Operation,
        /// Reason given by the service.
        message: String,
    },

    /// The service could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Creates a new rejection error.
    pub fn rejected(operation: Operation, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            message: message.into(),
        }
    }

    /// Returns `true` if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
