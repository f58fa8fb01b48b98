//! Error types

mod service;

pub use service::*;

/// Errors returned by grid operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The remote table service rejected or failed a request.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// No datasource is configured, so there is nothing to operate on.
    #[error("No datasource configured")]
    NotConfigured,

    /// The fetch context changed while the request was in flight.
    ///
    /// The response was discarded instead of being applied to the new context.
    #[error("Fetch context changed while the request was in flight")]
    StaleContext,

    /// Invalid grid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Returns the underlying service error, if any.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}
