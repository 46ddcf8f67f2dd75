//! Error types shared by the request path.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors raised while handling or rendering a single request.
///
/// Every variant ends up as a 500 response; the dispatcher does not
/// distinguish bad input from internal failures.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// A query argument was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The data backend failed to produce a document.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A JSON document nested deeper than the renderer allows.
    #[error("recursion too deep")]
    RecursionLimit,

    /// The rendered document could not be serialized.
    #[error("couldn't serialize: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExplorerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ExplorerError::Validation(msg.into())
    }
}
