//! Resource store errors.

use thiserror::Error;

/// Errors that can occur when talking to the resource store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// A resource with the same id already exists.
    #[error("resource already exists")]
    Conflict,

    /// The store answered with an unexpected status.
    #[error("unexpected response status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// The configured base URL cannot address collections.
    #[error("invalid store url {0}")]
    InvalidUrl(String),

    /// A resource body was not a JSON object.
    #[error("resource body must be a JSON object")]
    InvalidBody,

    /// An HTTP transport error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error("invalid response body")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the failure happened before the store could answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
