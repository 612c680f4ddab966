//! Orders service errors.

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while reading or appending order history.
#[derive(Debug, Error)]
pub enum OrdersServiceError {
    /// The order could not be appended.
    #[error("failed to record order")]
    Append(#[source] StoreError),

    /// The history could not be read.
    #[error("failed to read order history")]
    List(#[source] StoreError),

    /// An order record could not be encoded or decoded.
    #[error("invalid order data")]
    InvalidData(#[from] serde_json::Error),
}
