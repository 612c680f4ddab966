//! Carts service errors.

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while reconciling a cart with the store.
#[derive(Debug, Error)]
pub enum CartsServiceError {
    /// The user's cart could not be looked up.
    #[error("failed to locate cart")]
    Locate(#[source] StoreError),

    /// The cart could not be written.
    #[error("failed to write cart")]
    Write(#[source] StoreError),

    /// A cart record could not be encoded or decoded.
    #[error("invalid cart data")]
    InvalidData(#[from] serde_json::Error),
}

impl CartsServiceError {
    /// Whether the failure happened before the store could answer.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Locate(error) | Self::Write(error) => error.is_transport(),
            Self::InvalidData(_) => false,
        }
    }
}
