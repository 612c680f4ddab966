//! Catalog service errors.

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while reading the product catalog.
#[derive(Debug, Error)]
pub enum CatalogServiceError {
    /// No product has the requested id.
    #[error("product not found")]
    NotFound,

    /// The store could not be read.
    #[error("store error")]
    Store(#[source] StoreError),

    /// A product record could not be decoded.
    #[error("invalid product data")]
    InvalidData(#[from] serde_json::Error),
}

impl From<StoreError> for CatalogServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}
