//! Cart session errors.

use storefront::orders::OrderId;
use thiserror::Error;

use crate::domain::{
    catalog::CatalogServiceError, carts::CartsServiceError, checkout::CheckoutError,
    orders::OrdersServiceError,
};

/// Errors surfaced by a cart session.
#[derive(Debug, Error)]
pub enum CartSessionError {
    /// The catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogServiceError),

    /// The cart could not be read or written. After a failed write the cart
    /// is marked stale.
    #[error(transparent)]
    Carts(#[from] CartsServiceError),

    /// The order history could not be read.
    #[error(transparent)]
    Orders(#[from] OrdersServiceError),

    /// The checkout transaction failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// An earlier order is recorded but its cart clear has not reached the
    /// store yet.
    #[error("order {order} is recorded but its cart clear is still pending")]
    ClearPending {
        /// Recorded order
        order: OrderId,
    },

    /// There is no cart clear to retry.
    #[error("no cart clear is pending")]
    NoPendingClear,
}
