//! Checkout errors.

use storefront::orders::{OrderError, OrderRecord};
use thiserror::Error;

use crate::domain::{carts::CartsServiceError, orders::OrdersServiceError};

/// Errors raised by the checkout transaction.
///
/// The variants follow the transaction's steps, so each one tells the caller
/// exactly which side effects have happened.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No order could be built from the cart. Nothing was written.
    #[error(transparent)]
    Rejected(#[from] OrderError),

    /// The cart changed after the order was prepared. Nothing was written.
    #[error("cart no longer matches the prepared order")]
    StaleOrder,

    /// The order was not appended. The cart is untouched.
    #[error("order {} was not recorded", .order.id)]
    OrderNotRecorded {
        /// Order that should be retried as-is
        order: Box<OrderRecord>,
        /// Failure from the order history
        #[source]
        source: OrdersServiceError,
    },

    /// The order is recorded and the local cart is empty, but the empty cart
    /// was not persisted.
    #[error("order {} was recorded but the cart was not cleared", .order.id)]
    CartNotCleared {
        /// Order that was recorded
        order: Box<OrderRecord>,
        /// Failure from the carts store
        #[source]
        source: CartsServiceError,
    },
}

impl CheckoutError {
    /// Order the error concerns, if one had been prepared.
    pub fn order(&self) -> Option<&OrderRecord> {
        match self {
            Self::OrderNotRecorded { order, .. } | Self::CartNotCleared { order, .. } => {
                Some(order.as_ref())
            }
            Self::Rejected(_) | Self::StaleOrder => None,
        }
    }
}
