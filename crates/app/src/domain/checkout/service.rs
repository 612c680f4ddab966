//! Checkout service.
//!
//! Checkout is ordered: the order is appended to the history first, and only
//! then is the cart cleared and persisted. A failure between the two leaves a
//! recorded order next to a remote cart that still holds its lines; the caller
//! retries the clear alone, never the append.

use std::sync::Arc;

use jiff::Timestamp;
use storefront::{
    carts::Cart,
    orders::{OrderId, OrderRecord},
    products::Catalog,
    session::Session,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{
    carts::{CartWrite, CartsService, CartsServiceError},
    checkout::errors::CheckoutError,
    orders::{OrderAppend, OrdersService},
};

/// Runs the checkout transaction against the carts and orders services.
#[derive(Clone)]
pub struct CheckoutService {
    carts: Arc<dyn CartsService>,
    orders: Arc<dyn OrdersService>,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService").finish_non_exhaustive()
    }
}

impl CheckoutService {
    #[must_use]
    pub fn new(carts: Arc<dyn CartsService>, orders: Arc<dyn OrdersService>) -> Self {
        Self { carts, orders }
    }

    /// Build the order for the cart under a fresh id, without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Rejected`] when the cart is empty or is not the
    /// session user's.
    pub fn prepare(
        session: &Session,
        cart: &Cart,
        catalog: &Catalog,
        now: Timestamp,
    ) -> Result<OrderRecord, CheckoutError> {
        let id = OrderId::new(Uuid::now_v7().to_string());

        Ok(OrderRecord::from_cart(id, session, cart, catalog, now)?)
    }

    /// Record a prepared order, then clear and persist the cart.
    ///
    /// The cart is only cleared once the order is recorded. Committing the
    /// same order twice never appends it twice.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::StaleOrder`]: the cart no longer matches the order.
    /// - [`CheckoutError::OrderNotRecorded`]: the append failed; the cart is
    ///   untouched.
    /// - [`CheckoutError::CartNotCleared`]: the order is recorded and `cart`
    ///   is empty, but the empty cart was not persisted.
    #[tracing::instrument(
        name = "checkout.commit",
        skip(self, order, cart),
        fields(order = %order.id, cart = %cart.id(), total = order.total)
    )]
    pub async fn commit(
        &self,
        order: OrderRecord,
        cart: &mut Cart,
    ) -> Result<OrderRecord, CheckoutError> {
        if !order.covers(cart) {
            return Err(CheckoutError::StaleOrder);
        }

        match self.orders.append_order(&order).await {
            Ok(OrderAppend::Recorded) => info!("order recorded"),
            Ok(OrderAppend::AlreadyRecorded) => info!("order had already been recorded"),
            Err(source) => {
                error!(error = %source, "order not recorded, cart left intact");

                return Err(CheckoutError::OrderNotRecorded {
                    order: Box::new(order),
                    source,
                });
            }
        }

        _ = cart.clear();

        match self.carts.save_cart(cart).await {
            Ok(write) => {
                cart.adopt_id(write.id().clone());

                info!("cart cleared after checkout");

                Ok(order)
            }
            Err(source) => {
                error!(error = %source, "order recorded but cart not cleared");

                Err(CheckoutError::CartNotCleared {
                    order: Box::new(order),
                    source,
                })
            }
        }
    }

    /// Prepare and commit in one step.
    ///
    /// # Errors
    ///
    /// See [`CheckoutService::prepare`] and [`CheckoutService::commit`].
    pub async fn checkout(
        &self,
        session: &Session,
        cart: &mut Cart,
        catalog: &Catalog,
        now: Timestamp,
    ) -> Result<OrderRecord, CheckoutError> {
        let order = Self::prepare(session, cart, catalog, now)?;

        self.commit(order, cart).await
    }

    /// Persist the already-cleared cart after [`CheckoutError::CartNotCleared`].
    ///
    /// Order history is not touched.
    ///
    /// # Errors
    ///
    /// Returns the carts service error when the write fails again.
    #[tracing::instrument(name = "checkout.retry_clear", skip(self, cart), fields(cart = %cart.id()))]
    pub async fn retry_clear(&self, cart: &mut Cart) -> Result<CartWrite, CartsServiceError> {
        _ = cart.clear();

        let write = self.carts.save_cart(cart).await?;

        cart.adopt_id(write.id().clone());

        info!("cart cleared on retry");

        Ok(write)
    }
}
