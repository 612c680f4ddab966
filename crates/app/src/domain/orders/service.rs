//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use storefront::{ids::UserId, orders::OrderRecord};
use tracing::{debug, info, warn};

use crate::{
    domain::orders::errors::OrdersServiceError,
    store::{Collection, Filter, ResourceStore, StoreError},
};

/// Outcome of appending an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAppend {
    /// The order is now in the history.
    Recorded,

    /// An earlier attempt already recorded this order id.
    AlreadyRecorded,
}

/// Orders service backed by the `paymentHistories` collection.
#[derive(Clone)]
pub struct StoreOrdersService {
    store: Arc<dyn ResourceStore>,
}

impl StoreOrdersService {
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for StoreOrdersService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreOrdersService").finish_non_exhaustive()
    }
}

#[async_trait]
impl OrdersService for StoreOrdersService {
    #[tracing::instrument(
        name = "orders.append_order",
        skip(self, order),
        fields(order = %order.id, user = %order.user_id, total = order.total),
        err
    )]
    async fn append_order(&self, order: &OrderRecord) -> Result<OrderAppend, OrdersServiceError> {
        let body = serde_json::to_value(order)?;

        match self.store.create(Collection::PaymentHistories, body).await {
            Ok(_) => {
                info!("recorded order");

                Ok(OrderAppend::Recorded)
            }
            Err(StoreError::Conflict) => {
                info!("order was already recorded");

                Ok(OrderAppend::AlreadyRecorded)
            }
            Err(error) => Err(OrdersServiceError::Append(error)),
        }
    }

    #[tracing::instrument(name = "orders.list_orders", skip(self, user), fields(user = %user), err)]
    async fn list_orders(&self, user: UserId) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let records = self
            .store
            .list(Collection::PaymentHistories, Some(Filter::eq("userId", user)))
            .await
            .map_err(OrdersServiceError::List)?;

        let mut orders = Vec::with_capacity(records.len());

        for record in records {
            match serde_json::from_value::<OrderRecord>(record) {
                Ok(order) => orders.push(order),
                Err(error) => warn!(%error, "skipping malformed order record"),
            }
        }

        orders.sort_by(|a, b| b.date.cmp(&a.date));

        debug!(count = orders.len(), "loaded order history");

        Ok(orders)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Append the order to the history. Appending an id that is already
    /// present succeeds without writing a second entry.
    async fn append_order(&self, order: &OrderRecord) -> Result<OrderAppend, OrdersServiceError>;

    /// The user's orders, newest first.
    async fn list_orders(&self, user: UserId) -> Result<Vec<OrderRecord>, OrdersServiceError>;
}
