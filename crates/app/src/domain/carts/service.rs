//! Carts service.
//!
//! Reconciles a user's local cart with the single remote cart record kept for
//! that user. Every save re-locates the record first; the lookup and the
//! following write are not atomic, so two writers that both see no record can
//! each create one. Readers then take the first.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use serde_json::Value;
use storefront::{
    carts::{Cart, CartId},
    ids::UserId,
};
use tracing::{debug, info, warn};

use crate::{
    domain::carts::errors::CartsServiceError,
    store::{Collection, Filter, ResourceStore, StoreError},
};

/// Where the user's cart record lives, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartLocation {
    /// The user has no cart record yet.
    NotFound,

    /// The user's cart record.
    Found(CartId),
}

/// How a cart reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartWrite {
    /// A new record was created.
    Created(CartId),

    /// An existing record was replaced in full.
    Replaced(CartId),
}

impl CartWrite {
    /// Id of the record that now holds the cart.
    pub fn id(&self) -> &CartId {
        match self {
            Self::Created(id) | Self::Replaced(id) => id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CartHandle {
    id: CartId,
}

/// Carts service backed by the `carts` collection.
#[derive(Clone)]
pub struct StoreCartsService {
    store: Arc<dyn ResourceStore>,
}

impl StoreCartsService {
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    async fn user_carts(&self, user: UserId) -> Result<Vec<Value>, CartsServiceError> {
        let mut carts = self
            .store
            .list(Collection::Carts, Some(Filter::eq("user", user)))
            .await
            .map_err(CartsServiceError::Locate)?;

        if carts.len() > 1 {
            warn!(%user, count = carts.len(), "user has several cart records, using the first");
            carts.truncate(1);
        }

        Ok(carts)
    }

    async fn replace(&self, id: &CartId, body: Value) -> Result<CartWrite, CartsServiceError> {
        match self.store.replace(Collection::Carts, id.as_str(), body.clone()).await {
            Ok(_) => Ok(CartWrite::Replaced(id.clone())),
            Err(StoreError::NotFound) => {
                warn!(cart = %id, "cart record vanished before replace, creating it");

                self.store
                    .create(Collection::Carts, body)
                    .await
                    .map_err(CartsServiceError::Write)?;

                Ok(CartWrite::Created(id.clone()))
            }
            Err(error) => Err(CartsServiceError::Write(error)),
        }
    }
}

impl std::fmt::Debug for StoreCartsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCartsService").finish_non_exhaustive()
    }
}

#[async_trait]
impl CartsService for StoreCartsService {
    #[tracing::instrument(name = "carts.locate_cart", skip(self, user), fields(user = %user), err)]
    async fn locate_cart(&self, user: UserId) -> Result<CartLocation, CartsServiceError> {
        let Some(record) = self.user_carts(user).await?.pop() else {
            debug!("no cart record");

            return Ok(CartLocation::NotFound);
        };

        let handle: CartHandle = serde_json::from_value(record)?;

        Ok(CartLocation::Found(handle.id))
    }

    #[tracing::instrument(name = "carts.load_cart", skip(self, user), fields(user = %user), err)]
    async fn load_cart(&self, user: UserId) -> Result<Option<Cart>, CartsServiceError> {
        let Some(record) = self.user_carts(user).await?.pop() else {
            return Ok(None);
        };

        let cart: Cart = serde_json::from_value(record)?;

        debug!(cart = %cart.id(), lines = cart.len(), "loaded cart");

        Ok(Some(cart))
    }

    #[tracing::instrument(
        name = "carts.save_cart",
        skip(self, cart),
        fields(user = %cart.user_id(), cart = %cart.id()),
        err
    )]
    async fn save_cart(&self, cart: &Cart) -> Result<CartWrite, CartsServiceError> {
        match self.locate_cart(cart.user_id()).await? {
            CartLocation::Found(id) => {
                let mut record = cart.clone();

                if *record.id() != id {
                    info!(local = %cart.id(), remote = %id, "adopting remote cart id");
                    record.adopt_id(id.clone());
                }

                self.replace(&id, serde_json::to_value(&record)?).await
            }
            CartLocation::NotFound => {
                let body = serde_json::to_value(cart)?;

                match self.store.create(Collection::Carts, body.clone()).await {
                    Ok(_) => {
                        info!("created cart record");

                        Ok(CartWrite::Created(cart.id().clone()))
                    }
                    Err(StoreError::Conflict) => {
                        warn!("cart record created concurrently, replacing it");

                        self.replace(cart.id(), body).await
                    }
                    Err(error) => Err(CartsServiceError::Write(error)),
                }
            }
        }
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Find the user's cart record.
    async fn locate_cart(&self, user: UserId) -> Result<CartLocation, CartsServiceError>;

    /// Fetch and normalise the user's cart record.
    async fn load_cart(&self, user: UserId) -> Result<Option<Cart>, CartsServiceError>;

    /// Persist the cart as the user's single cart record, creating it or
    /// replacing it in full.
    ///
    /// The returned write names the record id, which differs from the cart's
    /// own id when another record already existed for the user.
    async fn save_cart(&self, cart: &Cart) -> Result<CartWrite, CartsServiceError>;
}
