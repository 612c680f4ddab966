//! Cart session
//!
//! The single actor that owns one user's cart for the lifetime of a tab or a
//! command. It applies mutations locally, mirrors them, persists them through
//! the carts reconciler, and runs checkout. All operations take `&mut self`,
//! so one session never races itself; separate sessions for the same user
//! race through the store and the last full write wins.

use std::sync::Arc;

use jiff::Timestamp;
use storefront::{
    carts::{Cart, CartChange},
    orders::OrderRecord,
    products::{Catalog, ProductId},
    session::Session,
};
use tracing::{error, info, warn};

use crate::{
    context::AppContext,
    domain::{
        carts::{CartWrite, CartsService},
        catalog::CatalogService,
        checkout::{CheckoutError, CheckoutService},
        orders::OrdersService,
    },
    mirror::{CartMirror, PendingCheckout},
};

mod errors;

pub use errors::CartSessionError;

/// One user's cart, kept in step with the store.
pub struct CartSession {
    session: Session,
    cart: Cart,
    catalog: Catalog,
    catalog_loaded: bool,
    stale: bool,
    pending: Option<PendingCheckout>,
    catalog_service: Arc<dyn CatalogService>,
    carts: Arc<dyn CartsService>,
    orders: Arc<dyn OrdersService>,
    checkout: CheckoutService,
    mirror: Arc<dyn CartMirror>,
}

impl std::fmt::Debug for CartSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSession")
            .field("session", &self.session)
            .field("cart", &self.cart)
            .field("catalog_loaded", &self.catalog_loaded)
            .field("stale", &self.stale)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl CartSession {
    /// Open a session for the user.
    ///
    /// The cart is seeded from the local mirror when one exists, and is
    /// otherwise a fresh empty cart that has not been written anywhere.
    pub fn open(context: &AppContext, session: Session) -> Self {
        let user = session.user_id();

        let (cart, stale) = match context.mirror.load(user) {
            Ok(Some(cart)) => {
                let unsynced = context.mirror.load_unsynced(user).unwrap_or_else(|error| {
                    warn!(%user, %error, "ignoring unreadable unsynced marker");

                    false
                });

                (cart, unsynced)
            }
            Ok(None) => (Cart::generate(user, Timestamp::now()), false),
            Err(error) => {
                warn!(%user, %error, "ignoring unreadable cart mirror");

                (Cart::generate(user, Timestamp::now()), false)
            }
        };

        let pending = context.mirror.load_pending(user).unwrap_or_else(|error| {
            warn!(%user, %error, "ignoring unreadable pending checkout");

            None
        });

        info!(%user, cart = %cart.id(), lines = cart.len(), stale, "opened cart session");

        Self {
            session,
            cart,
            catalog: Catalog::new(),
            catalog_loaded: false,
            stale,
            pending,
            catalog_service: context.catalog.clone(),
            carts: context.carts.clone(),
            orders: context.orders.clone(),
            checkout: context.checkout(),
            mirror: context.mirror.clone(),
        }
    }

    /// The signed-in user.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The current cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The catalog last loaded, empty until the first load.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether the local cart may differ from the store.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// The recorded order whose cart clear still has to reach the store.
    pub fn pending_clear(&self) -> Option<&OrderRecord> {
        self.pending
            .as_ref()
            .filter(|pending| pending.recorded)
            .map(|pending| &pending.order)
    }

    /// The prepared order whose append has not been confirmed.
    pub fn unconfirmed_order(&self) -> Option<&OrderRecord> {
        self.pending
            .as_ref()
            .filter(|pending| !pending.recorded)
            .map(|pending| &pending.order)
    }

    /// Load the catalog and reprice the cart against it.
    ///
    /// # Errors
    ///
    /// Returns the catalog failure; the previous catalog is kept.
    pub async fn refresh_catalog(&mut self) -> Result<(), CartSessionError> {
        let catalog = self.catalog_service.load_catalog().await?;

        self.catalog = catalog;
        self.catalog_loaded = true;

        if !self.cart.is_consistent_with(&self.catalog) {
            info!(cart = %self.cart.id(), "repricing cart against the catalog");

            self.cart.recompute_total(&self.catalog);
            self.mirror_cart();
        }

        Ok(())
    }

    /// Replace the local cart with the user's remote cart.
    ///
    /// The remote record wins over whatever the mirror held, unless the local
    /// cart is stale: changes the store never accepted are kept, across
    /// sessions, until a write succeeds. When the user has no remote record,
    /// the local cart is kept and, if it holds lines, marked stale until the
    /// next successful write.
    ///
    /// # Errors
    ///
    /// Returns the carts failure; the local cart is left as it was.
    pub async fn refresh(&mut self) -> Result<(), CartSessionError> {
        let remote = match self.carts.load_cart(self.session.user_id()).await {
            Ok(remote) => remote,
            Err(error) => {
                error!(%error, "failed to refresh cart, keeping local copy");

                return Err(error.into());
            }
        };

        match remote {
            Some(remote) if self.pending_clear().is_some() => {
                if remote.is_empty() {
                    info!("remote cart is empty, pending clear resolved");
                    self.resolve_pending_clear();
                } else {
                    warn!("remote cart still holds ordered lines, clear is pending");
                }

                self.cart.adopt_id(remote.id().clone());
            }
            Some(remote) if self.stale => {
                warn!(
                    cart = %self.cart.id(),
                    remote = %remote.id(),
                    "local cart has unsynced changes, keeping it over the remote copy"
                );

                self.cart.adopt_id(remote.id().clone());
            }
            Some(mut remote) => {
                if self.catalog_loaded {
                    remote.recompute_total(&self.catalog);
                }

                self.cart = remote;
                self.set_stale(false);
            }
            None => {
                if !self.cart.is_empty() {
                    warn!(cart = %self.cart.id(), "no remote cart, local cart not yet persisted");
                    self.set_stale(true);
                }
            }
        }

        self.mirror_cart();

        Ok(())
    }

    /// Add one unit of the product.
    ///
    /// # Errors
    ///
    /// Returns the write failure; the change stays applied locally and the
    /// cart is marked stale.
    pub async fn add(&mut self, product: &ProductId) -> Result<CartChange, CartSessionError> {
        self.ensure_catalog().await;

        if self.catalog_loaded && !self.catalog.contains(product) {
            warn!(%product, "adding a product missing from the catalog at zero price");
        }

        self.apply(|cart, catalog| cart.add_or_increment(product, catalog))
            .await
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// See [`CartSession::add`].
    pub async fn increase(&mut self, product: &ProductId) -> Result<CartChange, CartSessionError> {
        self.ensure_catalog().await;

        self.apply(|cart, catalog| cart.increment(product, catalog))
            .await
    }

    /// Take one unit off a line, dropping the line at zero.
    ///
    /// # Errors
    ///
    /// See [`CartSession::add`].
    pub async fn decrease(&mut self, product: &ProductId) -> Result<CartChange, CartSessionError> {
        self.ensure_catalog().await;

        self.apply(|cart, catalog| cart.decrement(product, catalog))
            .await
    }

    /// Drop the product's line.
    ///
    /// # Errors
    ///
    /// See [`CartSession::add`].
    pub async fn remove(&mut self, product: &ProductId) -> Result<CartChange, CartSessionError> {
        self.ensure_catalog().await;

        self.apply(|cart, catalog| cart.remove(product, catalog))
            .await
    }

    /// Write the current cart to the store again.
    ///
    /// # Errors
    ///
    /// Returns the write failure; the cart stays stale.
    pub async fn sync(&mut self) -> Result<CartWrite, CartSessionError> {
        self.persist().await
    }

    /// Check the cart out.
    ///
    /// An order whose append was not confirmed is reused, id and all, as long
    /// as the cart still holds exactly its lines.
    ///
    /// # Errors
    ///
    /// - [`CartSessionError::ClearPending`]: an earlier order still needs its
    ///   cart clear; use [`CartSession::retry_clear`].
    /// - [`CartSessionError::Checkout`]: the transaction failed; the inner
    ///   error says which side effects happened.
    pub async fn checkout(&mut self) -> Result<OrderRecord, CartSessionError> {
        if let Some(order) = self.pending_clear() {
            return Err(CartSessionError::ClearPending {
                order: order.id.clone(),
            });
        }

        self.ensure_catalog().await;

        let order = match self.pending.take() {
            Some(pending) if pending.order.covers(&self.cart) => {
                info!(order = %pending.order.id, "retrying unconfirmed order");

                pending.order
            }
            stale => {
                if let Some(pending) = stale {
                    info!(order = %pending.order.id, "cart changed, dropping unconfirmed order");
                }

                CheckoutService::prepare(&self.session, &self.cart, &self.catalog, Timestamp::now())?
            }
        };

        self.remember(PendingCheckout {
            order: order.clone(),
            recorded: false,
        });

        match self.checkout.commit(order, &mut self.cart).await {
            Ok(order) => {
                self.forget_pending();
                self.set_stale(false);
                self.mirror_cart();

                Ok(order)
            }
            Err(CheckoutError::OrderNotRecorded { order, source }) => {
                self.remember(PendingCheckout {
                    order: (*order).clone(),
                    recorded: false,
                });

                Err(CheckoutError::OrderNotRecorded { order, source }.into())
            }
            Err(CheckoutError::CartNotCleared { order, source }) => {
                self.remember(PendingCheckout {
                    order: (*order).clone(),
                    recorded: true,
                });
                self.set_stale(true);
                self.mirror_cart();

                Err(CheckoutError::CartNotCleared { order, source }.into())
            }
            Err(error) => {
                self.forget_pending();

                Err(error.into())
            }
        }
    }

    /// Persist the cart clear of a recorded order.
    ///
    /// # Errors
    ///
    /// - [`CartSessionError::NoPendingClear`]: nothing to retry.
    /// - [`CartSessionError::Carts`]: the write failed again.
    pub async fn retry_clear(&mut self) -> Result<(), CartSessionError> {
        if self.pending_clear().is_none() {
            return Err(CartSessionError::NoPendingClear);
        }

        match self.checkout.retry_clear(&mut self.cart).await {
            Ok(_) => {
                self.set_stale(false);
                self.forget_pending();
                self.mirror_cart();

                Ok(())
            }
            Err(error) => {
                self.set_stale(true);

                Err(error.into())
            }
        }
    }

    /// The user's order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns the history read failure.
    pub async fn orders(&self) -> Result<Vec<OrderRecord>, CartSessionError> {
        Ok(self.orders.list_orders(self.session.user_id()).await?)
    }

    async fn ensure_catalog(&mut self) {
        if self.catalog_loaded {
            return;
        }

        if let Err(error) = self.refresh_catalog().await {
            warn!(%error, "catalog unavailable, unknown products are priced at zero");
        }
    }

    async fn apply(
        &mut self,
        mutation: impl FnOnce(&mut Cart, &Catalog) -> CartChange,
    ) -> Result<CartChange, CartSessionError> {
        let change = mutation(&mut self.cart, &self.catalog);

        if !change.is_applied() {
            return Ok(change);
        }

        self.mirror_cart();
        self.persist().await?;

        Ok(change)
    }

    async fn persist(&mut self) -> Result<CartWrite, CartSessionError> {
        match self.carts.save_cart(&self.cart).await {
            Ok(write) => {
                if write.id() != self.cart.id() {
                    self.cart.adopt_id(write.id().clone());
                    self.mirror_cart();
                }

                self.set_stale(false);
                self.resolve_pending_clear();

                Ok(write)
            }
            Err(error) => {
                error!(%error, cart = %self.cart.id(), "cart write failed, cart is stale");
                self.set_stale(true);

                Err(error.into())
            }
        }
    }

    fn resolve_pending_clear(&mut self) {
        if self.pending_clear().is_some() {
            self.forget_pending();
        }
    }

    fn remember(&mut self, pending: PendingCheckout) {
        if let Err(error) = self.mirror.store_pending(&pending) {
            warn!(%error, "failed to mirror pending checkout");
        }

        self.pending = Some(pending);
    }

    fn forget_pending(&mut self) {
        self.pending = None;

        if let Err(error) = self.mirror.discard_pending(self.session.user_id()) {
            warn!(%error, "failed to discard mirrored pending checkout");
        }
    }

    fn set_stale(&mut self, stale: bool) {
        if self.stale == stale {
            return;
        }

        self.stale = stale;

        if let Err(error) = self.mirror.store_unsynced(self.session.user_id(), stale) {
            warn!(%error, stale, "failed to mirror unsynced marker");
        }
    }

    fn mirror_cart(&self) {
        if let Err(error) = self.mirror.store(&self.cart) {
            warn!(%error, cart = %self.cart.id(), "failed to mirror cart");
        }
    }
}
