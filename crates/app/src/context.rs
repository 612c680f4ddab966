//! App Context

use std::{path::PathBuf, sync::Arc, time::Duration};

use storefront::session::Session;
use thiserror::Error;

use crate::{
    domain::{
        carts::{CartsService, StoreCartsService},
        catalog::{CatalogService, StoreCatalogService},
        checkout::CheckoutService,
        orders::{OrdersService, StoreOrdersService},
    },
    mirror::{CartMirror, FileCartMirror},
    session::CartSession,
    store::{HttpResourceStore, HttpStoreConfig, ResourceStore, StoreError},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to set up the resource store client")]
    Store(#[source] StoreError),
}

#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub mirror: Arc<dyn CartMirror>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire every service over one resource store.
    pub fn from_store(store: Arc<dyn ResourceStore>, mirror: Arc<dyn CartMirror>) -> Self {
        Self {
            catalog: Arc::new(StoreCatalogService::new(store.clone())),
            carts: Arc::new(StoreCartsService::new(store.clone())),
            orders: Arc::new(StoreOrdersService::new(store)),
            mirror,
        }
    }

    /// Build application context from the store's base URL, mirroring carts
    /// under `cache_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is unusable or the HTTP client cannot be
    /// built.
    pub fn from_api_url(
        url: &str,
        timeout: Duration,
        cache_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppInitError> {
        let store = HttpResourceStore::new(HttpStoreConfig {
            base_url: url.to_string(),
            timeout,
        })
        .map_err(AppInitError::Store)?;

        Ok(Self::from_store(
            Arc::new(store),
            Arc::new(FileCartMirror::new(cache_dir)),
        ))
    }

    /// Checkout transaction over this context's services.
    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.carts.clone(), self.orders.clone())
    }

    /// Open a cart session for the signed-in user.
    pub fn open_session(&self, session: Session) -> CartSession {
        CartSession::open(self, session)
    }
}
