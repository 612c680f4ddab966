//! Catalog service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use storefront::products::{Catalog, Product, ProductId};
use tracing::{debug, warn};

use crate::{
    domain::catalog::errors::CatalogServiceError,
    store::{Collection, ResourceStore},
};

/// Catalog service backed by the `products` collection.
#[derive(Clone)]
pub struct StoreCatalogService {
    store: Arc<dyn ResourceStore>,
}

impl StoreCatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for StoreCatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCatalogService").finish_non_exhaustive()
    }
}

#[async_trait]
impl CatalogService for StoreCatalogService {
    #[tracing::instrument(name = "catalog.list_products", skip(self), err)]
    async fn list_products(&self) -> Result<Vec<Product>, CatalogServiceError> {
        let records = self.store.list(Collection::Products, None).await?;
        let mut products = Vec::with_capacity(records.len());

        for record in records {
            match serde_json::from_value::<Product>(record) {
                Ok(product) => products.push(product),
                Err(error) => warn!(%error, "skipping malformed product record"),
            }
        }

        debug!(count = products.len(), "loaded products");

        Ok(products)
    }

    #[tracing::instrument(name = "catalog.get_product", skip(self, product), fields(product = %product), err)]
    async fn get_product(&self, product: &ProductId) -> Result<Product, CatalogServiceError> {
        let record = self
            .store
            .get(Collection::Products, product.as_str())
            .await?;

        Ok(serde_json::from_value(record)?)
    }

    async fn load_catalog(&self) -> Result<Catalog, CatalogServiceError> {
        Ok(Catalog::from_products(self.list_products().await?))
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Retrieves every product that decodes cleanly.
    async fn list_products(&self) -> Result<Vec<Product>, CatalogServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: &ProductId) -> Result<Product, CatalogServiceError>;

    /// Index the current listing by product id.
    async fn load_catalog(&self) -> Result<Catalog, CatalogServiceError>;
}
