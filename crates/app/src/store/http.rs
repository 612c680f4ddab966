//! HTTP client for a JSON REST resource store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{Collection, Filter, ResourceStore, StoreError};

/// Configuration for connecting to the resource store.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Store base address, e.g. `"http://localhost:5000"`.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// HTTP client for the resource store.
#[derive(Debug, Clone)]
pub struct HttpResourceStore {
    base_url: Url,
    http: Client,
}

impl HttpResourceStore {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot address collections or the
    /// HTTP client cannot be built.
    pub fn new(config: HttpStoreConfig) -> Result<Self, StoreError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|error| StoreError::InvalidUrl(format!("{}: {error}", config.base_url)))?;

        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(config.base_url));
        }

        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { base_url, http })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn collection_url(&self, collection: Collection) -> Result<Url, StoreError> {
        self.url(&[collection.path()])
    }

    fn resource_url(&self, collection: Collection, id: &str) -> Result<Url, StoreError> {
        self.url(&[collection.path(), id])
    }

    async fn send(request: RequestBuilder) -> Result<Vec<u8>, StoreError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.bytes().await?.to_vec());
        }

        match status {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound),
            StatusCode::CONFLICT => Err(StoreError::Conflict),
            _ => {
                let body = response.text().await.unwrap_or_default();

                Err(StoreError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    async fn send_json(request: RequestBuilder) -> Result<Value, StoreError> {
        let body = Self::send(request).await?;

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ResourceStore for HttpResourceStore {
    #[instrument(skip(self), fields(collection = %collection))]
    async fn list(
        &self,
        collection: Collection,
        filter: Option<Filter>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut request = self.http.get(self.collection_url(collection)?);

        if let Some(filter) = &filter {
            request = request.query(&[(filter.field, filter.value.as_str())]);
        }

        let body = Self::send(request).await?;
        let resources: Vec<Value> = serde_json::from_slice(&body)?;

        debug!(count = resources.len(), "listed resources");

        Ok(resources)
    }

    #[instrument(skip(self), fields(collection = %collection))]
    async fn get(&self, collection: Collection, id: &str) -> Result<Value, StoreError> {
        Self::send_json(self.http.get(self.resource_url(collection, id)?)).await
    }

    #[instrument(skip(self, body), fields(collection = %collection))]
    async fn create(&self, collection: Collection, body: Value) -> Result<Value, StoreError> {
        Self::send_json(self.http.post(self.collection_url(collection)?).json(&body)).await
    }

    #[instrument(skip(self, body), fields(collection = %collection))]
    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
    ) -> Result<Value, StoreError> {
        Self::send_json(self.http.put(self.resource_url(collection, id)?).json(&body)).await
    }

    #[instrument(skip(self, body), fields(collection = %collection))]
    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
    ) -> Result<Value, StoreError> {
        Self::send_json(self.http.patch(self.resource_url(collection, id)?).json(&body)).await
    }

    #[instrument(skip(self), fields(collection = %collection))]
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        Self::send(self.http.delete(self.resource_url(collection, id)?)).await?;

        Ok(())
    }
}
