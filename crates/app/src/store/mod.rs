//! Remote resource store.
//!
//! A generic REST collection API: list, get, create, replace, patch and delete
//! JSON resources by id. The store's own consistency guarantees are whatever
//! the backing service offers; nothing here adds transactions.

use std::fmt::{Display, Formatter, Result as FmtResult};

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;

mod errors;
mod http;
mod memory;

pub use errors::StoreError;
pub use http::{HttpResourceStore, HttpStoreConfig};
pub use memory::MemoryResourceStore;

/// Collections consumed by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Product catalog
    Products,

    /// One cart per user
    Carts,

    /// Append-only order history
    PaymentHistories,
}

impl Collection {
    /// URL path segment of the collection.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Carts => "carts",
            Self::PaymentHistories => "paymentHistories",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.path())
    }
}

/// Equality filter on a top-level resource field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Field name
    pub field: &'static str,

    /// Expected value, in its query string form
    pub value: String,
}

impl Filter {
    /// Match resources whose `field` equals `value`.
    pub fn eq(field: &'static str, value: impl ToString) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }

    /// Whether the resource matches this filter.
    pub fn matches(&self, resource: &Value) -> bool {
        resource
            .get(self.field)
            .and_then(query_form)
            .is_some_and(|value| value == self.value)
    }
}

/// Query string form of a scalar JSON value.
pub(crate) fn query_form(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Resource store seam.
#[automock]
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// List a collection, optionally filtered.
    async fn list(
        &self,
        collection: Collection,
        filter: Option<Filter>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Retrieve one resource.
    async fn get(&self, collection: Collection, id: &str) -> Result<Value, StoreError>;

    /// Create a resource. The store assigns an id when the body has none.
    async fn create(&self, collection: Collection, body: Value) -> Result<Value, StoreError>;

    /// Replace a resource in full.
    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
    ) -> Result<Value, StoreError>;

    /// Merge top-level fields into a resource.
    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
    ) -> Result<Value, StoreError>;

    /// Delete a resource.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn filter_matches_numbers_by_their_query_form() {
        let filter = Filter::eq("user", 7);

        assert!(filter.matches(&json!({ "user": 7 })));
        assert!(filter.matches(&json!({ "user": "7" })));
        assert!(!filter.matches(&json!({ "user": 8 })));
    }

    #[test]
    fn filter_does_not_match_missing_or_structured_fields() {
        let filter = Filter::eq("user", 7);

        assert!(!filter.matches(&json!({ "id": "x" })));
        assert!(!filter.matches(&json!({ "user": [7] })));
        assert!(!filter.matches(&json!({ "user": null })));
    }

    #[test]
    fn collections_map_to_rest_paths() {
        assert_eq!(Collection::Products.path(), "products");
        assert_eq!(Collection::Carts.path(), "carts");
        assert_eq!(Collection::PaymentHistories.to_string(), "paymentHistories");
    }
}
