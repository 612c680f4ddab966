//! In-process resource store.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::{Collection, Filter, ResourceStore, StoreError, query_form};

/// Resource store held in memory, with the same id and filter semantics as
/// the HTTP store's backing service.
#[derive(Debug, Default)]
pub struct MemoryResourceStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: FxHashMap<Collection, Vec<Value>>,
    last_id: u64,
}

impl MemoryState {
    fn resources(&mut self, collection: Collection) -> &mut Vec<Value> {
        self.collections.entry(collection).or_default()
    }

    fn contains(&self, collection: Collection, id: &str) -> bool {
        self.collections
            .get(&collection)
            .is_some_and(|resources| resources.iter().any(|resource| has_id(resource, id)))
    }

    fn next_id(&mut self, collection: Collection) -> String {
        loop {
            self.last_id += 1;

            let candidate = self.last_id.to_string();

            if !self.contains(collection, &candidate) {
                return candidate;
            }
        }
    }
}

impl MemoryResourceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert resources as they are, bypassing id checks.
    pub async fn seed(&self, collection: Collection, resources: impl IntoIterator<Item = Value>) {
        let mut state = self.state.lock().await;

        state.resources(collection).extend(resources);
    }

    /// Copy of every resource in the collection, in insertion order.
    pub async fn snapshot(&self, collection: Collection) -> Vec<Value> {
        let state = self.state.lock().await;

        state.collections.get(&collection).cloned().unwrap_or_default()
    }
}

fn resource_id(resource: &Value) -> Option<String> {
    resource.get("id").and_then(query_form)
}

fn has_id(resource: &Value, id: &str) -> bool {
    resource_id(resource).as_deref() == Some(id)
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn list(
        &self,
        collection: Collection,
        filter: Option<Filter>,
    ) -> Result<Vec<Value>, StoreError> {
        let state = self.state.lock().await;

        let resources = state
            .collections
            .get(&collection)
            .map(|resources| {
                resources
                    .iter()
                    .filter(|resource| filter.as_ref().is_none_or(|filter| filter.matches(resource)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(resources)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Value, StoreError> {
        let state = self.state.lock().await;

        state
            .collections
            .get(&collection)
            .and_then(|resources| resources.iter().find(|resource| has_id(resource, id)))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, collection: Collection, mut body: Value) -> Result<Value, StoreError> {
        let mut state = self.state.lock().await;

        let id = match resource_id(&body) {
            Some(id) => {
                if state.contains(collection, &id) {
                    return Err(StoreError::Conflict);
                }

                id
            }
            None => {
                let id = state.next_id(collection);

                body.as_object_mut()
                    .ok_or(StoreError::InvalidBody)?
                    .insert("id".to_string(), Value::String(id.clone()));

                id
            }
        };

        debug!(%collection, %id, "created resource");

        state.resources(collection).push(body.clone());

        Ok(body)
    }

    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        mut body: Value,
    ) -> Result<Value, StoreError> {
        let mut state = self.state.lock().await;

        let slot = state
            .resources(collection)
            .iter_mut()
            .find(|resource| has_id(resource, id))
            .ok_or(StoreError::NotFound)?;

        let fields = body.as_object_mut().ok_or(StoreError::InvalidBody)?;

        let existing_id = slot
            .get("id")
            .cloned()
            .unwrap_or_else(|| Value::String(id.to_string()));

        fields.insert("id".to_string(), existing_id);

        slot.clone_from(&body);

        Ok(body)
    }

    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
    ) -> Result<Value, StoreError> {
        let mut state = self.state.lock().await;

        let Value::Object(changes) = body else {
            return Err(StoreError::InvalidBody);
        };

        let slot = state
            .resources(collection)
            .iter_mut()
            .find(|resource| has_id(resource, id))
            .ok_or(StoreError::NotFound)?;

        let fields = slot.as_object_mut().ok_or(StoreError::InvalidBody)?;

        for (key, value) in changes {
            if key != "id" {
                fields.insert(key, value);
            }
        }

        Ok(slot.clone())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let resources = state.resources(collection);
        let before = resources.len();

        resources.retain(|resource| !has_id(resource, id));

        if resources.len() == before {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}
