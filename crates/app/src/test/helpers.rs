//! Test Helpers

use serde_json::{Value, json};
use storefront::{carts::Cart, products::ProductId};

use crate::store::{Collection, MemoryResourceStore};

pub(crate) const KETTLE: &str = "1";
pub(crate) const MUG: &str = "2";
pub(crate) const LAMP: &str = "3";

pub(crate) fn products() -> Vec<Value> {
    vec![
        json!({ "id": 1, "name": "Kettle", "price": 250_000, "description": "1.7l steel kettle" }),
        json!({ "id": 2, "name": "Mug", "price": 40_000, "description": "" }),
        json!({ "id": 3, "name": "Lamp", "price": 120_000, "imageUrl": "/img/lamp.png" }),
    ]
}

pub(crate) fn id(raw: &str) -> ProductId {
    ProductId::from(raw)
}

pub(crate) async fn remote_carts(store: &MemoryResourceStore) -> Vec<Cart> {
    store
        .snapshot(Collection::Carts)
        .await
        .into_iter()
        .map(|record| serde_json::from_value(record).expect("Failed to decode stored cart"))
        .collect()
}
