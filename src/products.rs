//! Products

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ids::ResourceId;

/// Product Id
pub type ProductId = ResourceId<Product>;

/// Catalog product, read-only to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Unit price in minor units
    pub price: u64,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Image location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Prices products by id.
pub trait PriceIndex {
    /// Unit price of the given product, if it is known.
    fn price_of(&self, product: &ProductId) -> Option<u64>;
}

/// An id-indexed snapshot of the product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: FxHashMap<ProductId, Product>,
}

impl Catalog {
    /// Create an empty catalog. Every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the given products. Later duplicates replace earlier ones.
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|product| (product.id.clone(), product))
                .collect(),
        }
    }

    /// Look up a product.
    pub fn get(&self, product: &ProductId) -> Option<&Product> {
        self.products.get(product)
    }

    /// Insert or replace a product.
    pub fn insert(&mut self, product: Product) -> Option<Product> {
        self.products.insert(product.id.clone(), product)
    }

    /// Whether the product resolves.
    pub fn contains(&self, product: &ProductId) -> bool {
        self.products.contains_key(product)
    }

    /// Number of indexed products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }
}

impl PriceIndex for Catalog {
    fn price_of(&self, product: &ProductId) -> Option<u64> {
        self.get(product).map(|product| product.price)
    }
}

impl PriceIndex for FxHashMap<ProductId, u64> {
    fn price_of(&self, product: &ProductId) -> Option<u64> {
        self.get(product).copied()
    }
}
