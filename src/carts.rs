//! Carts
//!
//! The cart aggregate: one user's lines plus the derived total. Every
//! mutation recomputes the total before returning, so `total` always equals
//! the sum of line extensions under the price index it was last given.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    ids::{ResourceId, UserId},
    pricing::total_price,
    products::{PriceIndex, ProductId},
};

/// Cart Id
pub type CartId = ResourceId<Cart>;

/// Generate a fresh cart id for the user, derived from the creation time.
pub fn generate_cart_id(user_id: UserId, now: Timestamp) -> CartId {
    CartId::new(format!("{user_id}-{}", now.as_millisecond()))
}

/// One product-quantity pair. Quantity is never zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product on this line
    #[serde(rename = "productId")]
    pub product_id: ProductId,

    /// Units of the product
    pub quantity: u32,
}

/// Outcome of a cart mutation.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// The lines changed.
    Applied,

    /// Nothing to do; the cart is as it was.
    Unchanged,
}

impl CartChange {
    /// Whether the mutation changed the cart.
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CartRecord")]
pub struct Cart {
    id: CartId,

    #[serde(rename = "user")]
    user_id: UserId,

    #[serde(rename = "items")]
    lines: Vec<CartLine>,

    total: u64,
}

impl Cart {
    /// An empty cart with the given id.
    pub fn new(id: CartId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            lines: Vec::new(),
            total: 0,
        }
    }

    /// An empty cart with a freshly generated id.
    pub fn generate(user_id: UserId, now: Timestamp) -> Self {
        Self::new(generate_cart_id(user_id, now), user_id)
    }

    /// Cart id.
    pub fn id(&self) -> &CartId {
        &self.id
    }

    /// Owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Lines, in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Derived total.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Quantity held for the given product, zero when absent.
    pub fn quantity_of(&self, product: &ProductId) -> u32 {
        self.line(product).map_or(0, |line| line.quantity)
    }

    /// The line for the given product.
    pub fn line(&self, product: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == *product)
    }

    /// Take over the id of the cart record that already exists remotely.
    pub fn adopt_id(&mut self, id: CartId) {
        self.id = id;
    }

    /// Add one unit of the product, appending a line if there is none.
    ///
    /// Never fails; a product missing from `prices` still gets its line and
    /// contributes zero to the total.
    pub fn add_or_increment(
        &mut self,
        product: &ProductId,
        prices: &impl PriceIndex,
    ) -> CartChange {
        if let Some(line) = self.line_mut(product) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLine {
                product_id: product.clone(),
                quantity: 1,
            });
        }

        self.recompute_total(prices);

        CartChange::Applied
    }

    /// Add one unit to an existing line. No-op when the line is absent.
    pub fn increment(&mut self, product: &ProductId, prices: &impl PriceIndex) -> CartChange {
        let Some(line) = self.line_mut(product) else {
            return CartChange::Unchanged;
        };

        line.quantity = line.quantity.saturating_add(1);

        self.recompute_total(prices);

        CartChange::Applied
    }

    /// Take one unit off a line, removing the line when it would reach zero.
    pub fn decrement(&mut self, product: &ProductId, prices: &impl PriceIndex) -> CartChange {
        let Some(line) = self.line_mut(product) else {
            return CartChange::Unchanged;
        };

        if line.quantity > 1 {
            line.quantity -= 1;
        } else {
            self.lines.retain(|line| line.product_id != *product);
        }

        self.recompute_total(prices);

        CartChange::Applied
    }

    /// Remove the product's line. No-op when the line is absent.
    pub fn remove(&mut self, product: &ProductId, prices: &impl PriceIndex) -> CartChange {
        let before = self.lines.len();

        self.lines.retain(|line| line.product_id != *product);

        if self.lines.len() == before {
            return CartChange::Unchanged;
        }

        self.recompute_total(prices);

        CartChange::Applied
    }

    /// Drop every line.
    pub fn clear(&mut self) -> CartChange {
        if self.lines.is_empty() && self.total == 0 {
            return CartChange::Unchanged;
        }

        self.lines.clear();
        self.total = 0;

        CartChange::Applied
    }

    /// Recompute the total from the lines.
    pub fn recompute_total(&mut self, prices: &impl PriceIndex) {
        self.total = total_price(&self.lines, prices);
    }

    /// Whether the stored total matches the lines under `prices`.
    pub fn is_consistent_with(&self, prices: &impl PriceIndex) -> bool {
        self.total == total_price(&self.lines, prices)
    }

    fn line_mut(&mut self, product: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product_id == *product)
    }
}

/// Cart as it arrives from a store, before normalisation.
#[derive(Debug, Deserialize)]
struct CartRecord {
    id: CartId,
    user: UserId,
    #[serde(default)]
    items: Vec<CartLineRecord>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct CartLineRecord {
    #[serde(rename = "productId")]
    product_id: ProductId,
    quantity: i64,
}

impl From<CartRecord> for Cart {
    fn from(record: CartRecord) -> Self {
        let mut lines: Vec<CartLine> = Vec::with_capacity(record.items.len());

        for item in record.items {
            if item.quantity <= 0 {
                continue;
            }

            let quantity = u32::try_from(item.quantity).unwrap_or(u32::MAX);

            merge_line(&mut lines, item.product_id, quantity);
        }

        Self {
            id: record.id,
            user_id: record.user,
            lines,
            total: record.total,
        }
    }
}

fn merge_line(lines: &mut Vec<CartLine>, product_id: ProductId, quantity: u32) {
    if let Some(line) = lines.iter_mut().find(|line| line.product_id == product_id) {
        line.quantity = line.quantity.saturating_add(quantity);
    } else {
        lines.push(CartLine {
            product_id,
            quantity,
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::products::{Catalog, Product};

    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_products([product("a", 100), product("b", 50)])
    }

    fn product(id: &str, price: u64) -> Product {
        Product {
            id: ProductId::from(id),
            name: id.to_uppercase(),
            price,
            description: String::new(),
            image_url: None,
        }
    }

    fn cart() -> Cart {
        Cart::new(CartId::from("1-1700000000000"), UserId::new(1))
    }

    fn id(raw: &str) -> ProductId {
        ProductId::from(raw)
    }

    #[test]
    fn generated_id_combines_user_and_creation_time() -> TestResult {
        let now: Timestamp = "2024-05-01T00:00:00Z".parse()?;

        let cart = Cart::generate(UserId::new(9), now);

        assert_eq!(cart.id().as_str(), "9-1714521600000");
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);

        Ok(())
    }

    #[test]
    fn adding_same_product_twice_yields_one_line_of_two() {
        let prices = catalog();
        let mut cart = cart();

        assert!(cart.add_or_increment(&id("a"), &prices).is_applied());
        assert!(cart.add_or_increment(&id("a"), &prices).is_applied());

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(&id("a")), 2);
        assert_eq!(cart.total(), 200);
    }

    #[test]
    fn adding_unknown_product_keeps_line_at_zero_price() {
        let prices = catalog();
        let mut cart = cart();

        _ = cart.add_or_increment(&id("a"), &prices);
        _ = cart.add_or_increment(&id("ghost"), &prices);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.quantity_of(&id("ghost")), 1);
        assert_eq!(cart.total(), 100);
    }

    #[test]
    fn increment_missing_line_is_a_no_op() {
        let prices = catalog();
        let mut cart = cart();

        assert_eq!(cart.increment(&id("a"), &prices), CartChange::Unchanged);
        assert!(cart.is_empty());
    }

    #[test]
    fn increment_existing_line_updates_total() {
        let prices = catalog();
        let mut cart = cart();

        _ = cart.add_or_increment(&id("b"), &prices);

        assert!(cart.increment(&id("b"), &prices).is_applied());
        assert_eq!(cart.quantity_of(&id("b")), 2);
        assert_eq!(cart.total(), 100);
    }

    #[test]
    fn decrementing_quantity_one_removes_the_line() {
        let prices = catalog();
        let mut cart = cart();

        _ = cart.add_or_increment(&id("a"), &prices);
        _ = cart.add_or_increment(&id("b"), &prices);

        assert!(cart.decrement(&id("a"), &prices).is_applied());

        assert!(cart.line(&id("a")).is_none());
        assert!(cart.lines().iter().all(|line| line.quantity > 0));
        assert_eq!(cart.total(), 50);
    }

    #[test]
    fn decrement_reduces_quantity_above_one() {
        let prices = catalog();
        let mut cart = cart();

        _ = cart.add_or_increment(&id("a"), &prices);
        _ = cart.add_or_increment(&id("a"), &prices);
        _ = cart.decrement(&id("a"), &prices);

        assert_eq!(cart.quantity_of(&id("a")), 1);
        assert_eq!(cart.total(), 100);
    }

    #[test]
    fn decrement_missing_line_is_a_no_op() {
        let prices = catalog();
        let mut cart = cart();

        assert_eq!(cart.decrement(&id("a"), &prices), CartChange::Unchanged);
    }

    #[test]
    fn remove_drops_line_regardless_of_quantity() {
        let prices = catalog();
        let mut cart = cart();

        for _ in 0..5 {
            _ = cart.add_or_increment(&id("a"), &prices);
        }
        _ = cart.add_or_increment(&id("b"), &prices);

        assert!(cart.remove(&id("a"), &prices).is_applied());
        assert_eq!(cart.remove(&id("a"), &prices), CartChange::Unchanged);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), 50);
    }

    #[test]
    fn clear_resets_lines_and_total() {
        let prices = catalog();
        let mut cart = cart();

        _ = cart.add_or_increment(&id("a"), &prices);

        assert!(cart.clear().is_applied());
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
        assert_eq!(cart.clear(), CartChange::Unchanged);
    }

    #[test]
    fn item_count_sums_quantities() {
        let prices = catalog();
        let mut cart = cart();

        _ = cart.add_or_increment(&id("a"), &prices);
        _ = cart.add_or_increment(&id("a"), &prices);
        _ = cart.add_or_increment(&id("b"), &prices);

        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn recompute_total_is_idempotent() {
        let prices = catalog();
        let mut cart = cart();

        _ = cart.add_or_increment(&id("a"), &prices);
        _ = cart.add_or_increment(&id("b"), &prices);

        cart.recompute_total(&prices);
        let first = cart.total();
        cart.recompute_total(&prices);

        assert_eq!(cart.total(), first);
        assert!(cart.is_consistent_with(&prices));
    }

    #[test]
    fn repricing_picks_up_new_catalog_prices() {
        let mut cart = cart();

        _ = cart.add_or_increment(&id("a"), &catalog());

        let repriced = Catalog::from_products([product("a", 130)]);

        assert!(!cart.is_consistent_with(&repriced));

        cart.recompute_total(&repriced);

        assert_eq!(cart.total(), 130);
    }

    #[test]
    fn serializes_to_store_wire_format() -> TestResult {
        let prices = catalog();
        let mut cart = cart();

        _ = cart.add_or_increment(&id("a"), &prices);
        _ = cart.add_or_increment(&id("a"), &prices);
        _ = cart.add_or_increment(&id("b"), &prices);

        assert_eq!(
            serde_json::to_value(&cart)?,
            json!({
                "id": "1-1700000000000",
                "user": 1,
                "items": [
                    { "productId": "a", "quantity": 2 },
                    { "productId": "b", "quantity": 1 }
                ],
                "total": 250
            })
        );

        Ok(())
    }

    #[test]
    fn decoding_drops_non_positive_quantities_and_merges_duplicates() -> TestResult {
        let cart: Cart = serde_json::from_value(json!({
            "id": "c1",
            "user": 4,
            "items": [
                { "productId": 1, "quantity": 2 },
                { "productId": 2, "quantity": 0 },
                { "productId": 3, "quantity": -4 },
                { "productId": "1", "quantity": 1 }
            ],
            "total": 999
        }))?;

        assert_eq!(
            cart.lines(),
            &[CartLine {
                product_id: id("1"),
                quantity: 3,
            }]
        );
        assert_eq!(cart.user_id(), UserId::new(4));
        assert_eq!(cart.total(), 999);

        Ok(())
    }

    #[test]
    fn decoding_tolerates_missing_items() -> TestResult {
        let cart: Cart = serde_json::from_value(json!({ "id": "c2", "user": 4 }))?;

        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);

        Ok(())
    }
}
