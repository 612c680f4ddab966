//! Orders

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    carts::{Cart, CartLine},
    ids::{ResourceId, UserId},
    products::{Catalog, ProductId},
    session::Session,
};

/// Order Id
pub type OrderId = ResourceId<OrderRecord>;

/// Errors raised while materialising an order from a cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// There is nothing to order.
    #[error("cannot place an order for an empty cart")]
    EmptyCart,

    /// The cart belongs to somebody other than the session user.
    #[error("cart belongs to user {cart}, not the session user {session}")]
    ForeignCart {
        /// Owner of the cart
        cart: UserId,
        /// Session user
        session: UserId,
    },
}

/// Product details as they were when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    /// Product id
    pub id: ProductId,

    /// Name at checkout
    #[serde(default)]
    pub name: String,

    /// Unit price at checkout
    #[serde(default)]
    pub price: u64,

    /// Description at checkout
    #[serde(default)]
    pub description: String,

    /// Image at checkout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Units ordered
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

impl ProductSnapshot {
    /// Snapshot the line against the catalog. A line whose product no longer
    /// resolves keeps its id and quantity and is priced at zero.
    pub fn capture(line: &CartLine, catalog: &Catalog) -> Self {
        match catalog.get(&line.product_id) {
            Some(product) => Self {
                id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                description: product.description.clone(),
                image_url: product.image_url.clone(),
                quantity: line.quantity,
            },
            None => Self {
                id: line.product_id.clone(),
                name: String::new(),
                price: 0,
                description: String::new(),
                image_url: None,
                quantity: line.quantity,
            },
        }
    }
}

/// Order Record
///
/// Append-only. Product details and the total are copied at checkout and are
/// never recomputed from the live catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Order id
    pub id: OrderId,

    /// Ordering user
    pub user_id: UserId,

    /// Product snapshots, one per cart line
    pub products: Vec<ProductSnapshot>,

    /// Cart total at checkout
    pub total: u64,

    /// Time of checkout
    pub date: Timestamp,
}

impl OrderRecord {
    /// Materialise an order from the session user's cart.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`]: the cart has no lines.
    /// - [`OrderError::ForeignCart`]: the cart is not the session user's.
    pub fn from_cart(
        id: OrderId,
        session: &Session,
        cart: &Cart,
        catalog: &Catalog,
        date: Timestamp,
    ) -> Result<Self, OrderError> {
        if cart.user_id() != session.user_id() {
            return Err(OrderError::ForeignCart {
                cart: cart.user_id(),
                session: session.user_id(),
            });
        }

        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        Ok(Self {
            id,
            user_id: cart.user_id(),
            products: cart
                .lines()
                .iter()
                .map(|line| ProductSnapshot::capture(line, catalog))
                .collect(),
            total: cart.total(),
            date,
        })
    }

    /// Whether this order was materialised from a cart holding exactly these
    /// lines and total.
    pub fn covers(&self, cart: &Cart) -> bool {
        self.user_id == cart.user_id()
            && self.total == cart.total()
            && self.products.len() == cart.len()
            && self
                .products
                .iter()
                .zip(cart.lines())
                .all(|(snapshot, line)| {
                    snapshot.id == line.product_id && snapshot.quantity == line.quantity
                })
    }

    /// Sum of ordered quantities.
    pub fn item_count(&self) -> u64 {
        self.products
            .iter()
            .map(|snapshot| u64::from(snapshot.quantity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        carts::CartId,
        products::Product,
        session::Role,
    };

    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_products([
            Product {
                id: ProductId::from("a"),
                name: "Alpha".to_string(),
                price: 100,
                description: "first".to_string(),
                image_url: Some("/a.png".to_string()),
            },
            Product {
                id: ProductId::from("b"),
                name: "Beta".to_string(),
                price: 50,
                description: String::new(),
                image_url: None,
            },
        ])
    }

    fn session() -> Session {
        Session::new(UserId::new(1), Role::User)
    }

    fn filled_cart(catalog: &Catalog) -> Cart {
        let mut cart = Cart::new(CartId::from("1-1"), UserId::new(1));

        _ = cart.add_or_increment(&ProductId::from("a"), catalog);
        _ = cart.add_or_increment(&ProductId::from("a"), catalog);
        _ = cart.add_or_increment(&ProductId::from("b"), catalog);

        cart
    }

    #[test]
    fn order_snapshots_lines_and_copies_total() -> TestResult {
        let catalog = catalog();
        let cart = filled_cart(&catalog);
        let date: Timestamp = "2024-05-01T10:00:00Z".parse()?;

        let order = OrderRecord::from_cart(OrderId::from("o1"), &session(), &cart, &catalog, date)?;

        assert_eq!(order.total, 250);
        assert_eq!(order.products.len(), 2);
        assert_eq!(order.item_count(), 3);
        assert!(order.covers(&cart));

        let first = order.products.first().ok_or("missing snapshot")?;
        assert_eq!(first.name, "Alpha");
        assert_eq!(first.quantity, 2);
        assert_eq!(first.image_url.as_deref(), Some("/a.png"));

        Ok(())
    }

    #[test]
    fn empty_cart_is_rejected() {
        let cart = Cart::new(CartId::from("1-1"), UserId::new(1));

        let result = OrderRecord::from_cart(
            OrderId::from("o1"),
            &session(),
            &cart,
            &catalog(),
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(result, Err(OrderError::EmptyCart));
    }

    #[test]
    fn foreign_cart_is_rejected() {
        let catalog = catalog();
        let cart = filled_cart(&catalog);
        let other = Session::new(UserId::new(2), Role::User);

        let result =
            OrderRecord::from_cart(OrderId::from("o1"), &other, &cart, &catalog, Timestamp::UNIX_EPOCH);

        assert_eq!(
            result,
            Err(OrderError::ForeignCart {
                cart: UserId::new(1),
                session: UserId::new(2),
            })
        );
    }

    #[test]
    fn later_price_changes_do_not_alter_the_snapshot() -> TestResult {
        let mut catalog = catalog();
        let cart = filled_cart(&catalog);

        let order = OrderRecord::from_cart(
            OrderId::from("o1"),
            &session(),
            &cart,
            &catalog,
            Timestamp::UNIX_EPOCH,
        )?;

        catalog.insert(Product {
            id: ProductId::from("a"),
            name: "Alpha v2".to_string(),
            price: 999,
            description: String::new(),
            image_url: None,
        });

        let first = order.products.first().ok_or("missing snapshot")?;
        assert_eq!(first.price, 100);
        assert_eq!(first.name, "Alpha");
        assert_eq!(order.total, 250);

        Ok(())
    }

    #[test]
    fn unresolved_products_are_snapshotted_at_zero() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new(CartId::from("1-1"), UserId::new(1));
        _ = cart.add_or_increment(&ProductId::from("gone"), &catalog);

        let order = OrderRecord::from_cart(
            OrderId::from("o1"),
            &session(),
            &cart,
            &catalog,
            Timestamp::UNIX_EPOCH,
        )?;

        let snapshot = order.products.first().ok_or("missing snapshot")?;
        assert_eq!(snapshot.id, ProductId::from("gone"));
        assert_eq!(snapshot.price, 0);
        assert!(snapshot.name.is_empty());
        assert_eq!(order.total, 0);

        Ok(())
    }

    #[test]
    fn covers_detects_changed_lines() -> TestResult {
        let catalog = catalog();
        let mut cart = filled_cart(&catalog);

        let order = OrderRecord::from_cart(
            OrderId::from("o1"),
            &session(),
            &cart,
            &catalog,
            Timestamp::UNIX_EPOCH,
        )?;

        _ = cart.decrement(&ProductId::from("a"), &catalog);

        assert!(!order.covers(&cart));

        Ok(())
    }

    #[test]
    fn serializes_to_history_wire_format() -> TestResult {
        let catalog = catalog();
        let cart = filled_cart(&catalog);
        let date: Timestamp = "2024-05-01T10:00:00Z".parse()?;

        let order = OrderRecord::from_cart(OrderId::from("o1"), &session(), &cart, &catalog, date)?;

        assert_eq!(
            serde_json::to_value(&order)?,
            json!({
                "id": "o1",
                "userId": 1,
                "products": [
                    {
                        "id": "a",
                        "name": "Alpha",
                        "price": 100,
                        "description": "first",
                        "imageUrl": "/a.png",
                        "quantity": 2
                    },
                    {
                        "id": "b",
                        "name": "Beta",
                        "price": 50,
                        "description": "",
                        "quantity": 1
                    }
                ],
                "total": 250,
                "date": "2024-05-01T10:00:00Z"
            })
        );

        Ok(())
    }

    #[test]
    fn legacy_history_entries_default_to_single_units() -> TestResult {
        let order: OrderRecord = serde_json::from_value(json!({
            "id": 12,
            "userId": 1,
            "products": [{ "id": 3, "name": "Mug", "price": 40, "description": "" }],
            "total": 40,
            "date": "2024-01-02T03:04:05.678Z"
        }))?;

        assert_eq!(order.id, OrderId::from("12"));
        assert_eq!(order.item_count(), 1);

        Ok(())
    }
}
