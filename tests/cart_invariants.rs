//! Cart invariants under arbitrary mutation sequences.

use proptest::prelude::*;
use storefront::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Add(u8),
    Increment(u8),
    Decrement(u8),
    Remove(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8).prop_map(Op::Add),
        (0u8..8).prop_map(Op::Increment),
        (0u8..8).prop_map(Op::Decrement),
        (0u8..8).prop_map(Op::Remove),
    ]
}

/// Products 0..6 are priced, 6 and 7 are catalog misses.
fn catalog(prices: &[u64]) -> Catalog {
    Catalog::from_products(prices.iter().enumerate().map(|(index, price)| Product {
        id: ProductId::from(index.to_string()),
        name: format!("Product {index}"),
        price: *price,
        description: String::new(),
        image_url: None,
    }))
}

fn apply(cart: &mut Cart, op: Op, prices: &Catalog) {
    _ = match op {
        Op::Add(id) => cart.add_or_increment(&ProductId::from(id.to_string()), prices),
        Op::Increment(id) => cart.increment(&ProductId::from(id.to_string()), prices),
        Op::Decrement(id) => cart.decrement(&ProductId::from(id.to_string()), prices),
        Op::Remove(id) => cart.remove(&ProductId::from(id.to_string()), prices),
    };
}

fn expected_total(cart: &Cart, prices: &Catalog) -> u64 {
    cart.lines()
        .iter()
        .map(|line| prices.price_of(&line.product_id).unwrap_or(0) * u64::from(line.quantity))
        .sum()
}

proptest! {
    #[test]
    fn total_matches_lines_after_any_sequence(
        prices in prop::collection::vec(0u64..1_000_000, 6),
        ops in prop::collection::vec(op(), 0..64),
    ) {
        let prices = catalog(&prices);
        let mut cart = Cart::new(CartId::from("1-0"), UserId::new(1));

        for op in ops {
            apply(&mut cart, op, &prices);

            prop_assert_eq!(cart.total(), expected_total(&cart, &prices));
        }
    }

    #[test]
    fn lines_are_unique_and_positive(ops in prop::collection::vec(op(), 0..64)) {
        let prices = catalog(&[10, 20, 30, 40, 50, 60]);
        let mut cart = Cart::new(CartId::from("1-0"), UserId::new(1));

        for op in ops {
            apply(&mut cart, op, &prices);
        }

        let mut seen = std::collections::BTreeSet::new();

        for line in cart.lines() {
            prop_assert!(line.quantity > 0, "zero quantity line: {line:?}");
            prop_assert!(seen.insert(line.product_id.clone()), "duplicate line: {line:?}");
        }
    }

    #[test]
    fn total_does_not_depend_on_line_order(
        prices in prop::collection::vec(0u64..1_000_000, 6),
        ids in prop::collection::vec(0u8..8, 1..16),
    ) {
        let prices = catalog(&prices);
        let mut forward = Cart::new(CartId::from("1-0"), UserId::new(1));
        let mut backward = Cart::new(CartId::from("1-0"), UserId::new(1));

        for id in &ids {
            apply(&mut forward, Op::Add(*id), &prices);
        }

        for id in ids.iter().rev() {
            apply(&mut backward, Op::Add(*id), &prices);
        }

        prop_assert_eq!(forward.total(), backward.total());
        prop_assert_eq!(forward.item_count(), backward.item_count());
    }

    #[test]
    fn wire_round_trip_preserves_lines_and_total(ops in prop::collection::vec(op(), 0..32)) {
        let prices = catalog(&[10, 20, 30, 40, 50, 60]);
        let mut cart = Cart::new(CartId::from("1-0"), UserId::new(1));

        for op in ops {
            apply(&mut cart, op, &prices);
        }

        let json = serde_json::to_string(&cart)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let decoded: Cart = serde_json::from_str(&json)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        prop_assert_eq!(decoded.lines(), cart.lines());
        prop_assert_eq!(decoded.total(), cart.total());
    }
}
