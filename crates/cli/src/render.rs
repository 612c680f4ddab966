//! Tables

use std::{io, ops::Range};

use rusty_money::iso::Currency;
use storefront::{
    carts::Cart,
    orders::OrderRecord,
    pricing::{PricingError, line_extension, to_money},
    products::Catalog,
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

/// Errors raised while writing output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An amount could not be shown as money.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Output could not be written.
    #[error("failed to write output")]
    Io(#[from] io::Error),
}

/// Format a minor-unit amount in the display currency.
///
/// # Errors
///
/// Returns [`PricingError::AmountOutOfRange`] for amounts beyond `i64::MAX`.
pub fn format_money(amount: u64, currency: &'static Currency) -> Result<String, PricingError> {
    Ok(to_money(amount, currency)?.to_string())
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    money_columns: Columns<Range<usize>>,
) -> Result<(), RenderError> {
    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Rows::first(), Color::BOLD);
    table.modify(money_columns, Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

/// Write the catalog, ordered by product id.
///
/// # Errors
///
/// Returns a [`RenderError`] if a price cannot be shown or output fails.
pub fn write_products(
    out: &mut impl io::Write,
    catalog: &Catalog,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    if catalog.is_empty() {
        writeln!(out, "No products available.")?;

        return Ok(());
    }

    let mut products: Vec<_> = catalog.iter().collect();

    products.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

    let mut builder = Builder::default();

    builder.push_record(["Id", "Product", "Price", "Description"]);

    for product in products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            format_money(product.price, currency)?,
            product.description.clone(),
        ]);
    }

    write_table(out, builder, Columns::new(2..3))
}

/// Write the cart's lines and total.
///
/// Lines whose product is missing from the catalog are shown by id at a unit
/// price of zero.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be shown or output fails.
pub fn write_cart(
    out: &mut impl io::Write,
    cart: &Cart,
    catalog: &Catalog,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty.")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Id", "Product", "Qty", "Unit", "Line"]);

    for line in cart.lines() {
        let product = catalog.get(&line.product_id);

        builder.push_record([
            line.product_id.to_string(),
            product.map_or_else(|| line.product_id.to_string(), |product| product.name.clone()),
            line.quantity.to_string(),
            format_money(product.map_or(0, |product| product.price), currency)?,
            format_money(line_extension(line, catalog), currency)?,
        ]);
    }

    write_table(out, builder, Columns::new(2..5))?;

    writeln!(
        out,
        "Items: {}  Total: {}",
        cart.item_count(),
        format_money(cart.total(), currency)?
    )?;

    Ok(())
}

/// Write one order with its product snapshots.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be shown or output fails.
pub fn write_order(
    out: &mut impl io::Write,
    order: &OrderRecord,
    currency: &'static Currency,
) -> Result<(), RenderError> {
    writeln!(out, "Order {} placed {}", order.id, order.date)?;

    let mut builder = Builder::default();

    builder.push_record(["Id", "Product", "Qty", "Unit", "Line"]);

    for snapshot in &order.products {
        builder.push_record([
            snapshot.id.to_string(),
            snapshot.name.clone(),
            snapshot.quantity.to_string(),
            format_money(snapshot.price, currency)?,
            format_money(
                snapshot.price.saturating_mul(u64::from(snapshot.quantity)),
                currency,
            )?,
        ]);
    }

    write_table(out, builder, Columns::new(2..5))?;

    writeln!(out, "Total: {}", format_money(order.total, currency)?)?;

    Ok(())
}

/// Write the order history summary, in the given order.
///
/// # Errors
///
/// Returns a [`RenderError`] if an amount cannot be shown or output fails.
pub fn write_orders(
    out: &mut impl io::Write,
    orders: &[OrderRecord],
    currency: &'static Currency,
) -> Result<(), RenderError> {
    if orders.is_empty() {
        writeln!(out, "No orders yet.")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Order", "Date", "Items", "Total"]);

    for order in orders {
        builder.push_record([
            order.id.to_string(),
            order.date.to_string(),
            order.item_count().to_string(),
            format_money(order.total, currency)?,
        ]);
    }

    write_table(out, builder, Columns::new(2..4))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso;
    use storefront::{
        carts::CartId,
        ids::UserId,
        orders::{OrderId, ProductSnapshot},
        products::{Product, ProductId},
    };
    use testresult::TestResult;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_products([
            Product {
                id: ProductId::from("2"),
                name: "Mug".to_string(),
                price: 40_000,
                description: "Stoneware".to_string(),
                image_url: None,
            },
            Product {
                id: ProductId::from("1"),
                name: "Kettle".to_string(),
                price: 250_000,
                description: String::new(),
                image_url: None,
            },
        ])
    }

    fn rendered(
        write: impl FnOnce(&mut Vec<u8>) -> Result<(), RenderError>,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = Vec::new();

        write(&mut out)?;

        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn products_are_listed_by_id_with_prices() -> TestResult {
        let text = rendered(|out| write_products(out, &catalog(), iso::VND))?;

        let kettle = text.find("Kettle").ok_or("missing Kettle")?;
        let mug = text.find("Mug").ok_or("missing Mug")?;

        assert!(kettle < mug, "expected id order, got:\n{text}");
        assert!(text.contains(&format_money(250_000, iso::VND)?), "missing price in:\n{text}");
        assert!(text.contains("Stoneware"), "missing description in:\n{text}");

        Ok(())
    }

    #[test]
    fn empty_catalog_says_so() -> TestResult {
        let text = rendered(|out| write_products(out, &Catalog::new(), iso::VND))?;

        assert_eq!(text, "No products available.\n");

        Ok(())
    }

    #[test]
    fn cart_shows_lines_and_total() -> TestResult {
        let catalog = catalog();
        let mut cart = Cart::new(CartId::from("1-100"), UserId::new(1));

        _ = cart.add_or_increment(&ProductId::from("1"), &catalog);
        _ = cart.add_or_increment(&ProductId::from("2"), &catalog);
        _ = cart.add_or_increment(&ProductId::from("2"), &catalog);

        let text = rendered(|out| write_cart(out, &cart, &catalog, iso::VND))?;

        assert!(text.contains("Kettle"), "missing Kettle in:\n{text}");
        assert!(text.contains(&format_money(80_000, iso::VND)?), "missing line total in:\n{text}");
        assert!(
            text.contains(&format!("Items: 3  Total: {}", format_money(330_000, iso::VND)?)),
            "missing summary in:\n{text}"
        );

        Ok(())
    }

    #[test]
    fn cart_line_for_unknown_product_is_shown_by_id() -> TestResult {
        let mut cart = Cart::new(CartId::from("1-100"), UserId::new(1));

        _ = cart.add_or_increment(&ProductId::from("99"), &Catalog::new());

        let text = rendered(|out| write_cart(out, &cart, &catalog(), iso::VND))?;

        assert!(text.contains("99"), "missing product id in:\n{text}");
        assert!(
            text.contains(&format!("Total: {}", format_money(0, iso::VND)?)),
            "expected zero total in:\n{text}"
        );

        Ok(())
    }

    #[test]
    fn empty_cart_says_so() -> TestResult {
        let cart = Cart::new(CartId::from("1-100"), UserId::new(1));

        let text = rendered(|out| write_cart(out, &cart, &catalog(), iso::VND))?;

        assert_eq!(text, "Your cart is empty.\n");

        Ok(())
    }

    #[test]
    fn order_uses_snapshot_prices() -> TestResult {
        let order = OrderRecord {
            id: OrderId::from("o1"),
            user_id: UserId::new(1),
            products: vec![ProductSnapshot {
                id: ProductId::from("1"),
                name: "Old Kettle".to_string(),
                price: 100_000,
                description: String::new(),
                image_url: None,
                quantity: 2,
            }],
            total: 200_000,
            date: Timestamp::UNIX_EPOCH,
        };

        let text = rendered(|out| write_order(out, &order, iso::VND))?;

        assert!(text.starts_with("Order o1 placed"), "unexpected heading in:\n{text}");
        assert!(text.contains("Old Kettle"), "missing snapshot name in:\n{text}");
        assert!(
            text.contains(&format!("Total: {}", format_money(200_000, iso::VND)?)),
            "missing total in:\n{text}"
        );

        let history = rendered(|out| write_orders(out, std::slice::from_ref(&order), iso::VND))?;

        assert!(history.contains("o1"), "missing order id in:\n{history}");

        Ok(())
    }

    #[test]
    fn empty_history_says_so() -> TestResult {
        let text = rendered(|out| write_orders(out, &[], iso::VND))?;

        assert_eq!(text, "No orders yet.\n");

        Ok(())
    }

    #[test]
    fn oversized_amount_is_an_error() {
        let result = format_money(u64::MAX, iso::VND);

        assert_eq!(result, Err(PricingError::AmountOutOfRange(u64::MAX)));
    }
}
