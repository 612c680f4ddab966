use std::io;

use rusty_money::iso::Currency;
use storefront::{carts::CartChange, products::ProductId};
use storefront_app::session::{CartSession, CartSessionError};
use tracing::{info, warn};

use crate::{
    commands::{CartAction, CommandError, refresh, write_status},
    render::write_cart,
};

pub(super) async fn run(
    cart: &mut CartSession,
    action: CartAction,
    currency: &'static Currency,
    out: &mut impl io::Write,
) -> Result<(), CommandError> {
    refresh(cart).await;

    let result = match action {
        CartAction::Show => {
            load_catalog(cart).await;

            Ok(CartChange::Unchanged)
        }
        CartAction::Add { product } => cart.add(&ProductId::from(product)).await,
        CartAction::Increase { product } => {
            let product = ProductId::from(product);

            missing_line(cart.increase(&product).await, &product, out)?
        }
        CartAction::Decrease { product } => {
            let product = ProductId::from(product);

            missing_line(cart.decrease(&product).await, &product, out)?
        }
        CartAction::Remove { product } => {
            let product = ProductId::from(product);

            missing_line(cart.remove(&product).await, &product, out)?
        }
        CartAction::Sync => {
            load_catalog(cart).await;

            cart.sync().await.map(|write| {
                info!(cart = %write.id(), "cart synced");

                CartChange::Applied
            })
        }
    };

    write_cart(out, cart.cart(), cart.catalog(), currency)?;
    write_status(out, cart)?;

    result.map(|_change| ()).map_err(Into::into)
}

/// Load the catalog so the cart is shown with current names and prices.
async fn load_catalog(cart: &mut CartSession) {
    if let Err(error) = cart.refresh_catalog().await {
        warn!(%error, "showing the cart without current product details");
    }
}

/// Note a mutation that found no line for the product.
fn missing_line(
    result: Result<CartChange, CartSessionError>,
    product: &ProductId,
    out: &mut impl io::Write,
) -> Result<Result<CartChange, CartSessionError>, CommandError> {
    if matches!(result, Ok(CartChange::Unchanged)) {
        writeln!(out, "Product {product} is not in your cart.")?;
    }

    Ok(result)
}
