use std::io;

use rusty_money::iso::Currency;
use storefront_app::session::CartSession;

use crate::{
    commands::{CommandError, refresh, write_status},
    render::write_order,
};

pub(super) async fn run(
    cart: &mut CartSession,
    currency: &'static Currency,
    out: &mut impl io::Write,
) -> Result<(), CommandError> {
    refresh(cart).await;

    match cart.checkout().await {
        Ok(order) => {
            writeln!(out, "Order placed.")?;
            write_order(out, &order, currency)?;

            Ok(())
        }
        Err(error) => {
            write_status(out, cart)?;

            Err(error.into())
        }
    }
}

pub(super) async fn retry_clear(
    cart: &mut CartSession,
    out: &mut impl io::Write,
) -> Result<(), CommandError> {
    let had_pending = cart.pending_clear().is_some();

    refresh(cart).await;

    // An empty remote cart resolves the clear during refresh.
    if had_pending && cart.pending_clear().is_none() {
        writeln!(out, "Cart is already clear.")?;

        return Ok(());
    }

    cart.retry_clear().await?;

    writeln!(out, "Cart cleared.")?;

    Ok(())
}
