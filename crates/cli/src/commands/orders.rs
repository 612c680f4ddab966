use std::io;

use rusty_money::iso::Currency;
use storefront_app::session::CartSession;

use crate::{commands::CommandError, render::write_orders};

pub(super) async fn run(
    cart: &CartSession,
    currency: &'static Currency,
    out: &mut impl io::Write,
) -> Result<(), CommandError> {
    let orders = cart.orders().await?;

    write_orders(out, &orders, currency)?;

    Ok(())
}
