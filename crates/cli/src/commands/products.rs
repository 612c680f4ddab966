use std::io;

use rusty_money::iso::Currency;
use storefront_app::session::CartSession;

use crate::{commands::CommandError, render::write_products};

pub(super) async fn run(
    cart: &mut CartSession,
    currency: &'static Currency,
    out: &mut impl io::Write,
) -> Result<(), CommandError> {
    cart.refresh_catalog().await?;

    write_products(out, cart.catalog(), currency)?;

    Ok(())
}
