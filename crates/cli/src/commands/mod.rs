//! Subcommands

use std::io;

use clap::Subcommand;
use rusty_money::iso::Currency;
use storefront::session::Session;
use storefront_app::{
    context::AppContext,
    session::{CartSession, CartSessionError},
};
use thiserror::Error;
use tracing::warn;

use crate::render::RenderError;

mod cart;
mod checkout;
mod orders;
mod products;

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the product catalog
    Products,

    /// Show or change the cart
    Cart {
        /// Cart operation
        #[command(subcommand)]
        action: CartAction,
    },

    /// Turn the cart into an order
    Checkout {
        /// Follow-up for an interrupted checkout
        #[command(subcommand)]
        action: Option<CheckoutAction>,
    },

    /// List past orders, newest first
    Orders,
}

/// Cart subcommands.
#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,

    /// Add one unit of a product, creating its line if needed
    Add {
        /// Product id
        product: String,
    },

    /// Add one unit to an existing line
    Increase {
        /// Product id
        product: String,
    },

    /// Take one unit off a line
    Decrease {
        /// Product id
        product: String,
    },

    /// Drop a line
    Remove {
        /// Product id
        product: String,
    },

    /// Write the local cart to the store again
    Sync,
}

/// Checkout follow-ups.
#[derive(Debug, Subcommand)]
pub enum CheckoutAction {
    /// Clear the cart of an order that was recorded but not cleared
    RetryClear,
}

/// Errors raised while running a subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The cart session failed.
    #[error(transparent)]
    Session(#[from] CartSessionError),

    /// Output could not be produced.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<io::Error> for CommandError {
    fn from(error: io::Error) -> Self {
        Self::Render(RenderError::Io(error))
    }
}

/// Run one subcommand for the signed-in user, writing its output to `out`.
///
/// # Errors
///
/// Returns a [`CommandError`] if the operation fails or output cannot be
/// written.
pub async fn run(
    command: Command,
    app: &AppContext,
    session: Session,
    currency: &'static Currency,
    out: &mut impl io::Write,
) -> Result<(), CommandError> {
    let mut cart = app.open_session(session);

    match command {
        Command::Products => products::run(&mut cart, currency, out).await,
        Command::Cart { action } => cart::run(&mut cart, action, currency, out).await,
        Command::Checkout { action: None } => checkout::run(&mut cart, currency, out).await,
        Command::Checkout {
            action: Some(CheckoutAction::RetryClear),
        } => checkout::retry_clear(&mut cart, out).await,
        Command::Orders => orders::run(&cart, currency, out).await,
    }
}

/// Pull the remote cart, falling back to the local copy when the store is
/// unreachable.
async fn refresh(cart: &mut CartSession) {
    if let Err(error) = cart.refresh().await {
        warn!(%error, "using the local cart copy");
    }
}

fn write_status(out: &mut impl io::Write, cart: &CartSession) -> Result<(), CommandError> {
    if let Some(order) = cart.pending_clear() {
        writeln!(
            out,
            "Order {} is recorded but the cart was not cleared. Run `storefront checkout retry-clear`.",
            order.id
        )?;
    } else if cart.is_stale() {
        writeln!(
            out,
            "The cart has changes the store has not seen. Run `storefront cart sync`."
        )?;
    }

    Ok(())
}
