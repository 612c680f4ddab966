//! Display Config

use clap::Args;
use rusty_money::iso::{self, Currency};

/// Output settings.
#[derive(Debug, Args)]
pub struct DisplayConfig {
    /// ISO 4217 code of the currency prices are stored in, in minor units
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "VND", value_parser = parse_currency)]
    pub currency: &'static Currency,
}

fn parse_currency(code: &str) -> Result<&'static Currency, String> {
    iso::find(&code.trim().to_ascii_uppercase()).ok_or_else(|| format!("unknown currency code: {code}"))
}
