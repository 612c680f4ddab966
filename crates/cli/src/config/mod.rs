//! Command-line configuration

use clap::Parser;

use crate::{
    commands::Command,
    config::{
        api::ApiConfig, cache::CacheConfig, display::DisplayConfig, logging::LoggingConfig,
        session::SessionConfig,
    },
};

pub(crate) mod api;
pub(crate) mod cache;
pub(crate) mod display;
pub(crate) mod logging;
pub(crate) mod session;

/// Storefront cart client configuration
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront shopping cart client", long_about = None)]
pub struct CliConfig {
    /// Resource store settings.
    #[command(flatten)]
    pub api: ApiConfig,

    /// Signed-in user.
    #[command(flatten)]
    pub session: SessionConfig,

    /// Local cart mirror settings.
    #[command(flatten)]
    pub cache: CacheConfig,

    /// Output settings.
    #[command(flatten)]
    pub display: DisplayConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rusty_money::iso;
    use storefront::{ids::UserId, session::Role};
    use testresult::TestResult;

    use crate::{
        commands::{CartAction, CheckoutAction},
        config::logging::LogFormat,
    };

    use super::*;

    #[test]
    fn explicit_arguments_are_parsed() -> TestResult {
        let config = CliConfig::try_parse_from([
            "storefront",
            "--api-url",
            "http://store.test/api",
            "--timeout-seconds",
            "3",
            "--user-id",
            "7",
            "--role",
            "manager",
            "--cache-dir",
            "/tmp/carts",
            "--currency",
            "usd",
            "--log-format",
            "json",
            "cart",
            "add",
            "42",
        ])?;

        assert_eq!(config.api.api_url, "http://store.test/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(3));
        assert_eq!(config.session.session().user_id(), UserId::new(7));
        assert_eq!(config.session.session().role(), Role::Manager);
        assert_eq!(config.cache.cache_dir.to_str(), Some("/tmp/carts"));
        assert_eq!(config.display.currency.iso_alpha_code, iso::USD.iso_alpha_code);
        assert!(
            matches!(config.logging.log_format, LogFormat::Json),
            "expected Json, got {:?}",
            config.logging.log_format
        );
        assert!(
            matches!(
                &config.command,
                Command::Cart { action: CartAction::Add { product } } if product == "42"
            ),
            "expected cart add, got {:?}",
            config.command
        );

        Ok(())
    }

    #[test]
    fn checkout_retry_clear_is_parsed() -> TestResult {
        let config = CliConfig::try_parse_from([
            "storefront",
            "--user-id",
            "1",
            "checkout",
            "retry-clear",
        ])?;

        assert!(
            matches!(
                config.command,
                Command::Checkout { action: Some(CheckoutAction::RetryClear) }
            ),
            "expected retry-clear, got {:?}",
            config.command
        );

        Ok(())
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result =
            CliConfig::try_parse_from(["storefront", "--user-id", "1", "--role", "owner", "orders"]);

        assert!(result.is_err(), "expected a parse error, got {result:?}");
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let result =
            CliConfig::try_parse_from(["storefront", "--user-id", "1", "--currency", "zzz", "orders"]);

        assert!(result.is_err(), "expected a parse error, got {result:?}");
    }

    #[test]
    fn non_numeric_user_is_rejected() {
        let result = CliConfig::try_parse_from(["storefront", "--user-id", "alice", "products"]);

        assert!(result.is_err(), "expected a parse error, got {result:?}");
    }
}
