//! Storefront cart client

use std::{error::Error, io, process};

use tracing::{debug, error};

use storefront_app::context::AppContext;

use crate::config::CliConfig;

mod commands;
mod config;
mod observability;
mod render;

/// Storefront command-line entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = CliConfig::load().unwrap_or_else(|e| e.exit());

    if let Err(init_error) = observability::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("Logging error: {init_error}");
        }

        process::exit(1);
    }

    let session = config.session.session();

    debug!(user = %session.user_id(), role = %session.role(), api = %config.api.api_url, "starting");

    let app = match AppContext::from_api_url(
        &config.api.api_url,
        config.api.timeout(),
        &config.cache.cache_dir,
    ) {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");
            report(&init_error);

            process::exit(1);
        }
    };

    let mut out = io::stdout().lock();

    if let Err(command_error) = commands::run(
        config.command,
        &app,
        session,
        config.display.currency,
        &mut out,
    )
    .await
    {
        error!(error = %command_error, "command failed");
        report(&command_error);

        process::exit(1);
    }
}

/// Print the error and its sources for the user.
fn report(error: &dyn Error) {
    #[expect(
        clippy::print_stderr,
        reason = "user-facing error output, independent of the log level"
    )]
    {
        eprintln!("error: {error}");

        let mut source = error.source();

        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
    }
}
