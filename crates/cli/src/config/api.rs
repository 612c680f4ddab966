//! Resource Store Config

use std::time::Duration;

use clap::Args;

/// Resource store connection settings.
#[derive(Debug, Args)]
pub struct ApiConfig {
    /// Base URL of the REST resource store
    #[arg(long, env = "STOREFRONT_API_URL", default_value = "http://localhost:5000")]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "STOREFRONT_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub timeout_seconds: u64,
}

impl ApiConfig {
    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
