//! Cache Config

use std::path::PathBuf;

use clap::Args;

/// Local cart mirror settings.
#[derive(Debug, Args)]
pub struct CacheConfig {
    /// Directory holding the per-user cart mirror
    #[arg(long, env = "STOREFRONT_CACHE_DIR", default_value = ".storefront")]
    pub cache_dir: PathBuf,
}
