pub mod config;
pub mod context;
pub mod progress;

use ascent_core::{Config, HttpProgressService};

/// HTTP remote built from `[remote]` config.
fn http_remote(config: &Config) -> Result<HttpProgressService, Box<dyn std::error::Error>> {
    let base_url = config
        .remote
        .base_url
        .as_deref()
        .ok_or("remote.base_url is not set (ascent config set remote.base_url <url>)")?;
    Ok(HttpProgressService::new(
        base_url,
        config.remote.token.clone(),
        config.remote.timeout(),
    )?)
}
