//! Calendar providers shipped with the server.
pub mod sportsdb;

use anyhow::Result;
use reqwest::Client;

use crate::core::AppConfig;
use crate::integration::Registry;

/// Build the registry of every integration this process serves.
pub fn registry(config: &AppConfig) -> Result<Registry> {
    let client = Client::builder().timeout(config.http_timeout()).build()?;

    let mut registry = Registry::new();
    registry.register(sportsdb::integration(config, client)?)?;

    Ok(registry)
}
