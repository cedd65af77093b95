mod types;

pub use types::*;

use crate::Result;
use std::env;
use std::path::Path;
use tracing::debug;

/// Environment variable that overrides `endpoint.api_token`.
pub const API_TOKEN_ENV: &str = "PROMPT_API_TOKEN";

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(config_path).await
}

pub async fn load_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from: {}", path.display());

    let config_str = tokio::fs::read_to_string(path).await?;
    let mut config: Config = serde_yaml::from_str(&config_str)?;

    if let Ok(token) = env::var(API_TOKEN_ENV) {
        if !token.is_empty() {
            debug!("Using API token from {}", API_TOKEN_ENV);
            config.endpoint.api_token = token;
        }
    }

    config.validate()?;
    Ok(config)
}
