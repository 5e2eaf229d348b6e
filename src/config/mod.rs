use std::path::Path;

use serde::Deserialize;
use tokio::sync::OnceCell;
use url::Url;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{find_config_file, read_config, read_config_from};

mod error;
pub use error::{ConfigError, ConfigResult};

#[derive(Debug, Deserialize)]
pub struct Config {
    api: Api,
}

#[derive(Debug, Deserialize)]
pub struct Api {
    base_url: String,
    #[serde(default)]
    token: Option<String>,
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                let read_cfg = |use_local| -> ConfigResult<Self> {
                    let bytes = read_config(use_local)?;
                    Self::from_slice(&bytes)
                };

                match read_cfg(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        if !matches!(e, ConfigError::ConfigNotFound) {
                            crate::error::log_error(&e);
                        }
                        tracing::error!("Config not found.");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        Self::from_slice(&read_config_from(path)?)
    }

    pub fn from_slice(bytes: &[u8]) -> ConfigResult<Self> {
        let mut config: Self = toml::from_slice(bytes)?;
        Url::parse(&config.api.base_url)?;
        // an empty token in the file means no token
        config.api.token = config.api.token.filter(|t| !t.trim().is_empty());
        Ok(config)
    }

    #[inline]
    pub fn api(&self) -> &Api {
        &self.api
    }
}

impl Api {
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
