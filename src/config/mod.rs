mod basic;
mod retry;

pub use basic::BasicConfig;
pub use retry::RetryConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::InventoryError;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Store and logging settings (see `basic` table in inventory.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Transaction retry policy (see `retry` table in inventory.toml).
    #[serde(default)]
    pub retry: RetryConfig,
}

pub const DEFAULT_CONFIG_FILE: &str = "inventory.toml";
const ENV_PREFIX: &str = "INVENTORY_";

impl Config {
    /// Defaults, then the TOML file, then `INVENTORY_*` environment variables.
    ///
    /// Without an explicit path, `inventory.toml` in the working directory is used if present.
    /// Callers may merge further providers (e.g. command-line overrides) before calling
    /// [`Config::from_figment`].
    pub fn figment(config_file: Option<&Path>) -> Result<Figment, InventoryError> {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = match config_file {
            Some(path) if !path.is_file() => {
                return Err(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                ))
                .into());
            }
            Some(path) => figment.merge(Toml::file(path)),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
            }
            None => figment,
        };
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, InventoryError> {
        let cfg: Self = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(config_file: Option<&Path>) -> Result<Self, InventoryError> {
        Self::from_figment(&Self::figment(config_file)?)
    }

    fn validate(&self) -> Result<(), InventoryError> {
        if self.basic.database_url.trim().is_empty() {
            return Err(figment::Error::from("basic.database_url must be non-empty".to_string()).into());
        }
        if self.basic.max_connections == 0 {
            return Err(figment::Error::from("basic.max_connections must be at least 1".to_string()).into());
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(figment::Error::from(format!(
                "retry.max_delay_ms ({}) must not be below retry.base_delay_ms ({})",
                self.retry.max_delay_ms, self.retry.base_delay_ms
            ))
            .into());
        }
        Ok(())
    }
}
