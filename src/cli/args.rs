use clap::Parser;
use figment::providers::Serialized;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::InventoryError;

/// Interactive shop inventory over a serializable SQL store.
#[derive(Debug, Parser)]
#[command(name = "inventory-ledger", version)]
pub struct Cli {
    /// Database connection string.
    ///
    /// CockroachDB: `postgresql://<user>:<password>@<host>:26257/bank?sslmode=require`.
    /// SQLite: `sqlite://inventory.db?mode=rwc`.
    pub dsn: Option<String>,

    /// Print debug info.
    #[arg(short, long)]
    pub verbose: bool,

    /// TOML config file; defaults to ./inventory.toml when present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Config file and environment, overridden by whatever was given on the command line.
    pub fn load_config(&self) -> Result<Config, InventoryError> {
        let mut figment = Config::figment(self.config.as_deref())?;
        if let Some(dsn) = &self.dsn {
            figment = figment.merge(Serialized::default("basic.database_url", dsn));
        }
        if self.verbose {
            figment = figment.merge(Serialized::default("basic.loglevel", "debug"));
        }
        Config::from_figment(&figment)
    }
}
