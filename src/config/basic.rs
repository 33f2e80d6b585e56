use serde::{Deserialize, Serialize};

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BasicConfig {
    /// Store URL. `postgresql://` (PostgreSQL, CockroachDB) or `sqlite:`.
    /// TOML: `basic.database_url`. Env: `INVENTORY_BASIC__DATABASE_URL`.
    /// Default: `sqlite://inventory.db?mode=rwc`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Upper bound on pooled store connections.
    /// TOML: `basic.max_connections`. Default: `4`.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a free pooled connection.
    /// TOML: `basic.acquire_timeout_secs`. Default: `10`.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            loglevel: default_loglevel(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://inventory.db?mode=rwc".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_max_connections() -> u32 {
    4
}

fn default_acquire_timeout_secs() -> u64 {
    10
}
