use serde::Deserialize;

/// Runtime settings of the blog server, loaded by the `config` crate from
/// `config/default.yaml`, an optional `config/local.yaml` and `APP__*`
/// environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// SQLite database file.
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// HMAC secret used to sign access tokens.
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_pool_size() -> u32 {
    8
}
