use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-level configuration, loaded once at startup.
///
/// The Bubblehouse credentials are deliberately NOT part of this struct: they
/// are re-read at the start of every sync cycle through a
/// [`crate::SettingsSource`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// YAML file holding the sync settings. `None` reads them from env vars.
    pub settings_path: Option<PathBuf>,
    /// Path segment in `/api/{version}/{shop}/UpdateProducts3`.
    pub api_version: String,
    /// Path segment in `/blocks/{version}/{shop}/{page}`.
    pub block_version: String,
    pub sync_interval_secs: u64,
    pub sync_timeout_secs: u64,
    /// Store credentials; `None` when `WOOCOMMERCE_URL` is not set.
    pub woocommerce: Option<WooCommerceConfig>,
}

#[derive(Clone)]
pub struct WooCommerceConfig {
    pub store_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub page_size: u32,
    pub inter_request_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

impl std::fmt::Debug for WooCommerceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceConfig")
            .field("store_url", &self.store_url)
            .field("consumer_key", &"[redacted]")
            .field("consumer_secret", &"[redacted]")
            .field("page_size", &self.page_size)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .finish()
    }
}
