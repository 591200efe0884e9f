pub mod app_config;
pub mod catalog;
pub mod config;
pub mod settings;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, WooCommerceConfig};
pub use catalog::{Collection, Product, SyncPayload, Variant};
pub use config::{load_app_config, load_app_config_from_env};
pub use settings::{RawSettings, SettingsSource, SyncSettings, DEFAULT_HOST};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read settings file {path}: {source}")]
    SettingsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {0}")]
    SettingsFileParse(#[from] serde_yaml::Error),

    #[error("missing required configuration ({})", missing.join(", "))]
    IncompleteSettings { missing: Vec<&'static str> },
}
