use bubblehouse_catalog::CatalogError;
use bubblehouse_core::ConfigError;
use thiserror::Error;

use crate::token::TokenError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("catalog extraction failed: {0}")]
    Extraction(#[from] CatalogError),

    #[error("invalid sync endpoint \"{url}\": {reason}")]
    InvalidEndpoint { url: String, reason: String },
}
