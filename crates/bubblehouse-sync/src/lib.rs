pub mod base64url;
pub mod client;
pub mod embed;
pub mod error;
pub mod runner;
pub mod token;

pub use client::{sync_endpoint, SyncClient, SyncResult, DEFAULT_SYNC_TIMEOUT_SECS};
pub use embed::{
    embed_target, embed_target_at, EmbedTarget, DEFAULT_EMBED_PAGE,
    MISSING_CONFIGURATION_PLACEHOLDER,
};
pub use error::SyncError;
pub use runner::{CycleOutcome, CycleReport, SyncRunner};
pub use token::{
    issue_token, issue_token_at, AuthToken, Claims, TokenError, DEFAULT_TOKEN_VALIDITY_SECS,
    TOKEN_AUDIENCE,
};
