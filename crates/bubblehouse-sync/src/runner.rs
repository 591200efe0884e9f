//! One full sync cycle: settings, extraction, token, delivery.
//!
//! A cycle never returns an error. Every failure is classified into a
//! [`CycleOutcome`], logged once and remembered as the last report.

use bubblehouse_catalog::{CatalogExtractor, CatalogSource};
use bubblehouse_core::SettingsSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::client::{sync_endpoint, SyncClient, SyncResult};
use crate::error::SyncError;
use crate::base64url;
use crate::token::{issue_token, TokenError, DEFAULT_TOKEN_VALIDITY_SECS};

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Settings are incomplete or unusable; nothing was extracted or sent.
    ConfigurationMissing { reason: String },
    /// The catalog could not be read; nothing was sent.
    ExtractionFailed { reason: String },
    Delivered {
        products: usize,
        variants: usize,
        collections: usize,
    },
    Rejected { status: u16 },
    TransportFailed { message: String },
}

impl CycleOutcome {
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

impl std::fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigurationMissing { reason } => write!(f, "configuration missing: {reason}"),
            Self::ExtractionFailed { reason } => write!(f, "catalog extraction failed: {reason}"),
            Self::Delivered {
                products,
                variants,
                collections,
            } => write!(
                f,
                "delivered {products} products ({variants} variants) and {collections} collections"
            ),
            Self::Rejected { status } => write!(f, "delivery rejected with HTTP status {status}"),
            Self::TransportFailed { message } => write!(f, "transport error: {message}"),
        }
    }
}

impl From<SyncError> for CycleOutcome {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Extraction(e) => Self::ExtractionFailed {
                reason: e.to_string(),
            },
            SyncError::Client(e) => Self::TransportFailed {
                message: e.to_string(),
            },
            e @ (SyncError::Config(_) | SyncError::Token(_) | SyncError::InvalidEndpoint { .. }) => {
                Self::ConfigurationMissing {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// A finished cycle, as reported by the control API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: CycleOutcome,
}

/// Runs sync cycles for one shop against one catalog source.
///
/// Cycles are serialized: a cycle requested while another is running waits
/// for it to finish.
pub struct SyncRunner<S> {
    source: S,
    settings: SettingsSource,
    api_version: String,
    client: SyncClient,
    cycle_lock: Mutex<()>,
    last_report: Mutex<Option<CycleReport>>,
}

impl<S: CatalogSource> SyncRunner<S> {
    /// # Errors
    ///
    /// Returns [`SyncError::Client`] if the delivery client cannot be built.
    pub fn new(
        source: S,
        settings: SettingsSource,
        api_version: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, SyncError> {
        Ok(Self {
            source,
            settings,
            api_version: api_version.into(),
            client: SyncClient::new(timeout_secs)?,
            cycle_lock: Mutex::new(()),
            last_report: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn settings_source(&self) -> &SettingsSource {
        &self.settings
    }

    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// The most recent finished cycle, if any.
    pub async fn last_report(&self) -> Option<CycleReport> {
        self.last_report.lock().await.clone()
    }

    /// Runs one cycle to completion and logs its outcome.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let _cycle = self.cycle_lock.lock().await;
        let started_at = Utc::now();

        let outcome = match self.execute().await {
            Ok(outcome) => outcome,
            Err(e) => CycleOutcome::from(e),
        };
        log_outcome(&outcome);

        *self.last_report.lock().await = Some(CycleReport {
            started_at,
            finished_at: Utc::now(),
            outcome: outcome.clone(),
        });
        outcome
    }

    async fn execute(&self) -> Result<CycleOutcome, SyncError> {
        let settings = self.settings.load()?;
        let endpoint = sync_endpoint(&settings, &self.api_version)?;
        // The secret is checked before the catalog is read.
        base64url::decode_secret(&settings.shared_secret_base64)
            .map_err(TokenError::InvalidSecret)?;

        tracing::info!(shop = %settings.shop_slug, "sync: cycle started");

        let payload = CatalogExtractor::new(&self.source).extract_payload().await?;
        let token = issue_token(
            &settings.shop_slug,
            &settings.key_id,
            &settings.shared_secret_base64,
            DEFAULT_TOKEN_VALIDITY_SECS,
        )?;

        let outcome = match self.client.send(&payload, &token, &endpoint).await {
            SyncResult::Success => CycleOutcome::Delivered {
                products: payload.products.len(),
                variants: payload.variant_count(),
                collections: payload.collections.len(),
            },
            SyncResult::Rejected(status) => CycleOutcome::Rejected { status },
            SyncResult::TransportError(message) => CycleOutcome::TransportFailed { message },
        };
        Ok(outcome)
    }
}

fn log_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::ConfigurationMissing { .. } => {
            tracing::warn!("sync: cycle skipped, {outcome}");
        }
        CycleOutcome::Delivered {
            products,
            variants,
            collections,
        } => {
            tracing::info!(products, variants, collections, "sync: {outcome}");
        }
        CycleOutcome::Rejected { status } => {
            tracing::error!(status, "sync: {outcome}");
        }
        CycleOutcome::ExtractionFailed { .. } | CycleOutcome::TransportFailed { .. } => {
            tracing::error!("sync: {outcome}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_display_names_status_and_message() {
        assert_eq!(
            CycleOutcome::Rejected { status: 500 }.to_string(),
            "delivery rejected with HTTP status 500"
        );
        assert_eq!(
            CycleOutcome::TransportFailed {
                message: "connection refused".to_string()
            }
            .to_string(),
            "transport error: connection refused"
        );
    }

    #[test]
    fn configuration_and_token_errors_classify_as_configuration_missing() {
        let config = SyncError::Config(bubblehouse_core::ConfigError::IncompleteSettings {
            missing: vec!["shopSlug"],
        });
        let outcome = CycleOutcome::from(config);
        assert!(matches!(
            outcome,
            CycleOutcome::ConfigurationMissing { ref reason } if reason.contains("shopSlug")
        ));

        let token = SyncError::Token(crate::token::TokenError::NonPositiveValidity(0));
        assert!(matches!(
            CycleOutcome::from(token),
            CycleOutcome::ConfigurationMissing { .. }
        ));
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let json = serde_json::to_value(CycleOutcome::Rejected { status: 401 }).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "rejected", "status": 401 }));
    }
}
