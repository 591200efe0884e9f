//! Embed URLs for the storefront widget.

use bubblehouse_core::SyncSettings;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;

use crate::token::{issue_token_at, DEFAULT_TOKEN_VALIDITY_SECS};

/// Widget page shown when none is requested.
pub const DEFAULT_EMBED_PAGE: &str = "Rewards7";

/// Text shown in place of the widget when settings are incomplete.
pub const MISSING_CONFIGURATION_PLACEHOLDER: &str =
    "Bubblehouse: Missing required configuration (host, shopSlug, kid, sharedSecret)";

/// What the storefront should render for one widget page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmbedTarget {
    Frame {
        iframe_url: String,
        script_url: String,
    },
    MissingConfiguration {
        placeholder: &'static str,
    },
}

impl EmbedTarget {
    fn missing() -> Self {
        Self::MissingConfiguration {
            placeholder: MISSING_CONFIGURATION_PLACEHOLDER,
        }
    }
}

/// Builds the embed target for `page`, signed for `customer_id` when the
/// visitor has a customer session.
#[must_use]
pub fn embed_target(
    settings: Option<&SyncSettings>,
    block_version: &str,
    page: &str,
    customer_id: Option<&str>,
) -> EmbedTarget {
    embed_target_at(settings, block_version, page, customer_id, Utc::now())
}

/// [`embed_target`] with an explicit issue time.
#[must_use]
pub fn embed_target_at(
    settings: Option<&SyncSettings>,
    block_version: &str,
    page: &str,
    customer_id: Option<&str>,
    now: DateTime<Utc>,
) -> EmbedTarget {
    let Some(settings) = settings else {
        return EmbedTarget::missing();
    };

    let subject = match customer_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => format!("{}/{id}", settings.shop_slug),
        None => settings.shop_slug.clone(),
    };
    let page = Some(page.trim())
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_EMBED_PAGE);

    let token = match issue_token_at(
        &subject,
        &settings.key_id,
        &settings.shared_secret_base64,
        DEFAULT_TOKEN_VALIDITY_SECS,
        now,
    ) {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "embed: cannot sign widget token");
            return EmbedTarget::missing();
        }
    };

    let base = settings.base_url();
    let Ok(mut iframe_url) = Url::parse(&format!(
        "{base}/blocks/{block_version}/{}/{page}",
        settings.shop_slug
    )) else {
        tracing::warn!(host = %settings.host, "embed: host does not form a valid URL");
        return EmbedTarget::missing();
    };
    iframe_url
        .query_pairs_mut()
        .append_pair("instance", "bhpage")
        .append_pair("auth", token.as_str());

    EmbedTarget::Frame {
        iframe_url: iframe_url.into(),
        script_url: format!("{base}/s/{}/bubblehouse.js", settings.shop_slug),
    }
}
