//! [`CatalogSource`] backed by the WooCommerce REST API v3.
//!
//! Every product listing passes `status=any` so drafts, pending and private
//! products are synced alongside published ones. Listings page through
//! `page=1,2,...` until a short or empty page, or until the page count from
//! `X-WP-TotalPages` is reached. A 404 on a listing page fails the whole
//! listing.

mod convert;
mod types;

use std::time::Duration;

use bubblehouse_core::WooCommerceConfig;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::CatalogError;
use crate::rate_limit::retry_with_backoff;
use crate::source::{CatalogSource, SourceProduct, SourceTerm, TermMetadata};
use types::{WooCategory, WooId, WooMembership, WooProduct, WooVariation};

const USER_AGENT: &str = "bubblehouse-sync/0.1 (catalog-sync)";
const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// WooCommerce REST client implementing [`CatalogSource`].
pub struct WooCommerceSource {
    client: Client,
    /// `{store}/wp-json/wc/v3/`, always with a trailing slash.
    api_base: Url,
    consumer_key: String,
    consumer_secret: String,
    page_size: u32,
    inter_request_delay_ms: u64,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl std::fmt::Debug for WooCommerceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooCommerceSource")
            .field("api_base", &self.api_base.as_str())
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl WooCommerceSource {
    /// Creates a source for the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidStoreUrl`] if the store URL cannot be
    /// parsed, or [`CatalogError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &WooCommerceConfig, timeout_secs: u64) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        let normalised = format!("{}/wp-json/wc/v3/", config.store_url.trim_end_matches('/'));
        let api_base = Url::parse(&normalised).map_err(|e| CatalogError::InvalidStoreUrl {
            store_url: config.store_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_base,
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            page_size: config.page_size.max(1),
            inter_request_delay_ms: config.inter_request_delay_ms,
            max_retries: config.max_retries,
            backoff_base_secs: config.retry_backoff_base_secs,
        })
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, CatalogError> {
        let mut url = self
            .api_base
            .join(path)
            .map_err(|e| CatalogError::InvalidStoreUrl {
                store_url: self.api_base.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Performs one authenticated GET with retry.
    ///
    /// Returns the parsed body and the `X-WP-TotalPages` header when present.
    /// A 404 is [`CatalogError::NotFound`]; single-resource lookups turn it
    /// into `None` through [`found`].
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<(T, Option<u32>), CatalogError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(CatalogError::RateLimited {
                        url: url.to_string(),
                        retry_after_secs,
                    });
                }

                if status == StatusCode::NOT_FOUND {
                    return Err(CatalogError::NotFound {
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(CatalogError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let total_pages = response
                    .headers()
                    .get(TOTAL_PAGES_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse::<u32>().ok());

                let body = response.text().await?;
                let parsed =
                    serde_json::from_str::<T>(&body).map_err(|e| CatalogError::Deserialize {
                        context: format!("response from {}", url.path()),
                        source: e,
                    })?;

                Ok((parsed, total_pages))
            }
        })
        .await
    }

    /// Collects every item of a paginated listing.
    ///
    /// All-or-nothing: a failure on any page discards the pages already read.
    async fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, CatalogError> {
        let mut items: Vec<T> = Vec::new();
        let mut page = 1u32;

        loop {
            if page > 1 && self.inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.inter_request_delay_ms)).await;
            }

            let mut page_query = query.to_vec();
            page_query.push(("per_page", self.page_size.to_string()));
            page_query.push(("page", page.to_string()));
            let url = self.endpoint(path, &page_query)?;

            let (batch, total_pages) = self.get_json::<Vec<T>>(url).await?;

            let batch_len = batch.len();
            items.extend(batch);

            let last_by_header = total_pages.is_some_and(|total| page >= total);
            let short_page = batch_len < self.page_size as usize;
            if batch_len == 0 || last_by_header || short_page {
                break;
            }
            page += 1;
        }

        tracing::debug!(path, count = items.len(), pages = page, "woocommerce: listing fetched");
        Ok(items)
    }
}

impl CatalogSource for WooCommerceSource {
    async fn list_product_ids(&self) -> Result<Vec<u64>, CatalogError> {
        let ids: Vec<WooId> = self
            .fetch_all_pages(
                "products",
                &[
                    ("status", "any".to_string()),
                    ("orderby", "id".to_string()),
                    ("order", "asc".to_string()),
                    ("_fields", "id".to_string()),
                ],
            )
            .await?;
        Ok(ids.into_iter().map(|w| w.id).collect())
    }

    async fn get_product(&self, id: u64) -> Result<Option<SourceProduct>, CatalogError> {
        let url = self.endpoint(&format!("products/{id}"), &[])?;
        let Some((product, _)) = found(self.get_json::<WooProduct>(url).await)? else {
            return Ok(None);
        };

        let variations: Vec<WooVariation> = if product.product_type == "variable" {
            self.fetch_all_pages(&format!("products/{id}/variations"), &[])
                .await?
        } else {
            Vec::new()
        };

        convert::into_source_product(product, variations).map(Some)
    }

    async fn list_terms(&self) -> Result<Vec<SourceTerm>, CatalogError> {
        let categories: Vec<WooCategory> = self
            .fetch_all_pages("products/categories", &[("hide_empty", "false".to_string())])
            .await?;
        Ok(categories.into_iter().map(convert::into_source_term).collect())
    }

    async fn term_metadata(&self, term_id: u64) -> Result<TermMetadata, CatalogError> {
        let url = self.endpoint(&format!("products/categories/{term_id}"), &[])?;
        let thumbnail_url = found(self.get_json::<WooCategory>(url).await)?
            .and_then(|(category, _)| category.image)
            .map(|image| image.src)
            .filter(|src| !src.is_empty());
        Ok(TermMetadata { thumbnail_url })
    }

    /// Products assigned to the term itself. The `category` filter also
    /// matches products in descendant categories, so those are dropped here.
    async fn list_product_ids_in_term(&self, term_id: u64) -> Result<Vec<u64>, CatalogError> {
        let members: Vec<WooMembership> = self
            .fetch_all_pages(
                "products",
                &[
                    ("category", term_id.to_string()),
                    ("status", "any".to_string()),
                    ("orderby", "id".to_string()),
                    ("order", "asc".to_string()),
                    ("_fields", "id,categories".to_string()),
                ],
            )
            .await?;
        Ok(members
            .into_iter()
            .filter(|m| m.categories.iter().any(|c| c.id == term_id))
            .map(|m| m.id)
            .collect())
    }
}

/// Maps [`CatalogError::NotFound`] to `Ok(None)`.
fn found<T>(result: Result<T, CatalogError>) -> Result<Option<T>, CatalogError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CatalogError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
