//! The catalog data source capability and the store-side product model.
//!
//! A source answers five questions: which products exist (whatever their
//! publication status), what a given product looks like, which category
//! terms exist, what metadata a term carries, and which products belong to a
//! term. Everything is resolved into closed types here so the extractor never
//! has to probe a product for optional behaviour.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Status value of a product visible on the public storefront.
pub const PUBLISHED_STATUS: &str = "publish";

/// Read-only access to the store's catalog.
///
/// Every listing must be complete: implementations that page through a
/// remote API keep going until the last page, with no upper bound.
pub trait CatalogSource: Send + Sync {
    /// Ids of every product, including drafts and private products.
    fn list_product_ids(&self) -> impl Future<Output = Result<Vec<u64>, CatalogError>> + Send;

    /// Loads one product. `Ok(None)` when it no longer exists.
    fn get_product(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Option<SourceProduct>, CatalogError>> + Send;

    /// Every product category term, including terms with no products.
    fn list_terms(&self) -> impl Future<Output = Result<Vec<SourceTerm>, CatalogError>> + Send;

    /// Metadata attached to a category term.
    fn term_metadata(
        &self,
        term_id: u64,
    ) -> impl Future<Output = Result<TermMetadata, CatalogError>> + Send;

    /// Ids of every product in a term, whatever their publication status.
    fn list_product_ids_in_term(
        &self,
        term_id: u64,
    ) -> impl Future<Output = Result<Vec<u64>, CatalogError>> + Send;
}

/// A product as the store holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProduct {
    pub id: u64,
    pub title: String,
    pub slug: String,
    /// Publication status, e.g. `"publish"`, `"draft"`, `"private"`.
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// URL of the primary image, if the product has one.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<u64>,
    #[serde(flatten)]
    pub kind: ProductKind,
}

impl SourceProduct {
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == PUBLISHED_STATUS
    }
}

/// How a product turns into variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProductKind {
    /// Sold as-is; one variant is synthesized from the product itself.
    Simple {
        /// Raw price string; empty or absent when no price is set.
        #[serde(default)]
        price: Option<String>,
    },
    /// Sold through child variations, in source order.
    Variable {
        #[serde(default)]
        variations: Vec<SourceVariation>,
    },
}

/// A child variation of a variable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceVariation {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub price: Option<String>,
}

/// A product category term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTerm {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

/// Metadata attached to a category term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermMetadata {
    /// Resolved URL of the term's thumbnail, when it has one.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}
