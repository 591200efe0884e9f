//! In-memory catalog, loadable from a JSON file.
//!
//! ```json
//! {
//!   "products": [
//!     { "id": 1, "title": "Mug", "slug": "mug", "status": "publish",
//!       "created_at": "2024-05-01T12:00:00Z", "updated_at": "2024-05-01T12:00:00Z",
//!       "category_ids": [7], "type": "simple", "price": "9.99" }
//!   ],
//!   "terms": [ { "id": 7, "name": "Kitchen", "slug": "kitchen" } ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::source::{CatalogSource, SourceProduct, SourceTerm, TermMetadata};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryCatalog {
    #[serde(default)]
    products: Vec<SourceProduct>,
    #[serde(default)]
    terms: Vec<MemoryTerm>,
}

#[derive(Debug, Clone, Deserialize)]
struct MemoryTerm {
    #[serde(flatten)]
    term: SourceTerm,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_product(mut self, product: SourceProduct) -> Self {
        self.products.push(product);
        self
    }

    #[must_use]
    pub fn with_term(mut self, term: SourceTerm, thumbnail_url: Option<&str>) -> Self {
        self.terms.push(MemoryTerm {
            term,
            thumbnail_url: thumbnail_url.map(str::to_string),
        });
        self
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::FixtureIo`] if the file cannot be read and
    /// [`CatalogError::Deserialize`] if it does not match the expected shape.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::FixtureIo {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&content, &path.display().to_string())
    }

    /// Parses a catalog from a JSON string; `context` names it in errors.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Deserialize`] if `json` does not match the
    /// expected shape.
    pub fn from_json_str(json: &str, context: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|e| CatalogError::Deserialize {
            context: format!("catalog file {context}"),
            source: e,
        })
    }
}

impl CatalogSource for MemoryCatalog {
    async fn list_product_ids(&self) -> Result<Vec<u64>, CatalogError> {
        Ok(self.products.iter().map(|p| p.id).collect())
    }

    async fn get_product(&self, id: u64) -> Result<Option<SourceProduct>, CatalogError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_terms(&self) -> Result<Vec<SourceTerm>, CatalogError> {
        Ok(self.terms.iter().map(|t| t.term.clone()).collect())
    }

    async fn term_metadata(&self, term_id: u64) -> Result<TermMetadata, CatalogError> {
        Ok(self
            .terms
            .iter()
            .find(|t| t.term.id == term_id)
            .map(|t| TermMetadata {
                thumbnail_url: t.thumbnail_url.clone(),
            })
            .unwrap_or_default())
    }

    async fn list_product_ids_in_term(&self, term_id: u64) -> Result<Vec<u64>, CatalogError> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.category_ids.contains(&term_id))
            .map(|p| p.id)
            .collect())
    }
}
