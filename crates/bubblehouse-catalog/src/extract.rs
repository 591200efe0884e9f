//! Mapping from the store's catalog to the Bubblehouse wire schema.
//!
//! Extraction is read-only and all-or-nothing: any source failure aborts the
//! whole pull so a partial catalog is never delivered.

use bubblehouse_core::{Collection, Product, SyncPayload, Variant};

use crate::error::CatalogError;
use crate::price::format_raw_price;
use crate::source::{CatalogSource, ProductKind, SourceProduct, SourceTerm, TermMetadata};

/// Pulls products and collections out of a [`CatalogSource`].
pub struct CatalogExtractor<'a, S> {
    source: &'a S,
}

impl<'a, S: CatalogSource> CatalogExtractor<'a, S> {
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Maps every product in the store, whatever its publication status.
    ///
    /// Products that disappear between the listing and the fetch are skipped.
    ///
    /// # Errors
    ///
    /// Propagates the first [`CatalogError`] returned by the source.
    pub async fn extract_products(&self) -> Result<Vec<Product>, CatalogError> {
        let ids = self.source.list_product_ids().await?;
        let mut products = Vec::with_capacity(ids.len());

        for id in ids {
            match self.source.get_product(id).await? {
                Some(product) => products.push(map_product(product)),
                None => {
                    tracing::warn!(
                        product_id = id,
                        "catalog: product listed but no longer exists; skipping"
                    );
                }
            }
        }

        Ok(products)
    }

    /// Maps every category term, including terms without products.
    ///
    /// Membership comes from the source's own term query rather than from
    /// the extracted product list.
    ///
    /// # Errors
    ///
    /// Propagates the first [`CatalogError`] returned by the source.
    pub async fn extract_collections(&self) -> Result<Vec<Collection>, CatalogError> {
        let terms = self.source.list_terms().await?;
        let mut collections = Vec::with_capacity(terms.len());

        for term in terms {
            let metadata = self.source.term_metadata(term.id).await?;
            let member_ids = self.source.list_product_ids_in_term(term.id).await?;
            collections.push(map_collection(term, &metadata, &member_ids));
        }

        Ok(collections)
    }

    /// Extracts products then collections into an incremental payload.
    ///
    /// # Errors
    ///
    /// Propagates the first [`CatalogError`] returned by the source.
    pub async fn extract_payload(&self) -> Result<SyncPayload, CatalogError> {
        let products = self.extract_products().await?;
        let collections = self.extract_collections().await?;
        tracing::debug!(
            products = products.len(),
            collections = collections.len(),
            "catalog: extraction complete"
        );
        Ok(SyncPayload::incremental(products, collections))
    }
}

/// Maps one store product to its wire shape.
#[must_use]
pub fn map_product(product: SourceProduct) -> Product {
    let inactive = !product.is_published();
    let id = product.id.to_string();

    let variants = match product.kind {
        ProductKind::Simple { price } => {
            let formatted = format_raw_price(price.as_deref());
            vec![Variant {
                id: id.clone(),
                title: product.title.clone(),
                price: formatted.price,
                price_known: formatted.known,
                deleted: false,
            }]
        }
        ProductKind::Variable { variations } => variations
            .into_iter()
            .map(|variation| {
                let formatted = format_raw_price(variation.price.as_deref());
                Variant {
                    id: variation.id.to_string(),
                    title: variation.title,
                    price: formatted.price,
                    price_known: formatted.known,
                    deleted: false,
                }
            })
            .collect(),
    };

    let collection_ids = (!product.category_ids.is_empty()).then(|| {
        product
            .category_ids
            .iter()
            .map(ToString::to_string)
            .collect()
    });

    Product {
        id,
        title: product.title,
        slug: product.slug,
        inactive,
        tags: product.tags,
        created_at: product.created_at,
        updated_at: product.updated_at,
        deleted: false,
        some_image_url: product.image_url.filter(|url| !url.is_empty()),
        collection_ids,
        variants,
    }
}

/// Maps one category term to its wire shape.
#[must_use]
pub fn map_collection(term: SourceTerm, metadata: &TermMetadata, member_ids: &[u64]) -> Collection {
    let product_ids =
        (!member_ids.is_empty()).then(|| member_ids.iter().map(ToString::to_string).collect());

    Collection {
        id: term.id.to_string(),
        title: term.name,
        slug: term.slug,
        deleted: false,
        some_image_url: metadata
            .thumbnail_url
            .clone()
            .filter(|url| !url.is_empty()),
        product_ids,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::memory::MemoryCatalog;
    use crate::source::SourceVariation;

    fn simple(id: u64, status: &str, price: Option<&str>) -> SourceProduct {
        SourceProduct {
            id,
            title: format!("Product {id}"),
            slug: format!("product-{id}"),
            status: status.to_string(),
            tags: vec![],
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap(),
            image_url: None,
            category_ids: vec![],
            kind: ProductKind::Simple {
                price: price.map(str::to_string),
            },
        }
    }

    fn term(id: u64, name: &str) -> SourceTerm {
        SourceTerm {
            id,
            name: name.to_string(),
            slug: name.to_lowercase(),
        }
    }

    #[test]
    fn simple_product_yields_one_variant_sharing_its_id() {
        let product = map_product(simple(10, "publish", Some("9.99")));
        assert_eq!(product.variants.len(), 1);
        assert_eq!(product.variants[0].id, "10");
        assert_eq!(product.variants[0].title, "Product 10");
        assert_eq!(product.variants[0].price, "9.990000");
        assert!(product.variants[0].price_known);
    }

    #[test]
    fn variable_product_fans_out_in_source_order() {
        let mut source = simple(20, "publish", None);
        source.kind = ProductKind::Variable {
            variations: vec![
                SourceVariation {
                    id: 23,
                    title: "Large".to_string(),
                    price: Some("12".to_string()),
                },
                SourceVariation {
                    id: 21,
                    title: "Small".to_string(),
                    price: Some(String::new()),
                },
                SourceVariation {
                    id: 22,
                    title: "Medium".to_string(),
                    price: None,
                },
            ],
        };
        let product = map_product(source);
        let ids: Vec<_> = product.variants.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["23", "21", "22"]);
        assert_eq!(product.variants[0].price, "12.000000");
        assert!(product.variants[0].price_known);
        assert_eq!(product.variants[1].price, "0.000000");
        assert!(!product.variants[1].price_known);
        assert!(!product.variants[2].price_known);
    }

    #[test]
    fn unpublished_statuses_are_inactive() {
        for status in ["draft", "private", "pending"] {
            assert!(map_product(simple(1, status, None)).inactive, "{status}");
        }
        assert!(!map_product(simple(1, "publish", None)).inactive);
    }

    #[test]
    fn optional_fields_are_omitted_without_image_or_categories() {
        let product = map_product(simple(3, "publish", Some("1")));
        let json = serde_json::to_value(&product).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("someImageUrl"));
        assert!(!obj.contains_key("collectionIds"));
        assert_eq!(obj["deleted"], serde_json::Value::Bool(false));
    }

    #[test]
    fn image_and_categories_are_carried_as_strings() {
        let mut source = simple(4, "publish", Some("1"));
        source.image_url = Some("https://cdn.example.com/4.jpg".to_string());
        source.category_ids = vec![7, 8];
        source.tags = vec!["summer".to_string(), "2024".to_string()];
        let product = map_product(source);
        assert_eq!(
            product.some_image_url.as_deref(),
            Some("https://cdn.example.com/4.jpg")
        );
        assert_eq!(
            product.collection_ids,
            Some(vec!["7".to_string(), "8".to_string()])
        );
        assert_eq!(product.tags, vec!["summer", "2024"]);
    }

    #[test]
    fn collection_without_members_omits_product_ids() {
        let collection = map_collection(term(5, "Empty"), &TermMetadata::default(), &[]);
        assert!(collection.product_ids.is_none());
        assert!(collection.some_image_url.is_none());
        assert_eq!(collection.id, "5");
    }

    #[test]
    fn collection_thumbnail_requires_a_url() {
        let metadata = TermMetadata {
            thumbnail_url: Some(String::new()),
        };
        assert!(map_collection(term(5, "Empty"), &metadata, &[])
            .some_image_url
            .is_none());
    }

    #[tokio::test]
    async fn collections_list_members_regardless_of_status() {
        let mut published = simple(1, "publish", Some("5"));
        published.category_ids = vec![100];
        let mut draft = simple(2, "draft", Some("5"));
        draft.category_ids = vec![100];
        let mut private = simple(3, "private", Some("5"));
        private.category_ids = vec![100];

        let catalog = MemoryCatalog::new()
            .with_product(published)
            .with_product(draft)
            .with_product(private)
            .with_term(term(100, "Mugs"), Some("https://cdn.example.com/mugs.jpg"))
            .with_term(term(200, "Empty"), None);

        let extractor = CatalogExtractor::new(&catalog);
        let collections = extractor.extract_collections().await.unwrap();

        assert_eq!(collections.len(), 2);
        assert_eq!(
            collections[0].product_ids,
            Some(vec!["1".to_string(), "2".to_string(), "3".to_string()])
        );
        assert_eq!(
            collections[0].some_image_url.as_deref(),
            Some("https://cdn.example.com/mugs.jpg")
        );
        assert!(collections[1].product_ids.is_none());
    }

    #[tokio::test]
    async fn extract_products_includes_every_status() {
        let catalog = MemoryCatalog::new()
            .with_product(simple(1, "publish", Some("5")))
            .with_product(simple(2, "draft", None))
            .with_product(simple(3, "private", None));

        let products = CatalogExtractor::new(&catalog)
            .extract_products()
            .await
            .unwrap();

        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(
            products.iter().filter(|p| p.inactive).count(),
            2,
            "draft and private products are inactive"
        );
    }

    #[tokio::test]
    async fn extract_payload_sets_incremental_flags() {
        let catalog = MemoryCatalog::new().with_product(simple(1, "publish", Some("5")));
        let payload = CatalogExtractor::new(&catalog)
            .extract_payload()
            .await
            .unwrap();
        assert_eq!(payload.products.len(), 1);
        assert!(payload.collections.is_empty());
        assert!(!payload.replace_products);
        assert!(!payload.replace_collections);
        assert!(!payload.debug);
    }
}
