//! Wire schema for the `UpdateProducts3` endpoint.
//!
//! Ids are always strings, whatever their native type in the store, so the
//! schema stays type-stable. Optional fields are omitted from the JSON when
//! absent rather than serialized as `null`: the receiving service treats a
//! missing `someImageUrl` as "no image" and a missing `productIds` as "no
//! products".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product as sent to Bubblehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub slug: String,
    /// `true` unless the product is published.
    pub inactive: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Always `false`: deletions are never propagated.
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub some_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_ids: Option<Vec<String>>,
    pub variants: Vec<Variant>,
}

/// A purchasable unit of a [`Product`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub title: String,
    /// Decimal string with exactly six fractional digits, e.g. `"9.990000"`.
    pub price: String,
    pub price_known: bool,
    pub deleted: bool,
}

/// A product category as sent to Bubblehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub some_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<Vec<String>>,
}

/// Request body of `UpdateProducts3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub products: Vec<Product>,
    pub collections: Vec<Collection>,
    pub replace_products: bool,
    pub replace_collections: bool,
    pub debug: bool,
}

impl SyncPayload {
    /// Builds an incremental snapshot: nothing is replaced or tombstoned on
    /// the remote side, and debug mode is off.
    #[must_use]
    pub fn incremental(products: Vec<Product>, collections: Vec<Collection>) -> Self {
        Self {
            products,
            collections,
            replace_products: false,
            replace_collections: false,
            debug: false,
        }
    }

    /// Total number of variants across all products.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.products.iter().map(|p| p.variants.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::Value;

    use super::*;

    fn bare_product() -> Product {
        Product {
            id: "42".to_string(),
            title: "Mug".to_string(),
            slug: "mug".to_string(),
            inactive: false,
            tags: vec![],
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            deleted: false,
            some_image_url: None,
            collection_ids: None,
            variants: vec![Variant {
                id: "42".to_string(),
                title: "Mug".to_string(),
                price: "0.000000".to_string(),
                price_known: false,
                deleted: false,
            }],
        }
    }

    #[test]
    fn product_omits_absent_optional_keys() {
        let json = serde_json::to_value(bare_product()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("someImageUrl"));
        assert!(!obj.contains_key("collectionIds"));
        assert_eq!(obj["createdAt"], Value::from("2024-01-02T03:04:05Z"));
        assert_eq!(obj["variants"][0]["priceKnown"], Value::Bool(false));
    }

    #[test]
    fn product_includes_present_optional_keys() {
        let mut product = bare_product();
        product.some_image_url = Some("https://cdn.example.com/mug.jpg".to_string());
        product.collection_ids = Some(vec!["7".to_string()]);
        let json = serde_json::to_value(product).unwrap();
        assert_eq!(json["someImageUrl"], "https://cdn.example.com/mug.jpg");
        assert_eq!(json["collectionIds"], serde_json::json!(["7"]));
    }

    #[test]
    fn collection_omits_product_ids_when_absent() {
        let collection = Collection {
            id: "7".to_string(),
            title: "Kitchen".to_string(),
            slug: "kitchen".to_string(),
            deleted: false,
            some_image_url: None,
            product_ids: None,
        };
        let json = serde_json::to_value(collection).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("productIds"));
        assert!(!obj.contains_key("someImageUrl"));
    }

    #[test]
    fn incremental_payload_flags_are_false() {
        let payload = SyncPayload::incremental(vec![bare_product()], vec![]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["replaceProducts"], Value::Bool(false));
        assert_eq!(json["replaceCollections"], Value::Bool(false));
        assert_eq!(json["debug"], Value::Bool(false));
        assert_eq!(payload.variant_count(), 1);
    }
}
