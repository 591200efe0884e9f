//! Conversion from WooCommerce REST shapes to the source model.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};

use super::types::{WooCategory, WooProduct, WooVariation};
use crate::error::CatalogError;
use crate::source::{ProductKind, SourceProduct, SourceTerm, SourceVariation};

const WOO_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Builds a [`SourceProduct`]; `variations` is only consulted for variable
/// products and may arrive in any order.
pub(super) fn into_source_product(
    product: WooProduct,
    variations: Vec<WooVariation>,
) -> Result<SourceProduct, CatalogError> {
    let created_at = parse_gmt(product.id, "date_created_gmt", product.date_created_gmt.as_deref())?;
    // Products never edited since creation may carry no modification date.
    let updated_at = match product.date_modified_gmt.as_deref() {
        Some(raw) if !raw.is_empty() => parse_gmt(product.id, "date_modified_gmt", Some(raw))?,
        _ => created_at,
    };

    let kind = if product.product_type == "variable" {
        let mut by_id: HashMap<u64, WooVariation> =
            variations.into_iter().map(|v| (v.id, v)).collect();
        let ordered = product
            .variations
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(|v| into_source_variation(&product.name, v))
            .collect();
        ProductKind::Variable {
            variations: ordered,
        }
    } else {
        ProductKind::Simple {
            price: product.price.filter(|p| !p.is_empty()),
        }
    };

    Ok(SourceProduct {
        id: product.id,
        title: product.name,
        slug: product.slug,
        status: product.status,
        tags: product.tags.into_iter().map(|t| t.name).collect(),
        created_at,
        updated_at,
        image_url: product
            .images
            .into_iter()
            .next()
            .map(|img| img.src)
            .filter(|src| !src.is_empty()),
        category_ids: product.categories.iter().map(|c| c.id).collect(),
        kind,
    })
}

/// Variation title: the store's own name when present, otherwise
/// `"{parent} - {option}, {option}"`.
fn into_source_variation(parent_name: &str, variation: WooVariation) -> SourceVariation {
    let title = match variation.name.filter(|n| !n.is_empty()) {
        Some(name) => name,
        None => {
            let options: Vec<&str> = variation
                .attributes
                .iter()
                .map(|a| a.option.as_str())
                .filter(|o| !o.is_empty())
                .collect();
            if options.is_empty() {
                parent_name.to_string()
            } else {
                format!("{parent_name} - {}", options.join(", "))
            }
        }
    };

    SourceVariation {
        id: variation.id,
        title,
        price: variation.price.filter(|p| !p.is_empty()),
    }
}

pub(super) fn into_source_term(category: WooCategory) -> SourceTerm {
    SourceTerm {
        id: category.id,
        name: category.name,
        slug: category.slug,
    }
}

fn parse_gmt(product_id: u64, field: &str, raw: Option<&str>) -> Result<DateTime<Utc>, CatalogError> {
    let raw = raw.filter(|r| !r.is_empty()).ok_or_else(|| CatalogError::Normalization {
        source_product_id: product_id.to_string(),
        reason: format!("{field} is missing"),
    })?;
    NaiveDateTime::parse_from_str(raw, WOO_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| CatalogError::Normalization {
            source_product_id: product_id.to_string(),
            reason: format!("{field} \"{raw}\" is not a timestamp: {e}"),
        })
}
