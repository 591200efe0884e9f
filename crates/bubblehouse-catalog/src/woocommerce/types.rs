//! WooCommerce REST API v3 response types.
//!
//! Only the fields the sync reads are modelled; serde ignores the rest.
//!
//! ### Dates
//! `date_created_gmt` / `date_modified_gmt` are naive ISO-8601 timestamps in
//! UTC without an offset, e.g. `"2017-03-23T17:01:14"`.
//!
//! ### Prices
//! `price` is a string and is `""` when no price is set.
//!
//! ### Images
//! `images[0]` is the featured image when one is set, followed by the
//! gallery.
//!
//! ### Variations
//! The parent's `variations` array lists child ids in menu order; the
//! `/variations` endpoint itself sorts by date, so the parent's order wins.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct WooId {
    pub id: u64,
}

/// Listing row requested with `_fields=id,categories`.
#[derive(Debug, Deserialize)]
pub struct WooMembership {
    pub id: u64,
    #[serde(default)]
    pub categories: Vec<WooId>,
}

#[derive(Debug, Deserialize)]
pub struct WooProduct {
    pub id: u64,
    pub name: String,
    pub slug: String,
    /// `"publish"`, `"draft"`, `"pending"` or `"private"`.
    pub status: String,
    /// `"simple"`, `"variable"`, `"grouped"` or `"external"`.
    #[serde(rename = "type")]
    pub product_type: String,
    #[serde(default)]
    pub date_created_gmt: Option<String>,
    #[serde(default)]
    pub date_modified_gmt: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub images: Vec<WooImage>,
    #[serde(default)]
    pub categories: Vec<WooTermRef>,
    #[serde(default)]
    pub tags: Vec<WooTermRef>,
    #[serde(default)]
    pub variations: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct WooVariation {
    pub id: u64,
    /// Present on recent WooCommerce versions only.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub attributes: Vec<WooAttribute>,
}

#[derive(Debug, Deserialize)]
pub struct WooAttribute {
    #[serde(default)]
    pub option: String,
}

#[derive(Debug, Deserialize)]
pub struct WooCategory {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: Option<WooImage>,
}

#[derive(Debug, Deserialize)]
pub struct WooImage {
    #[serde(default)]
    pub src: String,
}

#[derive(Debug, Deserialize)]
pub struct WooTermRef {
    pub id: u64,
    pub name: String,
}
