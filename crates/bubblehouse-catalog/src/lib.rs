pub mod error;
pub mod extract;
pub mod memory;
pub mod price;
mod rate_limit;
pub mod source;
pub mod woocommerce;

pub use error::CatalogError;
pub use extract::{map_collection, map_product, CatalogExtractor};
pub use memory::MemoryCatalog;
pub use price::{format_price, format_raw_price, parse_price, FormattedPrice};
pub use source::{
    CatalogSource, ProductKind, SourceProduct, SourceTerm, SourceVariation, TermMetadata,
    PUBLISHED_STATUS,
};
pub use woocommerce::WooCommerceSource;
