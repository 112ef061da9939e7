//! Typed client for the Amazon Product Advertising API (PAAPI v5).
//!
//! The real client signs every request with AWS SigV4 and decodes the
//! response into [`types::RawProduct`], a fully-optional record that is the
//! single place raw field presence is checked. Downstream code consumes
//! [`ProductProvider`], so handlers never know whether they talk to the live
//! API or the offline [`stub::StaticProvider`].

use async_trait::async_trait;

use shoplens_core::Country;

pub mod client;
pub mod error;
pub mod normalize;
mod sign;
pub mod stub;
pub mod types;

pub use client::PaapiClient;
pub use error::PaapiError;
pub use normalize::{normalize_item, normalize_items};
pub use types::RawProduct;

/// Capability interface over the product catalog provider.
///
/// `search_items` returns up to one page (10 items) of raw products;
/// `get_item` resolves a single ASIN, with `Ok(None)` meaning the provider
/// knows no such item, as opposed to a transport failure.
#[async_trait]
pub trait ProductProvider: Send + Sync {
    async fn search_items(
        &self,
        query: &str,
        country: Country,
        page: u32,
    ) -> Result<Vec<RawProduct>, PaapiError>;

    async fn get_item(
        &self,
        asin: &str,
        country: Country,
    ) -> Result<Option<RawProduct>, PaapiError>;
}
