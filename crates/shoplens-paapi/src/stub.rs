//! Offline test double for [`ProductProvider`].
//!
//! Serves a fixed catalog and counts calls, so tests can assert that a cache
//! hit skipped the provider without standing up an HTTP mock.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;

use shoplens_core::Country;

use crate::error::PaapiError;
use crate::types::RawProduct;
use crate::ProductProvider;

/// In-memory provider backed by a fixed item list.
#[derive(Debug, Default)]
pub struct StaticProvider {
    items: Vec<RawProduct>,
    calls: AtomicUsize,
}

impl StaticProvider {
    #[must_use]
    pub fn new(items: Vec<RawProduct>) -> Self {
        Self {
            items,
            calls: AtomicUsize::new(0),
        }
    }

    /// A small two-item catalog useful as a default fixture.
    #[must_use]
    pub fn with_sample_catalog() -> Self {
        Self::new(vec![
            RawProduct {
                asin: Some("B07PXGQC1Q".to_string()),
                title: Some("Bluetooth Headphones".to_string()),
                image_url: Some("https://m.media-amazon.com/sample-1.jpg".to_string()),
                price_amount: Some(Decimal::new(2999, 2)),
                price_currency: Some("USD".to_string()),
                availability: Some("In Stock".to_string()),
                rating: Some(Decimal::new(45, 1)),
                review_count: Some(1280),
            },
            RawProduct {
                asin: Some("B08YOGAMAT1".to_string()),
                title: Some("Yoga Mat".to_string()),
                image_url: None,
                price_amount: Some(Decimal::new(2150, 2)),
                price_currency: Some("USD".to_string()),
                availability: Some("In Stock".to_string()),
                rating: Some(Decimal::new(42, 1)),
                review_count: Some(301),
            },
        ])
    }

    /// Number of provider calls made so far (search and lookup combined).
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductProvider for StaticProvider {
    async fn search_items(
        &self,
        _query: &str,
        _country: Country,
        _page: u32,
    ) -> Result<Vec<RawProduct>, PaapiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.clone())
    }

    async fn get_item(
        &self,
        asin: &str,
        _country: Country,
    ) -> Result<Option<RawProduct>, PaapiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .items
            .iter()
            .find(|item| item.asin.as_deref() == Some(asin))
            .cloned())
    }
}
