//! Normalization of decoded provider items into the flat
//! [`NormalizedProduct`] shape every endpoint serves.

use chrono::Utc;

use shoplens_core::products::{infer_category, NormalizedProduct, Price};
use shoplens_core::{Country, Marketplace};

use crate::types::RawProduct;

/// Maps one decoded item to a [`NormalizedProduct`].
///
/// Defensive defaults: missing title becomes `"Unknown"`, missing image /
/// price / rating / review count stay absent. A listing price without a
/// currency falls back to the marketplace currency. Items with no ASIN are
/// unaddressable and return `None`.
#[must_use]
pub fn normalize_item(
    raw: RawProduct,
    country: Country,
    partner_tag: &str,
    tag_suffix_enabled: bool,
) -> Option<NormalizedProduct> {
    let asin = raw.asin?;
    let marketplace = Marketplace::for_country(country);
    let title = raw.title.unwrap_or_else(|| "Unknown".to_string());
    let price = raw.price_amount.map(|amount| Price {
        amount,
        currency: raw
            .price_currency
            .unwrap_or_else(|| marketplace.currency.to_string()),
    });

    Some(NormalizedProduct {
        category: infer_category(&title).to_string(),
        affiliate_url: marketplace.affiliate_url(&asin, partner_tag, tag_suffix_enabled),
        asin,
        title,
        image_url: raw.image_url,
        price,
        rating: raw.rating,
        review_count: raw.review_count,
        country,
        last_updated: Utc::now(),
    })
}

/// Normalizes a batch, dropping items that cannot be normalized.
///
/// A defective item never aborts the batch; it is logged and skipped.
#[must_use]
pub fn normalize_items(
    raws: Vec<RawProduct>,
    country: Country,
    partner_tag: &str,
    tag_suffix_enabled: bool,
) -> Vec<NormalizedProduct> {
    let total = raws.len();
    let normalized: Vec<NormalizedProduct> = raws
        .into_iter()
        .filter_map(|raw| normalize_item(raw, country, partner_tag, tag_suffix_enabled))
        .collect();
    if normalized.len() < total {
        tracing::debug!(
            dropped = total - normalized.len(),
            kept = normalized.len(),
            "dropped items without an ASIN during normalization"
        );
    }
    normalized
}
