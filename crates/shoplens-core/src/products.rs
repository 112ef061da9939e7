//! Domain types and pure result-shaping logic: category inference, filter
//! predicates, client-side sorting, and deterministic cache keys.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::marketplace::Country;

/// Category keyword sets, tested in priority order; first match wins.
///
/// Matching is case-insensitive substring containment against the product
/// title. Titles that match none of the sets classify as `"General"`.
pub const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Electronics",
        &[
            "headphone", "earbud", "bluetooth", "speaker", "laptop", "tablet", "phone", "camera",
            "monitor", "keyboard", "charger", "wireless",
        ],
    ),
    (
        "Home",
        &[
            "kitchen", "cookware", "furniture", "lamp", "pillow", "blanket", "vacuum", "curtain",
            "mattress", "decor",
        ],
    ),
    (
        "Beauty",
        &[
            "makeup", "skincare", "shampoo", "conditioner", "serum", "moisturizer", "lipstick",
            "perfume", "fragrance",
        ],
    ),
    (
        "Sports",
        &[
            "yoga", "fitness", "dumbbell", "workout", "exercise", "running", "treadmill", "tennis",
            "golf", "bike",
        ],
    ),
    (
        "Books",
        &["book", "novel", "paperback", "hardcover", "journal", "textbook"],
    ),
];

/// Fallback category for titles matching no keyword set.
pub const GENERAL_CATEGORY: &str = "General";

/// Infers a product category from its title.
#[must_use]
pub fn infer_category(title: &str) -> &'static str {
    let lowered = title.to_lowercase();
    for (category, keywords) in CATEGORIES {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return category;
        }
    }
    GENERAL_CATEGORY
}

/// A listing price in the storefront's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Decimal,
    pub currency: String,
}

/// The flat product record every endpoint serves.
///
/// Derived once from a raw provider item; optional fields stay absent rather
/// than defaulting to zero so filters can distinguish "unpriced" from "free".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProduct {
    pub asin: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<i64>,
    pub category: String,
    pub affiliate_url: String,
    pub country: Country,
    pub last_updated: DateTime<Utc>,
}

/// Optional post-normalization filters, AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

impl ProductFilters {
    /// True when no filter field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_rating.is_none()
            && self.category.is_none()
            && self.availability.is_none()
    }
}

/// Client-side sort modes for the advanced search path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Relevance,
    PriceLow,
    PriceHigh,
    Rating,
    ReviewCount,
}

impl SortBy {
    /// Parses a sort key. Unrecognized keys (and `None`) preserve provider
    /// order, i.e. map to `Relevance`.
    #[must_use]
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("price_low") => SortBy::PriceLow,
            Some("price_high") => SortBy::PriceHigh,
            Some("rating") => SortBy::Rating,
            Some("review_count") => SortBy::ReviewCount,
            _ => SortBy::Relevance,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::PriceLow => "price_low",
            SortBy::PriceHigh => "price_high",
            SortBy::Rating => "rating",
            SortBy::ReviewCount => "review_count",
        }
    }
}

/// One fully-resolved search request, constructed per inbound call.
#[derive(Debug, Clone)]
pub struct ProductQuery {
    pub query: String,
    pub country: Country,
    pub page: u32,
    pub filters: ProductFilters,
    pub sort_by: SortBy,
    pub include_suggestions: bool,
}

/// Applies the AND-combined filter predicates to a normalized result set.
///
/// Any price bound excludes products without a price; `min_rating` excludes
/// products without a rating; `category` is an exact match against the
/// inferred category.
#[must_use]
pub fn apply_filters(
    products: Vec<NormalizedProduct>,
    filters: &ProductFilters,
) -> Vec<NormalizedProduct> {
    products
        .into_iter()
        .filter(|p| {
            if let Some(min) = filters.min_price {
                match &p.price {
                    Some(price) if price.amount >= min => {}
                    _ => return false,
                }
            }
            if let Some(max) = filters.max_price {
                match &p.price {
                    Some(price) if price.amount <= max => {}
                    _ => return false,
                }
            }
            if let Some(min) = filters.min_rating {
                match p.rating {
                    Some(rating) if rating >= min => {}
                    _ => return false,
                }
            }
            if let Some(category) = &filters.category {
                if &p.category != category {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Reorders a filtered result set by the requested sort key.
///
/// Missing numeric fields compare as zero; `Relevance` preserves provider
/// order. The sort is stable, so equal keys keep their relative order.
pub fn sort_products(products: &mut [NormalizedProduct], sort_by: SortBy) {
    let price_of = |p: &NormalizedProduct| p.price.as_ref().map_or(Decimal::ZERO, |pr| pr.amount);
    let rating_of = |p: &NormalizedProduct| p.rating.unwrap_or(Decimal::ZERO);
    match sort_by {
        SortBy::Relevance => {}
        SortBy::PriceLow => products.sort_by_key(price_of),
        SortBy::PriceHigh => products.sort_by_key(|p| std::cmp::Reverse(price_of(p))),
        SortBy::Rating => products.sort_by_key(|p| std::cmp::Reverse(rating_of(p))),
        SortBy::ReviewCount => {
            products.sort_by_key(|p| std::cmp::Reverse(p.review_count.unwrap_or(0)));
        }
    }
}

// ---------------------------------------------------------------------------
// Cache keys
// ---------------------------------------------------------------------------
//
// Keys concatenate every result-affecting request field in a fixed order so
// two logically distinct requests never collide and an identical request
// always hits. Absent optional fields render as "-".

fn opt_str<T: std::fmt::Display>(v: Option<&T>) -> String {
    v.map_or_else(|| "-".to_string(), ToString::to_string)
}

/// Cache key for the basic search endpoint.
#[must_use]
pub fn search_cache_key(query: &str, country: Country, page: u32) -> String {
    format!("search:{country}:{page}:{}", query.to_lowercase())
}

/// Cache key for the advanced search endpoint, covering filters and sort.
#[must_use]
pub fn advanced_cache_key(query: &ProductQuery) -> String {
    let f = &query.filters;
    format!(
        "advanced:{}:{}:{}:{}:{}:{}:{}:{}:{}",
        query.country,
        query.page,
        query.query.to_lowercase(),
        opt_str(f.min_price.as_ref()),
        opt_str(f.max_price.as_ref()),
        opt_str(f.min_rating.as_ref()),
        opt_str(f.category.as_ref()),
        opt_str(f.availability.as_ref()),
        query.sort_by.as_str(),
    )
}

/// Cache key for the single-product detail endpoint.
#[must_use]
pub fn detail_cache_key(asin: &str, country: Country) -> String {
    format!("detail:{country}:{asin}")
}

/// Cache key for the price-only lookup endpoint.
#[must_use]
pub fn price_cache_key(asin: &str, country: Country) -> String {
    format!("price:{country}:{asin}")
}
