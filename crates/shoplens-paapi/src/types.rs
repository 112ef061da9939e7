//! PAAPI v5 response types.
//!
//! Every field below is optional because the API omits whole subtrees when a
//! listing lacks the data (no offers, no reviews, no image). [`Item::into_raw`]
//! is the single typed decode step: after it, no code re-checks raw JSON
//! presence.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Response envelope for `SearchItems`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchItemsResponse {
    #[serde(default)]
    pub search_result: Option<SearchResult>,
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResult {
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Response envelope for `GetItems`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemsResponse {
    #[serde(default)]
    pub items_result: Option<ItemsResult>,
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsResult {
    #[serde(default)]
    pub items: Vec<Item>,
}

/// One entry of the request-level `Errors` array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiErrorEntry {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ApiErrorEntry {
    /// Item-level error codes: the request was fine but a specific ASIN could
    /// not be resolved. These map to "not found" rather than a hard failure.
    #[must_use]
    pub fn is_item_level(&self) -> bool {
        matches!(
            self.code.as_str(),
            "InvalidParameterValue" | "ItemNotAccessible" | "NoResults"
        )
    }
}

/// One raw catalog item as returned by the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    #[serde(default, rename = "ASIN")]
    pub asin: Option<String>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub item_info: Option<ItemInfo>,
    #[serde(default)]
    pub offers: Option<Offers>,
    #[serde(default)]
    pub customer_reviews: Option<CustomerReviews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Images {
    #[serde(default)]
    pub primary: Option<ImageVariants>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageVariants {
    #[serde(default)]
    pub large: Option<ImageDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageDetail {
    #[serde(rename = "URL")]
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemInfo {
    #[serde(default)]
    pub title: Option<DisplayValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DisplayValue {
    pub display_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Offers {
    #[serde(default)]
    pub listings: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Listing {
    #[serde(default)]
    pub price: Option<ListingPrice>,
    #[serde(default)]
    pub availability: Option<Availability>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListingPrice {
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Availability {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerReviews {
    #[serde(default)]
    pub star_rating: Option<StarRating>,
    #[serde(default)]
    pub count: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StarRating {
    pub value: Decimal,
}

/// A decoded catalog item with every field optional.
///
/// This is the provider-neutral shape the rest of the service works with;
/// defaults are applied later during normalization, not here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProduct {
    pub asin: Option<String>,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub price_amount: Option<Decimal>,
    pub price_currency: Option<String>,
    pub availability: Option<String>,
    pub rating: Option<Decimal>,
    pub review_count: Option<i64>,
}

impl Item {
    /// Flattens the nested API shape into a [`RawProduct`].
    ///
    /// Only the first offer listing is considered; a listing price without a
    /// currency falls back to `USD` during normalization, not here.
    #[must_use]
    pub fn into_raw(self) -> RawProduct {
        let title = self.item_info.and_then(|i| i.title).map(|t| t.display_value);
        let image_url = self
            .images
            .and_then(|i| i.primary)
            .and_then(|p| p.large)
            .map(|l| l.url);

        let listing = self.offers.and_then(|o| o.listings.into_iter().next());
        let (price_amount, price_currency, availability) = match listing {
            Some(listing) => {
                let (amount, currency) = match listing.price {
                    Some(p) => (Some(p.amount), p.currency),
                    None => (None, None),
                };
                let availability = listing.availability.and_then(|a| a.message);
                (amount, currency, availability)
            }
            None => (None, None, None),
        };

        let (rating, review_count) = match self.customer_reviews {
            Some(reviews) => (reviews.star_rating.map(|r| r.value), reviews.count),
            None => (None, None),
        };

        RawProduct {
            asin: self.asin,
            title,
            image_url,
            price_amount,
            price_currency,
            availability,
            rating,
            review_count,
        }
    }
}
