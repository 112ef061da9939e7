//! Search endpoints: keyword search, filtered advanced search, the static
//! category taxonomy, and query suggestions.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shoplens_core::products::{
    advanced_cache_key, apply_filters, search_cache_key, sort_products, ProductFilters,
    ProductQuery, SortBy, CATEGORIES, GENERAL_CATEGORY,
};
use shoplens_paapi::normalize_items;

use crate::middleware::RequestId;

use super::{encode_payload, map_db_error, parse_country, search_ttl, ApiError, AppState, Catalog};

/// Retrieval cap for suggestion lookups, inline and via the dedicated
/// endpoint.
const SUGGESTION_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    pub query: String,
    pub country: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    pub products: serde_json::Value,
    pub cached: bool,
}

/// Runs the provider search and normalizes the page.
///
/// A failed provider call degrades to an empty result rather than an error;
/// search is best-effort and an upstream hiccup should not 500 the page.
/// Failed fetches are never cached, so the next request retries.
async fn fetch_search_page(
    catalog: &Catalog,
    query: &str,
    country: shoplens_core::Country,
    page: u32,
) -> Option<Vec<shoplens_core::NormalizedProduct>> {
    match catalog.provider.search_items(query, country, page).await {
        Ok(raws) => Some(normalize_items(
            raws,
            country,
            &catalog.partner_tag,
            catalog.tag_suffix_enabled,
        )),
        Err(error) => {
            tracing::error!(error = %error, query, "provider search failed, serving empty result");
            None
        }
    }
}

pub(super) async fn basic_search(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let country = parse_country(&request_id, body.country.as_deref())?;
    let page = body.page.unwrap_or(1).max(1);
    let key = search_cache_key(&body.query, country, page);

    if let Some(payload) = shoplens_db::fetch_cached(&state.pool, &key)
        .await
        .map_err(|e| map_db_error(request_id.clone(), &e))?
    {
        tracing::debug!(%key, "search cache hit");
        return Ok(Json(SearchResponse {
            products: payload,
            cached: true,
        }));
    }

    let catalog = state.catalog(&request_id)?;
    let Some(products) = fetch_search_page(catalog, &body.query, country, page).await else {
        return Ok(Json(SearchResponse {
            products: serde_json::Value::Array(Vec::new()),
            cached: false,
        }));
    };

    let payload = encode_payload(&request_id, &products)?;
    shoplens_db::store_cached(&state.pool, &key, &payload, search_ttl())
        .await
        .map_err(|e| map_db_error(request_id, &e))?;

    Ok(Json(SearchResponse {
        products: payload,
        cached: false,
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct AdvancedSearchRequest {
    pub query: String,
    pub country: Option<String>,
    pub page: Option<u32>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<Decimal>,
    pub category: Option<String>,
    pub availability: Option<String>,
    pub sort_by: Option<String>,
    #[serde(default)]
    pub include_suggestions: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct AdvancedSearchResponse {
    pub products: serde_json::Value,
    pub cached: bool,
    pub total_count: usize,
    pub filters_applied: serde_json::Value,
    pub suggestions: Vec<String>,
}

pub(super) async fn advanced_search(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Json(body): Json<AdvancedSearchRequest>,
) -> Result<Json<AdvancedSearchResponse>, ApiError> {
    let country = parse_country(&request_id, body.country.as_deref())?;
    let query = ProductQuery {
        query: body.query,
        country,
        page: body.page.unwrap_or(1).max(1),
        filters: ProductFilters {
            min_price: body.min_price,
            max_price: body.max_price,
            min_rating: body.min_rating,
            category: body.category,
            availability: body.availability,
        },
        sort_by: SortBy::parse(body.sort_by.as_deref()),
        include_suggestions: body.include_suggestions,
    };

    // Popularity bookkeeping is best-effort and never fails the search.
    if query.include_suggestions {
        if let Err(error) = shoplens_db::record_search_query(&state.pool, &query.query).await {
            tracing::warn!(error = %error, "failed to record search query");
        }
    }

    let key = advanced_cache_key(&query);
    let (payload, cached) = match shoplens_db::fetch_cached(&state.pool, &key)
        .await
        .map_err(|e| map_db_error(request_id.clone(), &e))?
    {
        Some(payload) => {
            tracing::debug!(%key, "advanced search cache hit");
            (payload, true)
        }
        None => {
            let catalog = state.catalog(&request_id)?;
            match fetch_search_page(catalog, &query.query, country, query.page).await {
                Some(products) => {
                    let mut products = apply_filters(products, &query.filters);
                    sort_products(&mut products, query.sort_by);
                    let payload = encode_payload(&request_id, &products)?;
                    shoplens_db::store_cached(&state.pool, &key, &payload, search_ttl())
                        .await
                        .map_err(|e| map_db_error(request_id.clone(), &e))?;
                    (payload, false)
                }
                None => (serde_json::Value::Array(Vec::new()), false),
            }
        }
    };

    let suggestions = if query.include_suggestions {
        shoplens_db::suggest_queries(&state.pool, &query.query, SUGGESTION_LIMIT)
            .await
            .unwrap_or_else(|error| {
                tracing::warn!(error = %error, "suggestion lookup failed");
                Vec::new()
            })
    } else {
        Vec::new()
    };

    let total_count = payload.as_array().map_or(0, Vec::len);
    let filters_applied = encode_payload(&request_id, &query.filters)?;

    Ok(Json(AdvancedSearchResponse {
        products: payload,
        cached,
        total_count,
        filters_applied,
        suggestions,
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct CategoryEntry {
    pub name: &'static str,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct CategoriesResponse {
    pub categories: Vec<CategoryEntry>,
}

/// The category taxonomy is a compile-time keyword table, so this endpoint
/// is static: each entry carries its keyword count, plus the fallback bucket.
pub(super) async fn list_categories() -> Json<CategoriesResponse> {
    let mut categories: Vec<CategoryEntry> = CATEGORIES
        .iter()
        .map(|(name, keywords)| CategoryEntry {
            name,
            count: keywords.len(),
        })
        .collect();
    categories.push(CategoryEntry {
        name: GENERAL_CATEGORY,
        count: 0,
    });
    Json(CategoriesResponse { categories })
}

#[derive(Debug, Deserialize)]
pub(super) struct SuggestionParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

pub(super) async fn search_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Json<SuggestionsResponse> {
    let suggestions = shoplens_db::suggest_queries(&state.pool, &params.q, SUGGESTION_LIMIT)
        .await
        .unwrap_or_else(|error| {
            tracing::warn!(error = %error, "suggestion lookup failed");
            Vec::new()
        });
    Json(SuggestionsResponse { suggestions })
}
