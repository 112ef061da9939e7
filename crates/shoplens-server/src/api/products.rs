//! Single-product endpoints: the full detail record and the fast-moving
//! price-only lookup, each with its own cache lifetime.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shoplens_core::products::{detail_cache_key, price_cache_key};
use shoplens_core::Marketplace;
use shoplens_paapi::normalize_item;

use crate::middleware::RequestId;

use super::{
    detail_ttl, encode_payload, map_db_error, map_provider_error, parse_country, price_ttl,
    ApiError, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct CountryParams {
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct DetailResponse {
    pub product: serde_json::Value,
    pub cached: bool,
}

fn item_not_found(request_id: String, asin: &str) -> ApiError {
    ApiError::new(
        request_id,
        "not_found",
        format!("no product found for ASIN '{asin}'"),
    )
}

pub(super) async fn product_detail(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Path(asin): Path<String>,
    Query(params): Query<CountryParams>,
) -> Result<Json<DetailResponse>, ApiError> {
    let country = parse_country(&request_id, params.country.as_deref())?;
    let key = detail_cache_key(&asin, country);

    if let Some(payload) = shoplens_db::fetch_cached(&state.pool, &key)
        .await
        .map_err(|e| map_db_error(request_id.clone(), &e))?
    {
        tracing::debug!(%key, "detail cache hit");
        return Ok(Json(DetailResponse {
            product: payload,
            cached: true,
        }));
    }

    let catalog = state.catalog(&request_id)?;
    let raw = catalog
        .provider
        .get_item(&asin, country)
        .await
        .map_err(|e| map_provider_error(request_id.clone(), &e))?
        .ok_or_else(|| item_not_found(request_id.clone(), &asin))?;

    // Availability lives on the raw item only; the flat record drops it, so
    // the detail payload carries it alongside.
    let availability = raw.availability.clone();
    let product = normalize_item(raw, country, &catalog.partner_tag, catalog.tag_suffix_enabled)
        .ok_or_else(|| item_not_found(request_id.clone(), &asin))?;

    let mut payload = encode_payload(&request_id, &product)?;
    if let serde_json::Value::Object(map) = &mut payload {
        map.insert(
            "availability".to_string(),
            availability.map_or(serde_json::Value::Null, serde_json::Value::String),
        );
    }

    shoplens_db::store_cached(&state.pool, &key, &payload, detail_ttl())
        .await
        .map_err(|e| map_db_error(request_id, &e))?;

    Ok(Json(DetailResponse {
        product: payload,
        cached: false,
    }))
}

/// The price block served by the price-only endpoint. Unpriced items keep
/// explicit nulls so clients can tell "no price" from a missing field.
#[derive(Debug, Serialize)]
struct PriceInfo {
    amount: Option<Decimal>,
    currency: Option<String>,
    availability: Option<String>,
    last_updated: DateTime<Utc>,
    affiliate_url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PriceResponse {
    pub price: serde_json::Value,
    pub cached: bool,
}

pub(super) async fn product_price(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Path(asin): Path<String>,
    Query(params): Query<CountryParams>,
) -> Result<Json<PriceResponse>, ApiError> {
    let country = parse_country(&request_id, params.country.as_deref())?;
    let key = price_cache_key(&asin, country);

    if let Some(payload) = shoplens_db::fetch_cached(&state.pool, &key)
        .await
        .map_err(|e| map_db_error(request_id.clone(), &e))?
    {
        tracing::debug!(%key, "price cache hit");
        return Ok(Json(PriceResponse {
            price: payload,
            cached: true,
        }));
    }

    let catalog = state.catalog(&request_id)?;
    let raw = catalog
        .provider
        .get_item(&asin, country)
        .await
        .map_err(|e| map_provider_error(request_id.clone(), &e))?
        .ok_or_else(|| item_not_found(request_id.clone(), &asin))?;

    let marketplace = Marketplace::for_country(country);
    let price = PriceInfo {
        currency: raw
            .price_amount
            .is_some()
            .then(|| {
                raw.price_currency
                    .clone()
                    .unwrap_or_else(|| marketplace.currency.to_string())
            }),
        amount: raw.price_amount,
        availability: raw.availability,
        last_updated: Utc::now(),
        affiliate_url: marketplace.affiliate_url(
            &asin,
            &catalog.partner_tag,
            catalog.tag_suffix_enabled,
        ),
    };

    let payload = encode_payload(&request_id, &price)?;
    shoplens_db::store_cached(&state.pool, &key, &payload, price_ttl())
        .await
        .map_err(|e| map_db_error(request_id, &e))?;

    Ok(Json(PriceResponse {
        price: payload,
        cached: false,
    }))
}
