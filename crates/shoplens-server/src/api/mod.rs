mod products;
mod search;
mod status;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use shoplens_core::{AppConfig, Country};
use shoplens_paapi::{PaapiClient, ProductProvider};

use crate::middleware::{request_id, RequestId};

/// Catalog provider plus the affiliate parameters normalization needs.
#[derive(Clone)]
pub struct Catalog {
    pub provider: Arc<dyn ProductProvider>,
    pub partner_tag: String,
    pub tag_suffix_enabled: bool,
}

/// Service context constructed once at startup and injected via axum state.
///
/// `catalog` is `None` when PAAPI credentials are absent; product endpoints
/// then answer 503 instead of the process failing to start.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub catalog: Option<Catalog>,
}

impl AppState {
    /// Builds the state from loaded configuration, constructing the live
    /// PAAPI client when all three credentials are present.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(pool: PgPool, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let catalog = match (
            config.paapi_access_key.as_deref(),
            config.paapi_secret_key.as_deref(),
            config.partner_tag.as_deref(),
        ) {
            (Some(access_key), Some(secret_key), Some(partner_tag)) => {
                let client = PaapiClient::new(
                    access_key,
                    secret_key,
                    partner_tag,
                    config.provider_request_timeout_secs,
                    config.provider_connect_timeout_secs,
                )?;
                Some(Catalog {
                    provider: Arc::new(client),
                    partner_tag: partner_tag.to_owned(),
                    tag_suffix_enabled: config.tag_suffix_enabled,
                })
            }
            _ => {
                tracing::warn!(
                    "PAAPI credentials not fully set; product endpoints will answer 503"
                );
                None
            }
        };

        Ok(Self { pool, catalog })
    }

    /// Returns the catalog or a `service_unavailable` error for the caller
    /// to bubble up. Handlers never branch on which provider is behind it.
    fn catalog(&self, request_id: &str) -> Result<&Catalog, ApiError> {
        self.catalog.as_ref().ok_or_else(|| {
            ApiError::new(
                request_id,
                "service_unavailable",
                "product catalog provider is not configured",
            )
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &shoplens_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_provider_error(
    request_id: String,
    error: &shoplens_paapi::PaapiError,
) -> ApiError {
    tracing::error!(error = %error, "catalog provider request failed");
    ApiError::new(
        request_id,
        "internal_error",
        format!("catalog provider request failed: {error}"),
    )
}

/// Parses an optional country code, defaulting to US; unknown codes are a
/// validation error.
pub(super) fn parse_country(
    request_id: &str,
    country: Option<&str>,
) -> Result<Country, ApiError> {
    match country {
        None => Ok(Country::US),
        Some(raw) => Country::parse(raw).ok_or_else(|| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("unsupported country '{raw}'; expected one of US, UK, CA"),
            )
        }),
    }
}

pub(super) fn encode_payload<T: Serialize>(
    request_id: &str,
    value: &T,
) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|error| {
        tracing::error!(error = %error, "response payload serialization failed");
        ApiError::new(
            request_id,
            "internal_error",
            "response payload serialization failed",
        )
    })
}

// Cache lifetimes per endpoint family. Prices move fastest, so they expire
// first; search result pages are the most expensive to refetch.
pub(super) fn search_ttl() -> chrono::Duration {
    chrono::Duration::hours(1)
}

pub(super) fn detail_ttl() -> chrono::Duration {
    chrono::Duration::minutes(30)
}

pub(super) fn price_ttl() -> chrono::Duration {
    chrono::Duration::minutes(5)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/", get(root))
        .route("/api/health", get(health))
        .route(
            "/api/status",
            get(status::list_status_checks).post(status::create_status_check),
        )
        .route("/api/products/search", post(search::basic_search))
        .route(
            "/api/products/advanced-search",
            post(search::advanced_search),
        )
        .route("/api/categories", get(search::list_categories))
        .route("/api/search-suggestions", get(search::search_suggestions))
        .route("/api/products/{asin}", get(products::product_detail))
        .route("/api/products/{asin}/price", get(products::product_price))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: &'static str,
}

async fn root(Extension(_req_id): Extension<RequestId>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "shoplens product search API",
    })
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    provider: &'static str,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let provider = if state.catalog.is_some() {
        "configured"
    } else {
        "unconfigured"
    };

    match shoplens_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
                provider,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                    provider,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use shoplens_paapi::stub::StaticProvider;
    use tower::ServiceExt;

    /// Builds an app state backed by the offline sample catalog and returns
    /// the provider handle so tests can assert call counts.
    fn test_state(pool: PgPool) -> (AppState, Arc<StaticProvider>) {
        let provider = Arc::new(StaticProvider::with_sample_catalog());
        let state = AppState {
            pool,
            catalog: Some(Catalog {
                provider: provider.clone(),
                partner_tag: "shoplens".to_string(),
                tag_suffix_enabled: true,
            }),
        };
        (state, provider)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    #[test]
    fn api_error_not_found_maps_to_404() {
        let response = ApiError::new("req-1", "not_found", "no such item").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_service_unavailable_maps_to_503() {
        let response =
            ApiError::new("req-1", "service_unavailable", "provider missing").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn parse_country_defaults_to_us_and_rejects_unknown() {
        assert_eq!(parse_country("r", None).expect("default"), Country::US);
        assert_eq!(parse_country("r", Some("uk")).expect("parse"), Country::UK);
        assert!(parse_country("r", Some("DE")).is_err());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn root_liveness_returns_message(pool: PgPool) {
        let (state, _) = test_state(pool);
        let response = build_app(state)
            .oneshot(get_req("/api/"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert!(json["message"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_reports_ok_with_live_database(pool: PgPool) {
        let (state, _) = test_state(pool);
        let response = build_app(state)
            .oneshot(get_req("/api/health"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"], "ok");
        assert_eq!(json["provider"], "configured");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_misses_then_hits_the_cache(pool: PgPool) {
        let (state, provider) = test_state(pool);
        let app = build_app(state);
        let payload = serde_json::json!({
            "query": "bluetooth headphones",
            "country": "US",
            "page": 1
        });

        let first = app
            .clone()
            .oneshot(post_json("/api/products/search", payload.clone()))
            .await
            .expect("response");
        assert_eq!(first.status(), StatusCode::OK);
        let first_json = json_body(first).await;
        assert_eq!(first_json["cached"], false);
        let first_products = first_json["products"].as_array().expect("products").clone();
        assert_eq!(first_products.len(), 2);
        assert_eq!(provider.calls(), 1);

        let second = app
            .oneshot(post_json("/api/products/search", payload))
            .await
            .expect("response");
        assert_eq!(second.status(), StatusCode::OK);
        let second_json = json_body(second).await;
        assert_eq!(second_json["cached"], true);
        assert_eq!(
            second_json["products"].as_array().expect("products"),
            &first_products,
            "cache hit must return the identical product list"
        );
        assert_eq!(provider.calls(), 1, "cache hit must not call the provider");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn expired_cache_entry_triggers_a_fresh_fetch(pool: PgPool) {
        let (state, provider) = test_state(pool.clone());
        let app = build_app(state);

        // A stale entry under the exact key the request will use.
        sqlx::query(
            "INSERT INTO cache_entries (cache_key, payload, created_at, expires_at) \
             VALUES ('search:US:1:bluetooth headphones', '[]'::jsonb, \
                     NOW() - INTERVAL '2 hours', NOW() - INTERVAL '1 hour')",
        )
        .execute(&pool)
        .await
        .expect("insert stale entry");

        let response = app
            .oneshot(post_json(
                "/api/products/search",
                serde_json::json!({"query": "Bluetooth Headphones", "country": "US", "page": 1}),
            ))
            .await
            .expect("response");
        let json = json_body(response).await;
        assert_eq!(json["cached"], false);
        assert_eq!(json["products"].as_array().expect("products").len(), 2);
        assert_eq!(provider.calls(), 1, "expired entry must force a provider fetch");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_normalizes_category_and_affiliate_url(pool: PgPool) {
        let (state, _) = test_state(pool);
        let app = build_app(state);

        let response = app
            .oneshot(post_json(
                "/api/products/search",
                serde_json::json!({"query": "anything", "country": "US"}),
            ))
            .await
            .expect("response");
        let json = json_body(response).await;
        let products = json["products"].as_array().expect("products");
        assert_eq!(products[0]["category"], "Electronics");
        assert_eq!(products[1]["category"], "Sports");
        assert_eq!(
            products[0]["affiliate_url"],
            "https://www.amazon.com/dp/B07PXGQC1Q?tag=shoplens-20"
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_without_catalog_answers_503(pool: PgPool) {
        let state = AppState {
            pool,
            catalog: None,
        };
        let response = build_app(state)
            .oneshot(post_json(
                "/api/products/search",
                serde_json::json!({"query": "anything"}),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "service_unavailable");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_rejects_unknown_country(pool: PgPool) {
        let (state, _) = test_state(pool);
        let response = build_app(state)
            .oneshot(post_json(
                "/api/products/search",
                serde_json::json!({"query": "anything", "country": "DE"}),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn advanced_search_filters_and_sorts(pool: PgPool) {
        let (state, _) = test_state(pool);
        let app = build_app(state);

        // Sample catalog prices: 29.99 (headphones) and 21.50 (yoga mat).
        let response = app
            .oneshot(post_json(
                "/api/products/advanced-search",
                serde_json::json!({
                    "query": "gear",
                    "country": "US",
                    "min_price": 20,
                    "max_price": 40,
                    "sort_by": "price_high"
                }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let products = json["products"].as_array().expect("products");
        assert_eq!(json["total_count"], 2);
        assert_eq!(products[0]["price"]["amount"], "29.99");
        assert_eq!(products[1]["price"]["amount"], "21.50");
        assert_eq!(json["filters_applied"]["min_price"], "20");
        assert_eq!(json["filters_applied"]["max_price"], "40");
        assert!(json["filters_applied"].get("min_rating").is_none());
        assert_eq!(json["suggestions"].as_array().expect("suggestions").len(), 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn advanced_search_filter_excludes_out_of_range(pool: PgPool) {
        let (state, _) = test_state(pool);
        let response = build_app(state)
            .oneshot(post_json(
                "/api/products/advanced-search",
                serde_json::json!({"query": "gear", "min_price": 25}),
            ))
            .await
            .expect("response");
        let json = json_body(response).await;
        assert_eq!(json["total_count"], 1);
        assert_eq!(json["products"][0]["asin"], "B07PXGQC1Q");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn advanced_search_records_and_serves_suggestions(pool: PgPool) {
        let (state, _) = test_state(pool);
        let app = build_app(state);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/products/advanced-search",
                serde_json::json!({
                    "query": "Bluetooth Headphones",
                    "include_suggestions": true
                }),
            ))
            .await
            .expect("response");
        let json = json_body(response).await;
        let suggestions = json["suggestions"].as_array().expect("suggestions");
        assert!(
            suggestions.contains(&serde_json::json!("bluetooth headphones")),
            "the just-recorded query should be suggested, got: {suggestions:?}"
        );

        let response = app
            .oneshot(get_req("/api/search-suggestions?q=bluetooth"))
            .await
            .expect("response");
        let json = json_body(response).await;
        assert_eq!(
            json["suggestions"],
            serde_json::json!(["bluetooth headphones"])
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn inline_suggestions_cap_at_ten(pool: PgPool) {
        for i in 0..12 {
            shoplens_db::record_search_query(&pool, &format!("mat {i}"))
                .await
                .expect("seed stat");
        }

        let (state, _) = test_state(pool);
        let response = build_app(state)
            .oneshot(post_json(
                "/api/products/advanced-search",
                serde_json::json!({"query": "mat", "include_suggestions": true}),
            ))
            .await
            .expect("response");
        let json = json_body(response).await;
        assert_eq!(
            json["suggestions"].as_array().expect("suggestions").len(),
            10
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn categories_lists_the_static_taxonomy(pool: PgPool) {
        let (state, _) = test_state(pool);
        let response = build_app(state)
            .oneshot(get_req("/api/categories"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let categories = json["categories"].as_array().expect("categories");
        assert_eq!(categories.len(), 6, "five keyword sets plus General");
        assert_eq!(categories[0]["name"], "Electronics");
        assert!(categories[0]["count"].as_i64().expect("count") > 0);
        assert_eq!(categories[5]["name"], "General");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn product_detail_includes_availability_and_caches(pool: PgPool) {
        let (state, provider) = test_state(pool);
        let app = build_app(state);

        let first = app
            .clone()
            .oneshot(get_req("/api/products/B07PXGQC1Q?country=US"))
            .await
            .expect("response");
        assert_eq!(first.status(), StatusCode::OK);
        let json = json_body(first).await;
        assert_eq!(json["cached"], false);
        assert_eq!(json["product"]["asin"], "B07PXGQC1Q");
        assert_eq!(json["product"]["availability"], "In Stock");
        assert_eq!(provider.calls(), 1);

        let second = app
            .oneshot(get_req("/api/products/B07PXGQC1Q?country=US"))
            .await
            .expect("response");
        let json = json_body(second).await;
        assert_eq!(json["cached"], true);
        assert_eq!(provider.calls(), 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn product_detail_unknown_asin_is_404(pool: PgPool) {
        let (state, _) = test_state(pool);
        let response = build_app(state)
            .oneshot(get_req("/api/products/B0DOESNOTEX?country=US"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn product_price_returns_the_price_block(pool: PgPool) {
        let (state, _) = test_state(pool);
        let response = build_app(state)
            .oneshot(get_req("/api/products/B08YOGAMAT1/price?country=US"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["cached"], false);
        assert_eq!(json["price"]["amount"], "21.50");
        assert_eq!(json["price"]["currency"], "USD");
        assert_eq!(json["price"]["availability"], "In Stock");
        assert_eq!(
            json["price"]["affiliate_url"],
            "https://www.amazon.com/dp/B08YOGAMAT1?tag=shoplens-20"
        );
        assert!(json["price"]["last_updated"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn product_price_unknown_asin_is_404(pool: PgPool) {
        let (state, _) = test_state(pool);
        let response = build_app(state)
            .oneshot(get_req("/api/products/B0DOESNOTEX/price"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn status_round_trip(pool: PgPool) {
        let (state, _) = test_state(pool);
        let app = build_app(state);

        let created = app
            .clone()
            .oneshot(post_json(
                "/api/status",
                serde_json::json!({"client_name": "backend_test_script"}),
            ))
            .await
            .expect("response");
        assert_eq!(created.status(), StatusCode::OK);
        let json = json_body(created).await;
        assert_eq!(json["client_name"], "backend_test_script");
        assert!(json["id"].is_string());
        assert!(json["timestamp"].is_string());

        let listed = app.oneshot(get_req("/api/status")).await.expect("response");
        let json = json_body(listed).await;
        let checks = json.as_array().expect("status list");
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0]["client_name"], "backend_test_script");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn responses_carry_a_request_id_header(pool: PgPool) {
        let (state, _) = test_state(pool);
        let response = build_app(state)
            .oneshot(get_req("/api/"))
            .await
            .expect("response");
        assert!(response.headers().contains_key("x-request-id"));
    }
}
