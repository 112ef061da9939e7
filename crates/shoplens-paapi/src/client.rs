//! HTTP client for PAAPI v5.
//!
//! Wraps `reqwest` with SigV4 signing, typed response deserialization, and
//! PAAPI-specific error handling. Requests are JSON POSTs to
//! `/paapi5/searchitems` and `/paapi5/getitems`; the API reports
//! request-level failures through an `Errors` array rather than HTTP status
//! alone.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;

use shoplens_core::{Country, Marketplace};

use crate::error::PaapiError;
use crate::sign::{sign, SignRequest};
use crate::types::{GetItemsResponse, RawProduct, SearchItemsResponse};
use crate::ProductProvider;

/// PAAPI caps search pages at 10 items per request.
pub const PAGE_SIZE: u32 = 10;

const SEARCH_TARGET: &str = "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.SearchItems";
const GET_ITEMS_TARGET: &str = "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.GetItems";

const SEARCH_RESOURCES: &[&str] = &[
    "Images.Primary.Large",
    "ItemInfo.Title",
    "Offers.Listings.Price",
    "CustomerReviews.StarRating",
    "CustomerReviews.Count",
];

const GET_ITEM_RESOURCES: &[&str] = &[
    "Images.Primary.Large",
    "ItemInfo.Title",
    "Offers.Listings.Price",
    "Offers.Listings.Availability.Message",
    "CustomerReviews.StarRating",
    "CustomerReviews.Count",
];

/// Live PAAPI client.
///
/// Use [`PaapiClient::new`] for production or
/// [`PaapiClient::with_base_url`] to point at a mock server in tests; the
/// override replaces the scheme+host while signing still uses the
/// marketplace host, which mock servers do not verify.
pub struct PaapiClient {
    client: reqwest::Client,
    access_key: String,
    secret_key: String,
    partner_tag: String,
    base_url_override: Option<String>,
}

impl PaapiClient {
    /// Creates a client pointed at the regional production endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`PaapiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        access_key: &str,
        secret_key: &str,
        partner_tag: &str,
        request_timeout_secs: u64,
        connect_timeout_secs: u64,
    ) -> Result<Self, PaapiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .user_agent("shoplens/0.1 (product-search)")
            .build()?;

        Ok(Self {
            client,
            access_key: access_key.to_owned(),
            secret_key: secret_key.to_owned(),
            partner_tag: partner_tag.to_owned(),
            base_url_override: None,
        })
    }

    /// Creates a client whose requests go to `base_url` instead of the
    /// regional Amazon endpoint (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PaapiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        access_key: &str,
        secret_key: &str,
        partner_tag: &str,
        base_url: &str,
    ) -> Result<Self, PaapiError> {
        let mut client = Self::new(access_key, secret_key, partner_tag, 30, 10)?;
        client.base_url_override = Some(base_url.trim_end_matches('/').to_owned());
        Ok(client)
    }

    fn endpoint(&self, marketplace: &Marketplace, path: &str) -> String {
        match &self.base_url_override {
            Some(base) => format!("{base}{path}"),
            None => format!("https://{}{path}", marketplace.host),
        }
    }

    /// Signs and sends one POST, asserts a 2xx status, and deserializes the
    /// body into `T`.
    async fn post_signed<T: DeserializeOwned>(
        &self,
        country: Country,
        path: &str,
        target: &str,
        payload: &serde_json::Value,
    ) -> Result<T, PaapiError> {
        let marketplace = Marketplace::for_country(country);
        let body = payload.to_string();
        let headers = sign(
            &SignRequest {
                access_key: &self.access_key,
                secret_key: &self.secret_key,
                region: marketplace.region,
                host: marketplace.host,
                path,
                target,
                payload: &body,
            },
            Utc::now(),
        );

        let response = self
            .client
            .post(self.endpoint(&marketplace, path))
            .header("content-type", headers.content_type)
            .header("content-encoding", headers.content_encoding)
            .header("x-amz-date", headers.amz_date)
            .header("x-amz-target", target)
            .header("authorization", headers.authorization)
            .body(body)
            .send()
            .await?;
        let response = response.error_for_status()?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| PaapiError::Deserialize {
            context: format!("{target}({country})"),
            source: e,
        })
    }

    fn common_fields(&self, marketplace: &Marketplace) -> serde_json::Value {
        serde_json::json!({
            "PartnerTag": self.partner_tag,
            "PartnerType": "Associates",
            "Marketplace": format!("www.{}", marketplace.domain),
        })
    }
}

#[async_trait]
impl ProductProvider for PaapiClient {
    /// Searches the catalog for up to [`PAGE_SIZE`] items.
    ///
    /// A request-level error in the `Errors` array surfaces as
    /// [`PaapiError::Api`] unless it is the item-level "no results" class,
    /// which decodes to an empty page.
    async fn search_items(
        &self,
        query: &str,
        country: Country,
        page: u32,
    ) -> Result<Vec<RawProduct>, PaapiError> {
        let marketplace = Marketplace::for_country(country);
        let mut payload = self.common_fields(&marketplace);
        payload["Keywords"] = serde_json::Value::from(query);
        payload["SearchIndex"] = serde_json::Value::from("All");
        payload["ItemCount"] = serde_json::Value::from(PAGE_SIZE);
        payload["ItemPage"] = serde_json::Value::from(page.max(1));
        payload["Resources"] = serde_json::Value::from(
            SEARCH_RESOURCES.iter().map(|r| (*r).to_string()).collect::<Vec<_>>(),
        );

        let response: SearchItemsResponse = self
            .post_signed(country, "/paapi5/searchitems", SEARCH_TARGET, &payload)
            .await?;

        if let Some(err) = response.errors.iter().find(|e| !e.is_item_level()) {
            return Err(PaapiError::Api {
                code: err.code.clone(),
                message: err.message.clone(),
            });
        }

        let items = response.search_result.map(|r| r.items).unwrap_or_default();
        Ok(items.into_iter().map(crate::types::Item::into_raw).collect())
    }

    /// Resolves one ASIN. `Ok(None)` means the catalog has no such item,
    /// which the API reports either as an empty `ItemsResult` or as an
    /// item-level entry in the `Errors` array.
    async fn get_item(
        &self,
        asin: &str,
        country: Country,
    ) -> Result<Option<RawProduct>, PaapiError> {
        let marketplace = Marketplace::for_country(country);
        let mut payload = self.common_fields(&marketplace);
        payload["ItemIds"] = serde_json::Value::from(vec![asin.to_string()]);
        payload["Resources"] = serde_json::Value::from(
            GET_ITEM_RESOURCES.iter().map(|r| (*r).to_string()).collect::<Vec<_>>(),
        );

        let response: GetItemsResponse = self
            .post_signed(country, "/paapi5/getitems", GET_ITEMS_TARGET, &payload)
            .await?;

        if let Some(err) = response.errors.iter().find(|e| !e.is_item_level()) {
            return Err(PaapiError::Api {
                code: err.code.clone(),
                message: err.message.clone(),
            });
        }

        let item = response
            .items_result
            .map(|r| r.items)
            .unwrap_or_default()
            .into_iter()
            .next();
        Ok(item.map(crate::types::Item::into_raw))
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
