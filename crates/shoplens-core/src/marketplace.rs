//! Static marketplace table for the supported Amazon storefronts.
//!
//! Each [`Country`] maps to one [`Marketplace`] record carrying the PAAPI
//! endpoint host, the AWS signing region, the public storefront domain, and
//! the regional affiliate-tag suffix. The table is fixed at compile time;
//! only the partner tag comes from configuration.

use serde::{Deserialize, Serialize};

/// Supported storefront countries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    US,
    UK,
    CA,
}

impl Country {
    /// Stable string form used in cache keys and API responses.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Country::US => "US",
            Country::UK => "UK",
            Country::CA => "CA",
        }
    }

    /// Parses a country code, case-insensitively. Unknown codes map to `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "US" => Some(Country::US),
            "UK" => Some(Country::UK),
            "CA" => Some(Country::CA),
            _ => None,
        }
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-country PAAPI endpoint and affiliate-link parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marketplace {
    /// PAAPI endpoint host, e.g. `webservices.amazon.com`.
    pub host: &'static str,
    /// AWS SigV4 signing region for the endpoint.
    pub region: &'static str,
    /// Public storefront domain used for affiliate links.
    pub domain: &'static str,
    /// Regional affiliate-tag suffix (`-20` for North America, `-21` for UK).
    pub tag_suffix: &'static str,
    /// ISO currency code used when a listing price omits its currency.
    pub currency: &'static str,
}

impl Marketplace {
    /// Looks up the marketplace record for a country.
    #[must_use]
    pub fn for_country(country: Country) -> Self {
        match country {
            Country::US => Marketplace {
                host: "webservices.amazon.com",
                region: "us-east-1",
                domain: "amazon.com",
                tag_suffix: "-20",
                currency: "USD",
            },
            Country::UK => Marketplace {
                host: "webservices.amazon.co.uk",
                region: "eu-west-1",
                domain: "amazon.co.uk",
                tag_suffix: "-21",
                currency: "GBP",
            },
            Country::CA => Marketplace {
                host: "webservices.amazon.ca",
                region: "us-east-1",
                domain: "amazon.ca",
                tag_suffix: "-20",
                currency: "CAD",
            },
        }
    }

    /// Builds the canonical affiliate URL for a product.
    ///
    /// Shape: `https://www.<domain>/dp/<asin>?tag=<partner_tag>[suffix]`.
    /// The regional suffix is appended only when `suffix_enabled` is set and
    /// the base tag does not already end with it, so re-normalizing a tag
    /// that carries the suffix is a no-op.
    #[must_use]
    pub fn affiliate_url(&self, asin: &str, partner_tag: &str, suffix_enabled: bool) -> String {
        let tag = if suffix_enabled && !partner_tag.ends_with(self.tag_suffix) {
            format!("{partner_tag}{}", self.tag_suffix)
        } else {
            partner_tag.to_string()
        };
        format!("https://www.{}/dp/{asin}?tag={tag}", self.domain)
    }
}
