//! AWS SigV4 request signing for PAAPI v5.
//!
//! PAAPI signs against the `ProductAdvertisingAPI` service with a fixed set
//! of headers (`content-encoding`, `content-type`, `host`, `x-amz-date`,
//! `x-amz-target`). The canonical-request and string-to-sign construction is
//! pure string building over the request parameters, so it is unit-tested
//! directly; the HMAC chain follows the standard
//! `AWS4<secret> -> date -> region -> service -> aws4_request` derivation.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "ProductAdvertisingAPI";
const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const CONTENT_ENCODING: &str = "amz-1.0";
const SIGNED_HEADERS: &str = "content-encoding;content-type;host;x-amz-date;x-amz-target";

/// Everything needed to sign one PAAPI request.
pub(crate) struct SignRequest<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
    pub host: &'a str,
    /// Request path, e.g. `/paapi5/searchitems`.
    pub path: &'a str,
    /// Operation target, e.g.
    /// `com.amazon.paapi5.v1.ProductAdvertisingAPIv1.SearchItems`.
    pub target: &'a str,
    pub payload: &'a str,
}

/// Headers the caller must attach to the outgoing request.
pub(crate) struct SignedHeaders {
    pub amz_date: String,
    pub authorization: String,
    pub content_type: &'static str,
    pub content_encoding: &'static str,
}

pub(crate) fn sign(req: &SignRequest<'_>, now: DateTime<Utc>) -> SignedHeaders {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();

    let canonical = canonical_request(req, &amz_date);
    let scope = format!("{date}/{}/{SERVICE}/aws4_request", req.region);
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical.as_bytes())
    );

    let k_date = hmac_sha256(format!("AWS4{}", req.secret_key).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, req.region.as_bytes());
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes());
    let k_signing = hmac_sha256(&k_service, b"aws4_request");
    let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
        req.access_key
    );

    SignedHeaders {
        amz_date,
        authorization,
        content_type: CONTENT_TYPE,
        content_encoding: CONTENT_ENCODING,
    }
}

/// Builds the canonical request string: method, path, empty query string,
/// canonical headers in lexical order, signed-header list, payload hash.
fn canonical_request(req: &SignRequest<'_>, amz_date: &str) -> String {
    format!(
        "POST\n{}\n\ncontent-encoding:{CONTENT_ENCODING}\ncontent-type:{CONTENT_TYPE}\nhost:{}\nx-amz-date:{amz_date}\nx-amz-target:{}\n\n{SIGNED_HEADERS}\n{}",
        req.path,
        req.host,
        req.target,
        sha256_hex(req.payload.as_bytes())
    )
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn request(payload: &str) -> SignRequest<'_> {
        SignRequest {
            access_key: "AKIDEXAMPLE",
            secret_key: "wJalrXUtnFEMI",
            region: "us-east-1",
            host: "webservices.amazon.com",
            path: "/paapi5/searchitems",
            target: "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.SearchItems",
            payload,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).single().expect("valid timestamp")
    }

    #[test]
    fn canonical_request_has_expected_layout() {
        let req = request("{}");
        let canonical = canonical_request(&req, "20260829T120000Z");
        let lines: Vec<&str> = canonical.split('\n').collect();
        assert_eq!(lines[0], "POST");
        assert_eq!(lines[1], "/paapi5/searchitems");
        assert_eq!(lines[2], "", "query string is always empty");
        assert_eq!(lines[3], "content-encoding:amz-1.0");
        assert_eq!(lines[4], "content-type:application/json; charset=utf-8");
        assert_eq!(lines[5], "host:webservices.amazon.com");
        assert_eq!(lines[6], "x-amz-date:20260829T120000Z");
        assert_eq!(
            lines[7],
            "x-amz-target:com.amazon.paapi5.v1.ProductAdvertisingAPIv1.SearchItems"
        );
        assert_eq!(lines[9], SIGNED_HEADERS);
        // sha256("{}")
        assert_eq!(
            lines[10],
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn sign_produces_scoped_authorization_header() {
        let req = request("{\"Keywords\":\"yoga mat\"}");
        let headers = sign(&req, fixed_now());
        assert_eq!(headers.amz_date, "20260829T120000Z");
        assert!(headers.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20260829/us-east-1/ProductAdvertisingAPI/aws4_request, "
        ));
        assert!(headers
            .authorization
            .contains("SignedHeaders=content-encoding;content-type;host;x-amz-date;x-amz-target"));
        let signature = headers
            .authorization
            .rsplit("Signature=")
            .next()
            .expect("signature present");
        assert_eq!(signature.len(), 64, "hex-encoded SHA-256 HMAC");
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn sign_is_deterministic_for_fixed_inputs() {
        let req = request("{}");
        let a = sign(&req, fixed_now());
        let b = sign(&req, fixed_now());
        assert_eq!(a.authorization, b.authorization);
    }

    #[test]
    fn payload_changes_the_signature() {
        let a = sign(&request("{\"a\":1}"), fixed_now());
        let b = sign(&request("{\"a\":2}"), fixed_now());
        assert_ne!(a.authorization, b.authorization);
    }
}
