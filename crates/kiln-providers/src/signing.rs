//! HMAC-SHA256 request signing for vendors that authenticate with a
//! derived, date-scoped key (Volcengine style, close to AWS SigV4).

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use kiln_core::error::{KilnError, Result};

pub const ALGORITHM: &str = "HMAC-SHA256";
pub const SIGNED_HEADERS: &str = "host;x-date;x-content-sha256;content-type";
pub const CONTENT_TYPE: &str = "application/json";

/// Terminal element of the credential scope.
const SCOPE_TERMINATOR: &str = "request";

type HmacSha256 = Hmac<Sha256>;

/// Output of [`Signer::sign`]: the signature plus every header that must
/// accompany the request for the vendor to accept it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub x_date: String,
    pub content_sha256: String,
    pub canonical_query: String,
    pub signature: String,
    pub authorization: String,
}

impl SignedRequest {
    /// Header set in the order the vendor documents it.
    pub fn headers(&self, host: &str) -> Vec<(&'static str, String)> {
        vec![
            ("Host", host.to_string()),
            ("X-Date", self.x_date.clone()),
            ("X-Content-Sha256", self.content_sha256.clone()),
            ("Content-Type", CONTENT_TYPE.to_string()),
            ("Authorization", self.authorization.clone()),
        ]
    }
}

/// Holds the signing credentials and scope for one vendor account.
///
/// The secret never leaves this type; only derived signatures do.
#[derive(Debug, Clone)]
pub struct Signer {
    access_key: String,
    secret_key: SecretString,
    region: String,
    service: String,
    host: String,
}

impl Signer {
    /// Fails with a configuration error when the secret is missing or blank,
    /// so no unsigned request can ever be attempted.
    pub fn new(
        access_key: impl Into<String>,
        secret_key: Option<SecretString>,
        region: impl Into<String>,
        service: impl Into<String>,
        host: impl Into<String>,
    ) -> Result<Self> {
        let secret_key = secret_key
            .filter(|s| !s.expose_secret().trim().is_empty())
            .ok_or_else(|| KilnError::Configuration("api_secret is required for signing".into()))?;
        let access_key = access_key.into();
        if access_key.trim().is_empty() {
            return Err(KilnError::Configuration(
                "api_key is required for signing".into(),
            ));
        }
        Ok(Self {
            access_key,
            secret_key,
            region: region.into(),
            service: service.into(),
            host: host.into(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Sign one request. Pure given `now`: identical inputs produce an
    /// identical [`SignedRequest`].
    pub fn sign(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, &str)],
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<SignedRequest> {
        let x_date = format_x_date(now);
        let date8 = &x_date[..8];
        let content_sha256 = sha256_hex(body);
        let canonical_query = canonical_query(query);

        let canonical = canonical_request(
            method,
            path,
            &canonical_query,
            &self.host,
            &x_date,
            &content_sha256,
        );
        let scope = credential_scope(date8, &self.region, &self.service);
        let to_sign = string_to_sign(&x_date, &scope, &canonical);

        let key = derive_signing_key(
            self.secret_key.expose_secret().as_bytes(),
            date8,
            &self.region,
            &self.service,
        )?;
        let signature = hex::encode(hmac_sha256(&key, to_sign.as_bytes())?);

        let authorization = format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            self.access_key
        );

        Ok(SignedRequest {
            x_date,
            content_sha256,
            canonical_query,
            signature,
            authorization,
        })
    }
}

/// Percent-encode for the canonical query.
///
/// `urlencoding` leaves only `A-Z a-z 0-9 - . _ ~` bare, so `*` comes out
/// as `%2A`, which the vendor's verifier requires.
pub fn encode(source: &str) -> String {
    urlencoding::encode(source).into_owned()
}

/// `k=v` pairs sorted by key, both sides encoded, joined with `&`.
pub fn canonical_query(params: &[(&str, &str)]) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn canonical_request(
    method: &str,
    path: &str,
    canonical_query: &str,
    host: &str,
    x_date: &str,
    content_sha256: &str,
) -> String {
    [
        method,
        path,
        canonical_query,
        format!("host:{host}").as_str(),
        format!("x-date:{x_date}").as_str(),
        format!("x-content-sha256:{content_sha256}").as_str(),
        format!("content-type:{CONTENT_TYPE}").as_str(),
        "",
        SIGNED_HEADERS,
        content_sha256,
    ]
    .join("\n")
}

pub fn credential_scope(date8: &str, region: &str, service: &str) -> String {
    format!("{date8}/{region}/{service}/{SCOPE_TERMINATOR}")
}

pub fn string_to_sign(x_date: &str, scope: &str, canonical_request: &str) -> String {
    [
        ALGORITHM,
        x_date,
        scope,
        sha256_hex(canonical_request.as_bytes()).as_str(),
    ]
    .join("\n")
}

/// `HMAC(HMAC(HMAC(HMAC(secret, date8), region), service), "request")`
pub fn derive_signing_key(
    secret: &[u8],
    date8: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>> {
    let k_date = hmac_sha256(secret, date8.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, SCOPE_TERMINATOR.as_bytes())
}

pub fn format_x_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| KilnError::Configuration(format!("invalid signing key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
