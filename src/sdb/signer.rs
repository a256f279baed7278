//! Signature version 1 request signer
//!
//! Canonical form: every parameter as a `(key, value)` string pair, sorted by
//! key case-insensitively (stable for equal keys), concatenated as
//! `key + value` with no separators. The signature is the base64 encoded
//! HMAC-SHA1 of that buffer under the secret key.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::cmp::Ordering;
use std::fmt;

use crate::sdb::dialect::{Dialect, SIGNATURE_VERSION};
use crate::sdb::query::QueryParams;

type HmacSha1 = Hmac<Sha1>;

/// Signs query requests with an account's credentials
#[derive(Clone)]
pub struct RequestSigner {
    access_key: String,
    secret_key: String,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl RequestSigner {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Signature over every pair of `params`
    pub fn signature(&self, params: &QueryParams) -> String {
        sign(&self.secret_key, params.pairs())
    }

    /// Merge the envelope fields into `params`, sign, and append `Signature`.
    ///
    /// The returned mapping is ready to be encoded as the request query.
    pub fn sign_params(
        &self,
        mut params: QueryParams,
        dialect: Dialect,
        timestamp: DateTime<Utc>,
    ) -> QueryParams {
        params.insert("AWSAccessKeyId", self.access_key.as_str());
        params.insert("SignatureVersion", SIGNATURE_VERSION);
        params.insert("Timestamp", format_timestamp(timestamp));
        params.insert("Version", dialect.api_version());

        let signature = self.signature(&params);
        params.insert("Signature", signature);
        params
    }
}

/// ISO-8601 timestamp as sent in the `Timestamp` parameter
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Compute the signature for a set of pairs under `secret_key`.
///
/// The result does not depend on the order of `pairs` except between keys that
/// compare equal ignoring ASCII case, which keep their relative order.
pub fn sign<'a, I>(secret_key: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let buffer = canonical_string(pairs);
    let digest = hmac_sha1(secret_key.as_bytes(), buffer.as_bytes());
    let encoded = STANDARD.encode(digest);
    encoded.trim_end_matches('\n').to_string()
}

/// Sorted `key + value` concatenation that gets signed
pub fn canonical_string<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut sorted: Vec<(&str, &str)> = pairs.into_iter().collect();
    // Vec::sort_by is stable: equal keys keep encounter order
    sorted.sort_by(|a, b| cmp_ignore_ascii_case(a.0, b.0));

    let mut buffer = String::with_capacity(sorted.iter().map(|(k, v)| k.len() + v.len()).sum());
    for (key, value) in sorted {
        buffer.push_str(key);
        buffer.push_str(value);
    }
    buffer
}

fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

fn hmac_sha1(key: &[u8], msg: &[u8]) -> [u8; 20] {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(msg);
    let result = mac.finalize().into_bytes();
    let mut output = [0u8; 20];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn published_example() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Timestamp", "2004-02-12T15:19:21+00:00"),
            ("adc", "1"),
            ("aab", "2"),
            ("AWSAccessKeyId", "my_access_id"),
            ("SignatureVersion", "1"),
            ("Action", "Get"),
            ("Version", "2006-08-11"),
        ]
    }

    #[test]
    fn test_known_answer() {
        assert_eq!(
            sign("secret_key", published_example()),
            "xlrD17jnkGk6E3nVVOV3Qon3Nwg="
        );
    }

    #[test]
    fn test_canonical_string_sorts_ignoring_case() {
        assert_eq!(
            canonical_string(published_example()),
            "aab2ActionGetadc1AWSAccessKeyIdmy_access_idSignatureVersion1\
             Timestamp2004-02-12T15:19:21+00:00Version2006-08-11"
        );
    }

    #[test]
    fn test_order_independent() {
        let mut reversed = published_example();
        reversed.reverse();
        assert_eq!(
            sign("secret_key", reversed),
            sign("secret_key", published_example())
        );
    }

    #[test]
    fn test_key_case_ignored_for_ordering() {
        // "action" sorts before "Version" only when case is folded
        assert_eq!(
            canonical_string(vec![("Version", "1"), ("action", "Get")]),
            "actionGetVersion1"
        );
        assert_eq!(
            canonical_string(vec![("version", "1"), ("Action", "Get")]),
            "ActionGetversion1"
        );
    }

    #[test]
    fn test_stable_for_case_equal_keys() {
        assert_eq!(canonical_string(vec![("B", "1"), ("b", "2")]), "B1b2");
        assert_eq!(canonical_string(vec![("b", "2"), ("B", "1")]), "b2B1");
    }

    #[test]
    fn test_signature_has_no_trailing_newline() {
        let sig = sign("secret", vec![("a", "b")]);
        assert!(!sig.ends_with('\n'));
        assert_eq!(sig.len(), 28);
    }

    #[test]
    fn test_sign_params_adds_envelope() {
        let signer = RequestSigner::new("my_access_id", "secret_key");
        let ts = Utc.with_ymd_and_hms(2004, 2, 12, 15, 19, 21).unwrap();
        let params = QueryParams::new()
            .with("adc", "1")
            .with("aab", "2")
            .with("Action", "Get");

        let signed = signer.sign_params(params, Dialect::Sds, ts);

        assert_eq!(signed.get("AWSAccessKeyId").and_then(|v| v.as_single()), Some("my_access_id"));
        assert_eq!(signed.get("SignatureVersion").and_then(|v| v.as_single()), Some("1"));
        assert_eq!(
            signed.get("Timestamp").and_then(|v| v.as_single()),
            Some("2004-02-12T15:19:21+00:00")
        );
        assert_eq!(signed.get("Version").and_then(|v| v.as_single()), Some("2006-08-11"));
        assert_eq!(
            signed.get("Signature").and_then(|v| v.as_single()),
            Some("xlrD17jnkGk6E3nVVOV3Qon3Nwg=")
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let signer = RequestSigner::new("id", "super-secret");
        let printed = format!("{:?}", signer);
        assert!(!printed.contains("super-secret"));
    }
}
