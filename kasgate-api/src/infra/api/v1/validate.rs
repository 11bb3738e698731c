// This file is part of kasgate.
// Copyright (C) 2025 KasGate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Request validation and input sanitization. Merchant-provided free text is stripped of
//! HTML tags, script-carrying protocols and inline event handlers before it is stored or
//! echoed anywhere.

use crate::infra::api::ApiError;
use chrono::{DateTime, Utc};
use kasgate_common::domain::{MIN_PAYMENT_SOMPI, Sompi, kas_to_sompi, sompi_to_kas};
use kasgate_engine::domain::{deriver::AddressDeriver, parse_ts};
use std::collections::BTreeMap;

pub const ORDER_ID_MAX_LEN: usize = 100;
pub const METADATA_MAX_KEYS: usize = 20;
pub const METADATA_KEY_MAX_LEN: usize = 50;
pub const METADATA_VALUE_MAX_LEN: usize = 500;
pub const METADATA_MAX_JSON_BYTES: usize = 1024;
pub const NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 255;

/// Parse and bound a KAS amount string (`^\d+(\.\d{1,8})?$`, at least 0.001 KAS).
pub fn amount(value: &str) -> Result<Sompi, ApiError> {
    let sompi = kas_to_sompi(value).map_err(|error| {
        ApiError::bad_request("invalid_amount", error.to_string())
    })?;

    if sompi < MIN_PAYMENT_SOMPI {
        return Err(ApiError::bad_request(
            "amount_below_minimum",
            format!(
                "minimum payment is {} KAS",
                sompi_to_kas(MIN_PAYMENT_SOMPI)
            ),
        ));
    }

    Ok(sompi)
}

/// Validate an xPub: shape check first, then the derivation library has the final word.
pub fn xpub(value: &str, deriver: &impl AddressDeriver) -> Result<(), ApiError> {
    let invalid = || ApiError::bad_request("invalid_xpub", "malformed extended public key");

    let rest = value
        .strip_prefix("xpub")
        .or_else(|| value.strip_prefix("kpub"))
        .ok_or_else(invalid)?;
    if !(90..=130).contains(&rest.len()) || !rest.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(invalid());
    }

    deriver.parse(value).map_err(|_| invalid())
}

/// An absolute URL; HTTPS required when `require_https` (webhook endpoints).
pub fn url(value: &str, require_https: bool) -> Result<String, ApiError> {
    let value = value.trim();
    let is_https = value.starts_with("https://");
    let is_http = value.starts_with("http://");

    if !is_https && !(is_http && !require_https) {
        return Err(ApiError::bad_request(
            "invalid_url",
            if require_https {
                "an absolute https:// URL is required"
            } else {
                "an absolute URL is required"
            },
        ));
    }
    if value.len() <= "https://".len() || value.len() > 2_048 {
        return Err(ApiError::bad_request("invalid_url", "malformed URL"));
    }

    Ok(value.to_owned())
}

pub fn name(value: &str) -> Result<String, ApiError> {
    let value = sanitize_text(value);
    if value.is_empty() || value.chars().count() > NAME_MAX_LEN {
        return Err(ApiError::bad_request(
            "invalid_name",
            format!("name must be 1 to {NAME_MAX_LEN} characters"),
        ));
    }

    Ok(value)
}

pub fn email(value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    let well_formed = value.len() <= EMAIL_MAX_LEN
        && value
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or_default();
    if !well_formed {
        return Err(ApiError::bad_request("invalid_email", "malformed email address"));
    }

    Ok(value.to_owned())
}

/// Sanitize and bound a merchant-provided order ID.
pub fn order_id(value: &str) -> Result<String, ApiError> {
    let value = sanitize_text(value);
    if value.chars().count() > ORDER_ID_MAX_LEN {
        return Err(ApiError::bad_request(
            "invalid_order_id",
            format!("order ID exceeds {ORDER_ID_MAX_LEN} characters"),
        ));
    }

    Ok(value)
}

/// Sanitize and bound a metadata map: key count, per-entry lengths and total JSON size.
pub fn metadata(
    value: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, ApiError> {
    if value.len() > METADATA_MAX_KEYS {
        return Err(ApiError::bad_request(
            "invalid_metadata",
            format!("metadata exceeds {METADATA_MAX_KEYS} keys"),
        ));
    }

    let mut sanitized = BTreeMap::new();
    for (key, entry) in value {
        let key = sanitize_text(key);
        let entry = sanitize_text(entry);

        if key.is_empty() || key.chars().count() > METADATA_KEY_MAX_LEN {
            return Err(ApiError::bad_request(
                "invalid_metadata",
                format!("metadata keys must be 1 to {METADATA_KEY_MAX_LEN} characters"),
            ));
        }
        if entry.chars().count() > METADATA_VALUE_MAX_LEN {
            return Err(ApiError::bad_request(
                "invalid_metadata",
                format!("metadata values must be at most {METADATA_VALUE_MAX_LEN} characters"),
            ));
        }

        sanitized.insert(key, entry);
    }

    let json_len = serde_json::to_string(&sanitized)
        .map(|json| json.len())
        .unwrap_or(usize::MAX);
    if json_len > METADATA_MAX_JSON_BYTES {
        return Err(ApiError::bad_request(
            "invalid_metadata",
            format!("metadata exceeds {METADATA_MAX_JSON_BYTES} bytes"),
        ));
    }

    Ok(sanitized)
}

/// A `startDate`/`endDate` query value: RFC-3339, or a plain `YYYY-MM-DD` taken as UTC
/// midnight.
pub fn date_param(value: &str, field: &'static str) -> Result<DateTime<Utc>, ApiError> {
    let parsed = parse_ts(value)
        .ok()
        .or_else(|| parse_ts(&format!("{value}T00:00:00Z")).ok());

    parsed.ok_or_else(|| {
        ApiError::bad_request(
            "invalid_date",
            format!("{field} must be RFC-3339 or YYYY-MM-DD"),
        )
    })
}

/// Strip HTML tag spans, `javascript:`/`data:` protocols and inline `on*=` handlers, then
/// trim.
pub fn sanitize_text(value: &str) -> String {
    let without_tags = strip_tags(value);
    let without_protocols = strip_protocols(&without_tags);
    strip_event_handlers(&without_protocols).trim().to_owned()
}

fn strip_tags(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut in_tag = false;

    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

fn strip_protocols(value: &str) -> String {
    let mut result = value.to_owned();
    for protocol in ["javascript:", "data:"] {
        loop {
            let lower = result.to_ascii_lowercase();
            let Some(position) = lower.find(protocol) else {
                break;
            };
            result.replace_range(position..position + protocol.len(), "");
        }
    }

    result
}

fn strip_event_handlers(value: &str) -> String {
    let chars = value.chars().collect::<Vec<_>>();
    let mut result = String::with_capacity(value.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i].eq_ignore_ascii_case(&'o')
            && i + 1 < chars.len()
            && chars[i + 1].eq_ignore_ascii_case(&'n')
        {
            let mut j = i + 2;
            while j < chars.len() && chars[j].is_ascii_alphanumeric() {
                j += 1;
            }
            // "onsomething=" is dropped as a whole; anything else passes through.
            if j > i + 2 && j < chars.len() && chars[j] == '=' {
                i = j + 1;
                continue;
            }
        }

        result.push(chars[i]);
        i += 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_amount_boundaries() {
        // Exactly the minimum is accepted, one sompi below is not.
        assert_eq!(amount("0.001").unwrap(), Sompi(100_000));
        assert_matches!(
            amount("0.00099999"),
            Err(ApiError::BadRequest { code: "amount_below_minimum", .. })
        );
        assert_matches!(
            amount("nonsense"),
            Err(ApiError::BadRequest { code: "invalid_amount", .. })
        );
        assert_matches!(
            amount("1.123456789"),
            Err(ApiError::BadRequest { code: "invalid_amount", .. })
        );
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("  plain ORDER-1  "), "plain ORDER-1");
        assert_eq!(sanitize_text("a<script>alert(1)</script>b"), "aalert(1)b");
        assert_eq!(sanitize_text("JaVaScRiPt:alert(1)"), "alert(1)");
        assert_eq!(sanitize_text("data:text/html,x"), "text/html,x");
        assert_eq!(sanitize_text("x onclick=evil() y"), "x evil() y");
        assert_eq!(sanitize_text("onion rings"), "onion rings");
    }

    #[test]
    fn test_order_id_length() {
        assert!(order_id(&"x".repeat(100)).is_ok());
        assert_matches!(
            order_id(&"x".repeat(101)),
            Err(ApiError::BadRequest { code: "invalid_order_id", .. })
        );
    }

    #[test]
    fn test_metadata_bounds() {
        let mut map = BTreeMap::new();
        map.insert("order".to_owned(), "1".to_owned());
        assert!(metadata(&map).is_ok());

        // 21 keys.
        let too_many = (0..=METADATA_MAX_KEYS)
            .map(|i| (format!("k{i}"), "v".to_owned()))
            .collect::<BTreeMap<_, _>>();
        assert_matches!(
            metadata(&too_many),
            Err(ApiError::BadRequest { code: "invalid_metadata", .. })
        );

        let long_key = BTreeMap::from([("k".repeat(51), "v".to_owned())]);
        assert_matches!(metadata(&long_key), Err(ApiError::BadRequest { .. }));

        let long_value = BTreeMap::from([("k".to_owned(), "v".repeat(501))]);
        assert_matches!(metadata(&long_value), Err(ApiError::BadRequest { .. }));
    }

    #[test]
    fn test_metadata_total_size_boundary() {
        // One key, value tuned so the serialized JSON is exactly at, then just over, the cap.
        // {"k":"…"} adds 8 bytes around the value.
        let at_limit = BTreeMap::from([("k".to_owned(), "v".repeat(METADATA_MAX_JSON_BYTES - 8))]);
        let serialized = serde_json::to_string(&at_limit).unwrap();
        assert_eq!(serialized.len(), METADATA_MAX_JSON_BYTES);
        assert!(metadata(&at_limit).is_ok());

        let over_limit = BTreeMap::from([(
            "kk".to_owned(),
            "v".repeat(METADATA_MAX_JSON_BYTES - 8),
        )]);
        assert_matches!(
            metadata(&over_limit),
            Err(ApiError::BadRequest { code: "invalid_metadata", .. })
        );
    }

    #[test]
    fn test_url() {
        assert!(url("https://example.com/hook", true).is_ok());
        assert_matches!(url("http://example.com/hook", true), Err(ApiError::BadRequest { .. }));
        assert!(url("http://example.com/x", false).is_ok());
        assert_matches!(url("ftp://example.com", false), Err(ApiError::BadRequest { .. }));
        assert_matches!(url("https://", true), Err(ApiError::BadRequest { .. }));
    }

    #[test]
    fn test_email() {
        assert!(email("shop@example.com").is_ok());
        assert_matches!(email("shop@localhost"), Err(ApiError::BadRequest { .. }));
        assert_matches!(email("not-an-email"), Err(ApiError::BadRequest { .. }));
    }

    #[test]
    fn test_date_param() {
        assert!(date_param("2025-06-01", "startDate").is_ok());
        assert!(date_param("2025-06-01T10:00:00Z", "startDate").is_ok());
        assert_matches!(
            date_param("June 1st", "startDate"),
            Err(ApiError::BadRequest { code: "invalid_date", .. })
        );
    }
}
