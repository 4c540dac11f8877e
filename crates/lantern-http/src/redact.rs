//! Sanitizers that strip secrets from logged HTTP metadata.
//!
//! All functions copy; the metadata handed to a logger is never the map
//! the caller still holds. Sanitization only touches the fields it knows
//! about, so adding new metadata fields never silently drops them.

use serde_json::{Map, Value};

/// Replacement value for the `if-none-match` header.
const VALIDATOR_PLACEHOLDER: &str = "EXCLUDED";

/// Replacement value for the `authorization` header.
const BEARER_PLACEHOLDER: &str = "Bearer [REDACTED]";

/// Replacement value for blacklisted body keys and cookies.
const REDACTED: &str = "REDACTED";

/// Cookie names whose values are always redacted.
const SENSITIVE_COOKIES: [&str; 2] = ["AccessToken", "RefreshToken"];

/// Copy one field of captured request metadata, sanitizing headers.
///
/// Fields other than `headers` pass through unchanged; a `headers` field
/// that is not an object does too. Returns `None` when the field is
/// absent.
#[must_use]
pub fn sanitize_request_field(request: &Map<String, Value>, field: &str) -> Option<Value> {
    let value = request.get(field)?;
    if field != "headers" {
        return Some(value.clone());
    }
    let Value::Object(headers) = value else {
        return Some(value.clone());
    };
    Some(Value::Object(sanitize_headers(headers)))
}

/// Sanitized copy of a request header map.
///
/// - `if-none-match` is replaced whenever present;
/// - a non-empty `authorization` value becomes `Bearer [REDACTED]`;
/// - `AccessToken` and `RefreshToken` cookies lose their values, other
///   cookies and their order are preserved.
#[must_use]
pub fn sanitize_headers(headers: &Map<String, Value>) -> Map<String, Value> {
    let mut sanitized = headers.clone();
    if sanitized.contains_key("if-none-match") {
        sanitized.insert(
            "if-none-match".to_owned(),
            Value::String(VALIDATOR_PLACEHOLDER.to_owned()),
        );
    }
    if sanitized
        .get("authorization")
        .and_then(Value::as_str)
        .is_some_and(|value| !value.is_empty())
    {
        sanitized.insert(
            "authorization".to_owned(),
            Value::String(BEARER_PLACEHOLDER.to_owned()),
        );
    }
    if let Some(cookie) = sanitized
        .get("cookie")
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
    {
        let rewritten = sanitize_cookie_header(cookie);
        sanitized.insert("cookie".to_owned(), Value::String(rewritten));
    }
    sanitized
}

/// Copy one field of captured response metadata, redacting blacklisted
/// body keys.
///
/// Fields other than `body` pass through unchanged; a `body` field that
/// is not an object does too. Returns `None` when the field is absent.
#[must_use]
pub fn sanitize_response_field(
    response: &Map<String, Value>,
    field: &str,
    blacklist: &[String],
) -> Option<Value> {
    let value = response.get(field)?;
    if field != "body" {
        return Some(value.clone());
    }
    let Value::Object(body) = value else {
        return Some(value.clone());
    };
    Some(Value::Object(redact_body(body, blacklist)))
}

/// Copy of `body` with every truthy blacklisted key overwritten.
///
/// Keys that are absent, or present with a falsy value (`null`, `false`,
/// `0`, `""`), stay as they are.
#[must_use]
pub fn redact_body(body: &Map<String, Value>, blacklist: &[String]) -> Map<String, Value> {
    let mut redacted = body.clone();
    for key in blacklist {
        if redacted.get(key).is_some_and(is_truthy) {
            redacted.insert(key.clone(), Value::String(REDACTED.to_owned()));
        }
    }
    redacted
}

fn sanitize_cookie_header(cookie: &str) -> String {
    let sanitized: Vec<String> = cookie
        .split("; ")
        .map(|entry| {
            for name in SENSITIVE_COOKIES {
                if entry
                    .strip_prefix(name)
                    .is_some_and(|rest| rest.starts_with('='))
                {
                    return format!("{name}={REDACTED}");
                }
            }
            entry.to_owned()
        })
        .collect();
    sanitized.join("; ")
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_authorization_and_cookies_are_redacted() {
        let headers = as_map(json!({
            "authorization": "Bearer SECRET",
            "cookie": "AccessToken=abc; Other=value"
        }));
        let sanitized = sanitize_headers(&headers);
        assert_eq!(sanitized["authorization"], json!("Bearer [REDACTED]"));
        assert_eq!(sanitized["cookie"], json!("AccessToken=REDACTED; Other=value"));
    }

    #[test]
    fn test_if_none_match_replaced_when_present() {
        let headers = as_map(json!({ "if-none-match": "W/\"42-etag\"" }));
        let sanitized = sanitize_headers(&headers);
        assert_eq!(sanitized["if-none-match"], json!("EXCLUDED"));
    }

    #[test]
    fn test_empty_authorization_left_alone() {
        let headers = as_map(json!({ "authorization": "" }));
        let sanitized = sanitize_headers(&headers);
        assert_eq!(sanitized["authorization"], json!(""));
    }

    #[test]
    fn test_cookie_order_and_unknown_cookies_preserved() {
        let headers = as_map(json!({
            "cookie": "Theme=dark; RefreshToken=r-secret; Locale=en"
        }));
        let sanitized = sanitize_headers(&headers);
        assert_eq!(
            sanitized["cookie"],
            json!("Theme=dark; RefreshToken=REDACTED; Locale=en")
        );
    }

    #[test]
    fn test_cookie_name_prefix_does_not_match() {
        let headers = as_map(json!({ "cookie": "AccessTokenExpiry=12345" }));
        let sanitized = sanitize_headers(&headers);
        assert_eq!(sanitized["cookie"], json!("AccessTokenExpiry=12345"));
    }

    #[test]
    fn test_untouched_headers_survive() {
        let headers = as_map(json!({ "accept": "application/json" }));
        let sanitized = sanitize_headers(&headers);
        assert_eq!(sanitized["accept"], json!("application/json"));
    }

    #[test]
    fn test_request_field_passthrough_for_non_headers() {
        let request = as_map(json!({ "method": "GET", "headers": { "cookie": "AccessToken=x" } }));
        assert_eq!(
            sanitize_request_field(&request, "method"),
            Some(json!("GET"))
        );
        assert_eq!(sanitize_request_field(&request, "missing"), None);
    }

    #[test]
    fn test_request_field_sanitizes_headers() {
        let request = as_map(json!({ "headers": { "authorization": "Bearer SECRET" } }));
        assert_eq!(
            sanitize_request_field(&request, "headers"),
            Some(json!({ "authorization": "Bearer [REDACTED]" }))
        );
    }

    #[test]
    fn test_body_blacklist_redacts_truthy_values_only() {
        let blacklist = vec!["password".to_owned(), "token".to_owned()];
        let body = as_map(json!({
            "password": "hunter2",
            "token": "",
            "username": "alice"
        }));
        let redacted = redact_body(&body, &blacklist);
        assert_eq!(redacted["password"], json!("REDACTED"));
        assert_eq!(redacted["token"], json!(""));
        assert_eq!(redacted["username"], json!("alice"));
    }

    #[test]
    fn test_body_blacklist_ignores_absent_keys() {
        let blacklist = vec!["password".to_owned()];
        let body = as_map(json!({ "username": "alice" }));
        let redacted = redact_body(&body, &blacklist);
        assert_eq!(redacted, as_map(json!({ "username": "alice" })));
    }

    #[test]
    fn test_response_field_passthrough_for_non_body() {
        let blacklist = vec!["password".to_owned()];
        let response = as_map(json!({ "statusCode": 200, "body": { "password": "x" } }));
        assert_eq!(
            sanitize_response_field(&response, "statusCode", &blacklist),
            Some(json!(200))
        );
    }

    #[test]
    fn test_response_body_redacted_through_field_access() {
        let blacklist = vec!["password".to_owned()];
        let response = as_map(json!({ "body": { "password": "hunter2", "id": 9 } }));
        assert_eq!(
            sanitize_response_field(&response, "body", &blacklist),
            Some(json!({ "password": "REDACTED", "id": 9 }))
        );
    }

    #[test]
    fn test_scalar_body_passes_through() {
        let blacklist = vec!["password".to_owned()];
        let response = as_map(json!({ "body": "plain text" }));
        assert_eq!(
            sanitize_response_field(&response, "body", &blacklist),
            Some(json!("plain text"))
        );
    }

    #[test]
    fn test_inputs_are_never_mutated() {
        let headers = as_map(json!({ "authorization": "Bearer SECRET" }));
        let _ = sanitize_headers(&headers);
        assert_eq!(headers["authorization"], json!("Bearer SECRET"));
    }

    #[test]
    fn test_sanitization_is_idempotent() {
        let headers = as_map(json!({
            "authorization": "Bearer SECRET",
            "cookie": "AccessToken=abc; Theme=dark",
            "if-none-match": "W/\"42\""
        }));
        let once = sanitize_headers(&headers);
        let twice = sanitize_headers(&once);
        assert_eq!(once, twice);

        let blacklist = vec!["password".to_owned()];
        let body = as_map(json!({ "password": "hunter2" }));
        let once = redact_body(&body, &blacklist);
        let twice = redact_body(&once, &blacklist);
        assert_eq!(once, twice);
    }
}
