//! Shared token verification for the Evolution-API webhook
//!
//! Evolution-API can be configured to send the instance api key with every
//! event, either as the `apikey` header or as the `apikey` field of the body.
//! When `WEBHOOK_API_KEY` is set, deliveries without the matching key are
//! rejected.

use ntex::web;
use serde_json::Value;
use subtle::ConstantTimeEq;

use crate::consts;

/// Key sent by the provider: the `apikey` header first, then the body field
pub fn provided_api_key<'a>(req: &'a web::HttpRequest, payload: &'a Value) -> Option<&'a str> {
    req.headers()
        .get(consts::WEBHOOK_API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .or_else(|| payload.get("apikey").and_then(Value::as_str))
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

/// Compares `provided` with `expected` in constant time
pub fn verify_api_key(provided: Option<&str>, expected: &str) -> bool {
    let Some(provided) = provided else {
        logfire::warn!("Webhook request without api key");
        return false;
    };

    let is_valid: bool = provided.as_bytes().ct_eq(expected.as_bytes()).into();

    if !is_valid {
        logfire::warn!("Webhook api key verification failed: keys do not match");
    }

    is_valid
}
