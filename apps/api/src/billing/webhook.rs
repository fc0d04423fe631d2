//! Stripe webhook verification and event interpretation. Pure; no IO.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use uuid::Uuid;

use crate::errors::AppError;
use crate::subscription::tiers::Tier;

pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

/// `t=<unix>,v1=<hex>[,v1=<hex>...]`; other schemes are ignored.
fn parse_signature_header(header: &str) -> Option<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }
    Some(SignatureHeader {
        timestamp: timestamp?,
        signatures,
    })
}

pub fn verify_signature(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    now_unix: i64,
) -> Result<(), AppError> {
    let invalid = |reason: &str| AppError::Validation(format!("Invalid webhook signature: {reason}"));

    let header = header.ok_or_else(|| invalid("missing header"))?;
    let parsed = parse_signature_header(header).ok_or_else(|| invalid("malformed header"))?;
    if now_unix.abs_diff(parsed.timestamp) > SIGNATURE_TOLERANCE_SECS.unsigned_abs() {
        return Err(invalid("timestamp outside tolerance"));
    }

    for candidate in &parsed.signatures {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC key rejected: {e}")))?;
        mac.update(parsed.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        // verify_slice compares in constant time
        if mac.verify_slice(candidate).is_ok() {
            return Ok(());
        }
    }
    Err(invalid("no matching signature"))
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: Value,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TierChange {
    Set { user_id: Uuid, tier: Tier },
    Ignore(String),
}

pub fn tier_for_lookup_key(lookup_key: &str) -> Option<Tier> {
    match lookup_key {
        "pro" | "pro_monthly" | "pro_yearly" => Some(Tier::Pro),
        "premium" | "premium_monthly" | "premium_yearly" => Some(Tier::Premium),
        _ => None,
    }
}

fn subscription_user(object: &Value) -> Option<Uuid> {
    object
        .pointer("/metadata/user_id")
        .and_then(Value::as_str)
        .and_then(|id| Uuid::parse_str(id).ok())
}

/// Maps an event to the tier change it implies.
pub fn interpret_event(event: &WebhookEvent) -> TierChange {
    let object = &event.data.object;
    match event.event_type.as_str() {
        "customer.subscription.created" | "customer.subscription.updated" => {
            let Some(user_id) = subscription_user(object) else {
                return TierChange::Ignore("subscription has no metadata.user_id".to_string());
            };
            let lookup_key = object
                .pointer("/items/data/0/price/lookup_key")
                .and_then(Value::as_str)
                .unwrap_or_default();
            match tier_for_lookup_key(lookup_key) {
                Some(tier) => TierChange::Set { user_id, tier },
                None => TierChange::Ignore(format!("unknown price lookup_key '{lookup_key}'")),
            }
        }
        "customer.subscription.deleted" => match subscription_user(object) {
            Some(user_id) => TierChange::Set {
                user_id,
                tier: Tier::Free,
            },
            None => TierChange::Ignore("subscription has no metadata.user_id".to_string()),
        },
        other => TierChange::Ignore(format!("unhandled event type {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test";

    fn sign(payload: &[u8], timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn event(event_type: &str, object: Value) -> WebhookEvent {
        serde_json::from_value(json!({"type": event_type, "data": {"object": object}})).unwrap()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = br#"{"type":"ping"}"#;
        let header = sign(payload, 1_700_000_000);
        assert!(verify_signature(payload, Some(&header), SECRET, 1_700_000_100).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = sign(b"original", 1_700_000_000);
        let err = verify_signature(b"tampered", Some(&header), SECRET, 1_700_000_000).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let header = sign(b"{}", 1_700_000_000);
        assert!(verify_signature(b"{}", Some(&header), SECRET, 1_700_000_301).is_err());
    }

    #[test]
    fn test_extreme_timestamp_rejected() {
        let header = "t=-9223372036854775000,v1=00";
        assert!(verify_signature(b"{}", Some(header), SECRET, 1_760_000_000).is_err());
        let header = format!("t={},v1=00", i64::MAX);
        assert!(verify_signature(b"{}", Some(&header), SECRET, i64::MIN + 1).is_err());
    }

    #[test]
    fn test_missing_or_malformed_header_rejected() {
        assert!(verify_signature(b"{}", None, SECRET, 0).is_err());
        assert!(verify_signature(b"{}", Some("v1=abcd"), SECRET, 0).is_err());
        assert!(verify_signature(b"{}", Some("t=0,v1=not-hex"), SECRET, 0).is_err());
    }

    #[test]
    fn test_second_v1_signature_can_match() {
        let payload = b"{}";
        let valid = sign(payload, 1_000);
        let header = format!("t=1000,v1={},{}", "00".repeat(32), valid.split(',').nth(1).unwrap());
        assert!(verify_signature(payload, Some(&header), SECRET, 1_000).is_ok());
    }

    #[test]
    fn test_subscription_updated_maps_lookup_key() {
        let user_id = Uuid::new_v4();
        let e = event(
            "customer.subscription.updated",
            json!({
                "metadata": {"user_id": user_id.to_string()},
                "items": {"data": [{"price": {"lookup_key": "premium_monthly"}}]}
            }),
        );
        assert_eq!(
            interpret_event(&e),
            TierChange::Set {
                user_id,
                tier: Tier::Premium
            }
        );
    }

    #[test]
    fn test_unknown_lookup_key_ignored() {
        let e = event(
            "customer.subscription.created",
            json!({
                "metadata": {"user_id": Uuid::new_v4().to_string()},
                "items": {"data": [{"price": {"lookup_key": "enterprise"}}]}
            }),
        );
        assert!(matches!(interpret_event(&e), TierChange::Ignore(_)));
    }

    #[test]
    fn test_deleted_subscription_downgrades() {
        let user_id = Uuid::new_v4();
        let e = event(
            "customer.subscription.deleted",
            json!({"metadata": {"user_id": user_id.to_string()}}),
        );
        assert_eq!(
            interpret_event(&e),
            TierChange::Set {
                user_id,
                tier: Tier::Free
            }
        );
    }

    #[test]
    fn test_other_events_ignored() {
        let e = event("invoice.paid", json!({}));
        assert!(matches!(interpret_event(&e), TierChange::Ignore(_)));
    }
}
