//! Decoding of function trigger payloads.
//!
//! Two shapes are accepted:
//! - a storage event posted directly: `{"bucket": "...", "name": "...", ...}`
//! - a Pub/Sub push envelope whose `message.data` is the base64 encoded event

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use vlab_models::StorageEvent;

use crate::error::{ApiError, ApiResult};

/// Pub/Sub push subscription request body.
#[derive(Debug, Deserialize)]
pub struct PushEnvelope {
    pub message: PubSubMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PubSubMessage {
    /// Base64 encoded payload
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

impl PubSubMessage {
    fn decode(&self) -> ApiResult<Value> {
        if self.data.is_empty() {
            return Err(ApiError::bad_request("Pub/Sub message has no data"));
        }
        let raw = STANDARD
            .decode(self.data.trim())
            .map_err(|e| ApiError::bad_request(format!("message data is not base64: {}", e)))?;
        serde_json::from_slice(&raw)
            .map_err(|e| ApiError::bad_request(format!("message data is not a JSON event: {}", e)))
    }
}

/// Parse a request body into a validated storage event.
pub fn decode_event(body: &[u8]) -> ApiResult<StorageEvent> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("body is not valid JSON: {}", e)))?;

    let payload = if value.get("message").is_some_and(Value::is_object) {
        let envelope: PushEnvelope = serde_json::from_value(value)
            .map_err(|e| ApiError::bad_request(format!("invalid Pub/Sub envelope: {}", e)))?;
        debug!(
            message_id = envelope.message.message_id.as_deref().unwrap_or("-"),
            subscription = envelope.subscription.as_deref().unwrap_or("-"),
            "Unwrapping Pub/Sub push message"
        );
        envelope.message.decode()?
    } else {
        value
    };

    let event: StorageEvent = serde_json::from_value(payload)
        .map_err(|e| ApiError::bad_request(format!("invalid storage event: {}", e)))?;
    Ok(event.validated()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn push_body(event: &Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "message": {
                "data": STANDARD.encode(event.to_string()),
                "messageId": "123",
                "attributes": {"eventType": "OBJECT_FINALIZE"}
            },
            "subscription": "projects/p/subscriptions/images"
        }))
        .unwrap()
    }

    #[test]
    fn test_direct_event_ignores_extra_fields() {
        let body = json!({
            "bucket": "images-in",
            "name": "cats/tabby.jpg",
            "contentType": "image/jpeg",
            "size": "1234"
        });
        let event = decode_event(body.to_string().as_bytes()).unwrap();
        assert_eq!(event, StorageEvent::new("images-in", "cats/tabby.jpg"));
    }

    #[test]
    fn test_pubsub_envelope() {
        let body = push_body(&json!({"bucket": "images-in", "name": "dog.png"}));
        let event = decode_event(&body).unwrap();
        assert_eq!(event.gcs_uri(), "gs://images-in/dog.png");
    }

    #[test]
    fn test_rejects_missing_name() {
        let err = decode_event(br#"{"bucket": "images-in"}"#).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_rejects_empty_bucket() {
        let err = decode_event(br#"{"bucket": "", "name": "a.jpg"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Model(_)));
    }

    #[test]
    fn test_rejects_bad_base64() {
        let body = json!({"message": {"data": "%%%not-base64"}});
        let err = decode_event(body.to_string().as_bytes()).unwrap_err();
        assert!(err.to_string().contains("base64"));
    }

    #[test]
    fn test_rejects_empty_message() {
        let body = json!({"message": {}});
        assert!(decode_event(body.to_string().as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_non_json() {
        assert!(matches!(decode_event(b"bucket=a&name=b"), Err(ApiError::BadRequest(_))));
    }
}
