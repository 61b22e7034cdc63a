//! Event payload validation and credential injection

use base64::Engine;
use serde_json::{Map, Value};
use trackrelay_config::Credential;

use crate::error::{TrackError, TrackResult};

pub const PROPERTIES_KEY: &str = "properties";
pub const TOKEN_KEY: &str = "token";

/// A client event, guaranteed to be a JSON object at the top level
#[derive(Debug, Clone, PartialEq)]
pub struct EventPayload(Map<String, Value>);

impl EventPayload {
    /// Parse a raw request body. Anything other than a JSON object is rejected.
    pub fn from_slice(body: &[u8]) -> TrackResult<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| TrackError::InvalidPayload(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> TrackResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Array(_) => Err(TrackError::InvalidPayload(
                "expected object, got array".to_string(),
            )),
            Value::Null => Err(TrackError::InvalidPayload(
                "expected object, got null".to_string(),
            )),
            _ => Err(TrackError::InvalidPayload(
                "expected object, got scalar".to_string(),
            )),
        }
    }

    /// Set `properties.token` to the server credential.
    ///
    /// A missing or non-object `properties` is replaced by an empty object
    /// first. A client-supplied token is always overwritten.
    pub fn inject_credential(&mut self, credential: &Credential) {
        let properties = self
            .0
            .entry(PROPERTIES_KEY)
            .or_insert_with(|| Value::Object(Map::new()));

        if !properties.is_object() {
            *properties = Value::Object(Map::new());
        }

        if let Value::Object(bag) = properties {
            bag.insert(
                TOKEN_KEY.to_string(),
                Value::String(credential.expose().to_string()),
            );
        }
    }

    /// Compact JSON, base64 encoded (standard alphabet, padded)
    pub fn encode(&self) -> TrackResult<String> {
        let json =
            serde_json::to_vec(&self.0).map_err(|e| TrackError::Encoding(e.to_string()))?;
        Ok(base64::engine::general_purpose::STANDARD.encode(json))
    }

    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.0.get(PROPERTIES_KEY).and_then(Value::as_object)
    }

    pub fn event_name(&self) -> Option<&str> {
        self.0.get("event").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credential() -> Credential {
        Credential::new("T1").unwrap()
    }

    fn decode(encoded: &str) -> Value {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_accepts_only_objects() {
        assert!(EventPayload::from_slice(br#"{"event":"play"}"#).is_ok());

        let bodies: [&[u8]; 7] = [
            br#"[1,2,3]"#,
            br#""not an object""#,
            b"42",
            b"null",
            b"true",
            b"{not json",
            b"",
        ];
        for body in bodies {
            match EventPayload::from_slice(body) {
                Err(TrackError::InvalidPayload(_)) => (),
                other => panic!(
                    "Expected InvalidPayload for {:?}, got {:?}",
                    String::from_utf8_lossy(body),
                    other
                ),
            }
        }
    }

    #[test]
    fn test_nesting_depth_limit() {
        fn nested(depth: usize) -> String {
            format!("{}1{}", r#"{"a":"#.repeat(depth), "}".repeat(depth))
        }

        assert!(EventPayload::from_slice(nested(100).as_bytes()).is_ok());

        // serde_json stops recursing at 128 levels
        match EventPayload::from_slice(nested(200).as_bytes()) {
            Err(TrackError::InvalidPayload(_)) => (),
            other => panic!("Expected InvalidPayload, got {:?}", other),
        }
    }

    #[test]
    fn test_creates_properties_when_absent() {
        let mut payload = EventPayload::from_value(json!({"event": "play"})).unwrap();
        payload.inject_credential(&credential());

        assert_eq!(
            payload.properties().unwrap().get(TOKEN_KEY),
            Some(&json!("T1"))
        );
    }

    #[test]
    fn test_overwrites_forged_token() {
        let mut payload = EventPayload::from_value(json!({
            "event": "play",
            "properties": {"token": "forged", "distinct_id": "u1"}
        }))
        .unwrap();
        payload.inject_credential(&credential());

        let properties = payload.properties().unwrap();
        assert_eq!(properties.get(TOKEN_KEY), Some(&json!("T1")));
        assert_eq!(properties.get("distinct_id"), Some(&json!("u1")));
    }

    #[test]
    fn test_replaces_non_object_properties() {
        for properties in [json!(null), json!("text"), json!(7), json!([1, 2])] {
            let mut payload =
                EventPayload::from_value(json!({"event": "play", "properties": properties}))
                    .unwrap();
            payload.inject_credential(&credential());
            assert_eq!(
                Value::Object(payload.properties().unwrap().clone()),
                json!({"token": "T1"})
            );
        }
    }

    #[test]
    fn test_encode_matches_documented_example() {
        let mut payload = EventPayload::from_slice(br#"{"event":"play"}"#).unwrap();
        payload.inject_credential(&credential());

        let encoded = payload.encode().unwrap();
        let raw = base64::engine::general_purpose::STANDARD
            .decode(&encoded)
            .unwrap();
        assert_eq!(
            String::from_utf8(raw).unwrap(),
            r#"{"event":"play","properties":{"token":"T1"}}"#
        );
    }

    #[test]
    fn test_encode_preserves_key_order() {
        let mut payload =
            EventPayload::from_slice(br#"{"zeta":1,"event":"play","alpha":{"b":1,"a":2}}"#)
                .unwrap();
        payload.inject_credential(&credential());

        let raw = base64::engine::general_purpose::STANDARD
            .decode(payload.encode().unwrap())
            .unwrap();
        assert_eq!(
            String::from_utf8(raw).unwrap(),
            r#"{"zeta":1,"event":"play","alpha":{"b":1,"a":2},"properties":{"token":"T1"}}"#
        );
    }

    #[test]
    fn test_encode_handles_unicode() {
        let mut payload =
            EventPayload::from_value(json!({"event": "lecture \u{e9}t\u{e9} \u{1f3a7}"}))
                .unwrap();
        payload.inject_credential(&credential());

        let decoded = decode(&payload.encode().unwrap());
        assert_eq!(decoded["event"], json!("lecture \u{e9}t\u{e9} \u{1f3a7}"));
        assert_eq!(decoded["properties"]["token"], json!("T1"));
    }
}
