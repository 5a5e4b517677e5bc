use serde::Serialize;
use serde_json::Value;

use marker_api::{MarkerContext, MarkerRecord, new_marker_id, now_ms};

use crate::ValidationError;

// ═══════════════════════════════════════════════════════════════
//  MarkerFactory
// ═══════════════════════════════════════════════════════════════

/// Validates `(name, value)` pairs and stamps them into `MarkerRecord`s.
///
/// `source_id` and `context` are fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct MarkerFactory {
    source_id: String,
    context: MarkerContext,
}

impl MarkerFactory {
    pub fn new(source_id: impl Into<String>, context: MarkerContext) -> Self {
        Self {
            source_id: source_id.into(),
            context,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn context(&self) -> &MarkerContext {
        &self.context
    }

    /// Build a record. The name is checked before the value is serialized.
    pub fn create<T: Serialize>(&self, name: &str, value: T) -> Result<MarkerRecord, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let value = serde_json::to_value(value)?;
        check_shape(&value)?;

        Ok(MarkerRecord {
            id: new_marker_id(),
            timestamp: now_ms(),
            name: name.to_string(),
            source_id: self.source_id.clone(),
            value,
            context: self.context.clone(),
        })
    }
}

/// Accept composites (object, array) and null; reject scalars.
pub fn check_shape(value: &Value) -> Result<(), ValidationError> {
    let kind = match value {
        Value::Null | Value::Object(_) | Value::Array(_) => return Ok(()),
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
    };
    Err(ValidationError::InvalidPayloadShape { kind })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct LevelUp {
        level: u32,
        class: &'static str,
    }

    fn factory() -> MarkerFactory {
        MarkerFactory::new("unity-0000", MarkerContext::default())
    }

    #[test]
    fn stamps_identity_and_context() {
        let f = factory();
        let before = now_ms();
        let r = f.create("level_up", LevelUp { level: 7, class: "mage" }).unwrap();
        assert_eq!(r.name, "level_up");
        assert_eq!(r.source_id, "unity-0000");
        assert_eq!(r.value, json!({ "level": 7, "class": "mage" }));
        assert_eq!(r.context, MarkerContext::default());
        assert_eq!(r.id.len(), 32);
        assert!(r.timestamp >= before);

        let other = f.create("level_up", json!({})).unwrap();
        assert_ne!(r.id, other.id);
    }

    #[test]
    fn rejects_blank_names() {
        let f = factory();
        for name in ["", "   ", "\t\n"] {
            assert!(matches!(f.create(name, json!({ "a": 1 })), Err(ValidationError::EmptyName)));
        }
    }

    #[test]
    fn rejects_scalar_payloads() {
        let f = factory();
        let kind = |r: Result<MarkerRecord, ValidationError>| match r {
            Err(ValidationError::InvalidPayloadShape { kind }) => kind,
            other => panic!("expected shape error, got {other:?}"),
        };
        assert_eq!(kind(f.create("m", 42)), "number");
        assert_eq!(kind(f.create("m", 1.5f64)), "number");
        assert_eq!(kind(f.create("m", true)), "boolean");
        assert_eq!(kind(f.create("m", "text")), "string");
        assert_eq!(kind(f.create("m", String::from("owned"))), "string");
    }

    #[test]
    fn accepts_composites_and_null() {
        let f = factory();
        assert!(f.create("m", json!({ "k": "v" })).is_ok());
        assert!(f.create("m", vec![1, 2, 3]).is_ok());
        assert!(f.create("m", HashMap::from([("k", 1)])).is_ok());
        assert!(f.create("m", Option::<u32>::None).is_ok());
        assert!(f.create("m", ()).is_ok());
    }

    #[test]
    fn unserializable_payload_is_rejected() {
        let f = factory();
        let bad = HashMap::from([((1, 2), "tuple keys are not valid JSON keys")]);
        assert!(matches!(f.create("m", bad), Err(ValidationError::Payload(_))));
    }
}
