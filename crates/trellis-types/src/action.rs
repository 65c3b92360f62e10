//! Action registration and module-interface metadata.

use crate::id::TopicId;
use crate::validation::{is_hex_digest, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One operation on an action topic's log.
///
/// Registration is the only operation the protocol currently defines;
/// modeling it as a tagged union keeps unknown `op` values out of the fold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ActionOperation {
    Register(ActionRegistration),
}

/// Immutable registration of one executable action module.
///
/// `hash` keys the Action Registry's secondary index; a given hash resolves
/// to exactly one registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRegistration {
    /// Content hash of the module interface (64-char lowercase hex SHA-256).
    pub hash: String,

    /// Hash of the WASM binary artifact.
    pub wasm_hash: String,

    /// Topic holding the WASM binary.
    #[serde(rename = "t_id")]
    pub artifact_topic: TopicId,

    /// Topic holding the module-interface metadata blob, when published.
    #[serde(rename = "info_t_id", skip_serializing_if = "Option::is_none")]
    pub info_topic: Option<TopicId>,
}

impl ActionRegistration {
    /// Shape check: hex digests and a non-empty artifact location.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_hex_digest(&self.hash) {
            return Err(ValidationError::new(
                "hash",
                "expected 64-char lowercase hex digest",
            ));
        }
        if !is_hex_digest(&self.wasm_hash) {
            return Err(ValidationError::new(
                "wasm_hash",
                "expected 64-char lowercase hex digest",
            ));
        }
        if self.artifact_topic.as_str().is_empty() {
            return Err(ValidationError::new("t_id", "artifact topic must not be empty"));
        }
        Ok(())
    }
}

/// Interface metadata an action module publishes alongside its registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionModuleInfo {
    pub name: String,
    pub version: String,
    pub creator: String,
    pub purpose: String,
    pub actions: Vec<ActionInterface>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<Capability>,
}

/// One callable operation the module exposes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionInterface {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub inputs: Vec<ParameterSpec>,
    #[serde(default)]
    pub outputs: Vec<ParameterSpec>,
}

/// Named, typed parameter with optional numeric range validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "param_type")]
    pub kind: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Capability the module needs from its host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Capability {
    Network {
        networks: Vec<String>,
        operations: Vec<String>,
    },
    Transaction {
        transaction_types: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_fee: Option<f64>,
    },
    External {
        value: Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> ActionRegistration {
        ActionRegistration {
            hash: "ab".repeat(32),
            wasm_hash: "cd".repeat(32),
            artifact_topic: TopicId::new("0.0.500"),
            info_topic: None,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn bad_hash_names_field() {
        let mut reg = registration();
        reg.wasm_hash = "nope".to_string();
        let err = reg.validate().unwrap_err();
        assert_eq!(err.field, "wasm_hash");
    }

    #[test]
    fn wire_roundtrip_uses_original_field_names() {
        let json = serde_json::to_value(ActionOperation::Register(registration())).unwrap();
        assert_eq!(json["op"], "register");
        assert!(json.get("t_id").is_some());
        assert!(json.get("info_t_id").is_none());

        let back: ActionOperation = serde_json::from_value(json).unwrap();
        let ActionOperation::Register(reg) = back;
        assert_eq!(reg, registration());
    }
}
