//! Protocol-tagged message envelope.
//!
//! Every Trellis wire message is a JSON object carrying a `p` field (the
//! protocol tag) and an `op` field (the operation discriminant). Decoding
//! checks the tag before anything else; the typed payload parse only runs
//! for messages that belong to this protocol.

use crate::PROTOCOL_TAG;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Outcome of decoding one raw log message.
#[derive(Debug)]
pub enum EnvelopeOutcome<T> {
    /// Tag matched and the payload parsed.
    Message(T),
    /// Missing or different protocol tag; not our traffic.
    Foreign,
    /// Tag matched but the body does not parse as a known operation.
    Invalid(String),
}

/// Decode a raw message body into a typed payload.
///
/// `T` is expected to be an `op`-tagged enum (or a struct for single-op
/// topics); unknown `op` values and malformed bodies come back as
/// [`EnvelopeOutcome::Invalid`].
pub fn decode_envelope<T: DeserializeOwned>(raw: &[u8]) -> EnvelopeOutcome<T> {
    let value: Value = match serde_json::from_slice(raw) {
        Ok(value) => value,
        Err(_) => return EnvelopeOutcome::Foreign,
    };
    match value.get("p").and_then(Value::as_str) {
        Some(tag) if tag == PROTOCOL_TAG => {}
        _ => return EnvelopeOutcome::Foreign,
    }
    match serde_json::from_value(value) {
        Ok(payload) => EnvelopeOutcome::Message(payload),
        Err(err) => EnvelopeOutcome::Invalid(err.to_string()),
    }
}

/// Serialize a typed payload into its wire form, inserting the protocol tag.
pub fn encode_envelope<T: Serialize>(payload: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut value = serde_json::to_value(payload)?;
    if let Value::Object(ref mut map) = value {
        map.insert("p".to_string(), Value::String(PROTOCOL_TAG.to_string()));
    }
    serde_json::to_vec(&value)
}
