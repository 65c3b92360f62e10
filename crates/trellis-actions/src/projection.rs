//! Hash index projection over an action topic.

use std::collections::HashMap;
use tracing::warn;
use trellis_registry::{DecodeOutcome, Projection, RegistryEntry};
use trellis_types::{decode_envelope, ActionOperation, ActionRegistration, EnvelopeOutcome};

/// Secondary index `hash -> registration` folded from the entry stream.
///
/// The first registration seen for a hash wins; later duplicates are
/// logged and ignored so the hash -> module mapping stays unambiguous.
#[derive(Default)]
pub struct ActionProjection {
    by_hash: HashMap<String, ActionRegistration>,
}

impl ActionProjection {
    pub fn get(&self, hash: &str) -> Option<&ActionRegistration> {
        self.by_hash.get(hash)
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}

impl Projection for ActionProjection {
    type Payload = ActionRegistration;

    fn decode(&self, raw: &[u8]) -> DecodeOutcome<ActionRegistration> {
        match decode_envelope::<ActionOperation>(raw) {
            EnvelopeOutcome::Message(ActionOperation::Register(registration)) => {
                match registration.validate() {
                    Ok(()) => DecodeOutcome::Accepted(registration),
                    Err(err) => DecodeOutcome::Invalid(err.to_string()),
                }
            }
            EnvelopeOutcome::Foreign => DecodeOutcome::Foreign,
            EnvelopeOutcome::Invalid(reason) => DecodeOutcome::Invalid(reason),
        }
    }

    fn fold(&mut self, entry: &RegistryEntry<ActionRegistration>) {
        let hash = entry.data.hash.clone();
        if self.by_hash.contains_key(&hash) {
            warn!(%hash, entry = %entry.id, "duplicate action hash; keeping first registration");
            return;
        }
        self.by_hash.insert(hash, entry.data.clone());
    }

    fn reset(&mut self) {
        self.by_hash.clear();
    }
}
