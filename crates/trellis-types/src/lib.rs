//! Trellis protocol data model
//!
//! Wire types shared by every Trellis registry: topic/entry identifiers,
//! the protocol-tagged message envelope, action registrations, assembly
//! operations, and block definitions. All wire types are serde round-trip
//! safe; decoding is a two-step discriminated dispatch (protocol tag, then
//! operation) so foreign traffic on a shared log can never reach fold logic.

#![deny(unsafe_code)]

mod action;
mod assembly;
mod block;
mod envelope;
mod id;
mod validation;

pub use action::{
    ActionInterface, ActionModuleInfo, ActionOperation, ActionRegistration, Capability,
    ParameterSpec,
};
pub use assembly::AssemblyOperation;
pub use block::BlockDefinition;
pub use envelope::{decode_envelope, encode_envelope, EnvelopeOutcome};
pub use id::{EntryId, TopicId};
pub use validation::{is_hex_digest, ValidationError};

/// Protocol tag carried in the `p` field of every Trellis message.
///
/// Messages with any other tag are foreign traffic and are skipped during
/// sync without affecting registry state.
pub const PROTOCOL_TAG: &str = "trellis-1";
