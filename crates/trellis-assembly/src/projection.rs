//! The assembly fold.

use crate::state::{ActionRef, AssemblyState, BlockRef};
use tracing::warn;
use trellis_registry::{DecodeOutcome, Projection, RegistryEntry};
use trellis_types::{decode_envelope, AssemblyOperation, EnvelopeOutcome};

/// Folds an assembly topic's heterogeneous operation stream into one
/// [`AssemblyState`].
///
/// State machine: uninitialized -> registered -> (add-action | add-block |
/// update)*. Operations arriving before any `register` are no-ops. The
/// same fold runs on incremental sync and on full replay; convergence of
/// the two paths is structural, not a convention.
#[derive(Default)]
pub struct AssemblyProjection {
    state: Option<AssemblyState>,
}

impl AssemblyProjection {
    pub fn state(&self) -> Option<&AssemblyState> {
        self.state.as_ref()
    }
}

impl Projection for AssemblyProjection {
    type Payload = AssemblyOperation;

    fn decode(&self, raw: &[u8]) -> DecodeOutcome<AssemblyOperation> {
        match decode_envelope(raw) {
            EnvelopeOutcome::Message(operation) => DecodeOutcome::Accepted(operation),
            EnvelopeOutcome::Foreign => DecodeOutcome::Foreign,
            EnvelopeOutcome::Invalid(reason) => DecodeOutcome::Invalid(reason),
        }
    }

    fn fold(&mut self, entry: &RegistryEntry<AssemblyOperation>) {
        match &entry.data {
            AssemblyOperation::Register {
                name,
                version,
                description,
                tags,
            } => {
                // A second register wipes prior state wholesale. Observed
                // upstream behavior, preserved and pinned by a test.
                if let Some(previous) = &self.state {
                    warn!(
                        entry = %entry.id,
                        discarded_actions = previous.actions.len(),
                        discarded_blocks = previous.blocks.len(),
                        "re-registration resets assembly state"
                    );
                }
                self.state = Some(AssemblyState {
                    name: name.clone(),
                    version: version.clone(),
                    description: description.clone(),
                    tags: tags.clone().unwrap_or_default(),
                    actions: Vec::new(),
                    blocks: Vec::new(),
                    created: entry.timestamp,
                    updated: entry.timestamp,
                });
            }
            AssemblyOperation::AddAction {
                topic,
                alias,
                config,
            } => match &mut self.state {
                Some(state) => {
                    state.actions.push(ActionRef {
                        topic: topic.clone(),
                        alias: alias.clone(),
                        config: config.clone(),
                    });
                    state.updated = entry.timestamp;
                }
                None => warn!(entry = %entry.id, "add-action before register; ignoring"),
            },
            AssemblyOperation::AddBlock {
                topic,
                action_bindings,
                attribute_overrides,
                child_aliases,
            } => match &mut self.state {
                Some(state) => {
                    state.blocks.push(BlockRef {
                        topic: topic.clone(),
                        action_bindings: action_bindings.clone(),
                        attribute_overrides: attribute_overrides.clone(),
                        child_aliases: child_aliases.clone(),
                    });
                    state.updated = entry.timestamp;
                }
                None => warn!(entry = %entry.id, "add-block before register; ignoring"),
            },
            AssemblyOperation::Update { description, tags } => match &mut self.state {
                Some(state) => {
                    if let Some(description) = description {
                        state.description = Some(description.clone());
                    }
                    if let Some(tags) = tags {
                        state.tags = tags.clone();
                    }
                    state.updated = entry.timestamp;
                }
                None => warn!(entry = %entry.id, "update before register; ignoring"),
            },
        }
    }

    fn reset(&mut self) {
        self.state = None;
    }
}
