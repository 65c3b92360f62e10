//! Resolved assembly shapes.

use trellis_assembly::AssemblyState;
use trellis_types::{ActionRegistration, BlockDefinition, TopicId};

/// One action reference after resolution.
///
/// Either `definition` or `error` is set, never both.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAction {
    pub alias: String,
    pub reference: TopicId,
    pub definition: Option<ActionRegistration>,
    pub error: Option<String>,
}

/// One block reference after resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedBlock {
    pub reference: TopicId,
    pub definition: Option<BlockDefinition>,
    pub template: Option<String>,
    pub error: Option<String>,
}

/// An assembly with every reference replaced by its fetched definition or
/// a recorded per-reference error.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAssembly {
    pub topic: TopicId,
    pub state: AssemblyState,
    pub actions: Vec<ResolvedAction>,
    pub blocks: Vec<ResolvedBlock>,
}

/// Outcome of composition validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositionReport {
    pub valid: bool,
    pub errors: Vec<String>,
}
