//! Composition validation.

use crate::resolved::{CompositionReport, ResolvedAssembly};
use std::collections::HashSet;

/// Check a resolved assembly for dangling internal references.
///
/// Pure graph walk, no I/O: every block's declared action bindings must
/// point at actions the assembly itself carries (by topic id or alias),
/// and every declared child alias must name a block resolved within the
/// same assembly. Runs after resolution, never interleaved with it.
pub fn validate_composition(assembly: &ResolvedAssembly) -> CompositionReport {
    let mut errors = Vec::new();

    let known_actions: HashSet<&str> = assembly
        .state
        .actions
        .iter()
        .flat_map(|action| [action.topic.as_str(), action.alias.as_str()])
        .collect();

    let known_blocks: HashSet<&str> = assembly
        .blocks
        .iter()
        .filter_map(|block| block.definition.as_ref())
        .map(|definition| definition.name.as_str())
        .collect();

    for block in &assembly.state.blocks {
        if let Some(bindings) = &block.action_bindings {
            for action_topic in bindings.values() {
                if !known_actions.contains(action_topic.as_str()) {
                    errors.push(format!(
                        "Block {} references non-existent action: {}",
                        block.topic, action_topic
                    ));
                }
            }
        }
        if let Some(children) = &block.child_aliases {
            for alias in children {
                if !known_blocks.contains(alias.as_str()) {
                    errors.push(format!(
                        "Block {} references non-existent child block: {}",
                        block.topic, alias
                    ));
                }
            }
        }
    }

    CompositionReport {
        valid: errors.is_empty(),
        errors,
    }
}
