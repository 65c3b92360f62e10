//! Folded assembly state.

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use trellis_types::TopicId;

/// One action reference inside an assembly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRef {
    pub topic: TopicId,
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

/// One block reference inside an assembly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockRef {
    pub topic: TopicId,
    /// Block-local action aliases bound to action topics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_bindings: Option<BTreeMap<String, TopicId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_overrides: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_aliases: Option<Vec<String>>,
}

/// The folded result of replaying one assembly topic's operation log.
///
/// Exists only after a `register` operation has been folded; mutated only
/// by the fold, never by callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssemblyState {
    pub name: String,
    pub version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub actions: Vec<ActionRef>,
    pub blocks: Vec<BlockRef>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}
