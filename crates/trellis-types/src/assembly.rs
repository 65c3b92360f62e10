//! Assembly topic operations.

use crate::id::TopicId;
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One operation on an assembly topic's log.
///
/// Assemblies are living documents: a `register` creates the state, then
/// any number of `add-action` / `add-block` / `update` operations mutate it,
/// folded strictly in log order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum AssemblyOperation {
    Register {
        name: String,
        version: Version,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tags: Option<Vec<String>>,
    },
    AddAction {
        #[serde(rename = "t_id")]
        topic: TopicId,
        alias: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        config: Option<Value>,
    },
    AddBlock {
        #[serde(rename = "t_id")]
        topic: TopicId,
        /// Maps block-local action aliases to action topics.
        #[serde(skip_serializing_if = "Option::is_none")]
        action_bindings: Option<BTreeMap<String, TopicId>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attribute_overrides: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        child_aliases: Option<Vec<String>>,
    },
    Update {
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tags: Option<Vec<String>>,
    },
}
