//! Block definition payloads.

use crate::id::TopicId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content-addressed definition of one UI block.
///
/// The definition and the template it points at are immutable payloads;
/// `template_digest`, when present, lets loaders verify retrieved template
/// bytes end to end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub name: String,

    /// Topic holding the template payload.
    #[serde(rename = "template_t_id")]
    pub template_topic: TopicId,

    /// Expected SHA-256 of the template bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_digest: Option<String>,

    /// Default attribute values the template renders with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,

    /// Aliases of child blocks this block nests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}
