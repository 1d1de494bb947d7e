//! The caller-supplied selection tree.
//!
//! A [`SelectionNode`] names an entity (at the root) or a relation (below
//! it), optionally restricts the fields returned at that level, and lists the
//! relations to expand from it. The same structure deserializes from the JSON
//! form used by the CLI:
//!
//! ```json
//! { "key": "posts", "fields": ["title"], "expand": [{ "key": "author", "fields": ["name"] }] }
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// One level of a selection tree.
///
/// `sort`, `filter` and `request_key` are only meaningful on the root node;
/// they are passed through to the query parameters untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionNode {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub expand: Vec<SelectionNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_key: Option<String>,
}

impl SelectionNode {
    /// A node selecting every field of `key` and expanding nothing.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Restrict this level to the given fields.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Append a relation to expand from this level.
    pub fn expand(mut self, child: SelectionNode) -> Self {
        self.expand.push(child);
        self
    }

    /// Sort expression passed through verbatim, e.g. `-created,title`.
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Filter expression passed through verbatim.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Key that cancels an earlier in-flight request sharing it.
    pub fn request_key(mut self, key: impl Into<String>) -> Self {
        self.request_key = Some(key.into());
        self
    }

    /// Parse a selection tree from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether this node has relations to expand.
    pub fn has_expand(&self) -> bool {
        !self.expand.is_empty()
    }
}

/// `"expand": null` reads as no expansion.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<SelectionNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SelectionNode>>::deserialize(deserializer)?.unwrap_or_default())
}
