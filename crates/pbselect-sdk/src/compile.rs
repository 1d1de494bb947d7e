//! Selection-tree compilation.
//!
//! Turns a [`SelectionNode`] into the `fields` and `expand` query parameters
//! PocketBase expects:
//!
//! ```text
//! { posts, fields: [title], expand: [{ author, fields: [name] }] }
//!   fields = "title,expand.author.name"
//!   expand = "author"
//! ```
//!
//! Field paths and derived shapes come out of the same walk ([`walk`]); the
//! [`Channel`] decides what, if anything, a node's shape is. The untyped
//! channel used by [`compile`] produces no shape and never fails; the schema
//! channel in [`crate::shape`] resolves relations and builds a
//! [`RecordShape`](crate::shape::RecordShape).

use crate::selection::SelectionNode;
use serde::Serialize;
use std::convert::Infallible;

/// Query parameters for the records API.
///
/// A parameter the caller did not constrain is `None`, never an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_key: Option<String>,
}

impl QueryParameters {
    /// Pairs that belong on the request URL.
    ///
    /// `requestKey` is consumed by the client and is not sent.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("fields", &self.fields),
            ("expand", &self.expand),
            ("sort", &self.sort),
            ("filter", &self.filter),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// How the fields of an expanded subtree are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    /// No node below projects fields: one `expand.*` covers every level.
    Wildcard,
    /// Some node below projects fields: every level is listed explicitly.
    Explicit,
}

/// Output channel of the selection walk.
///
/// `Ctx` is what the walk knows about the entity at the current node.
pub(crate) trait Channel {
    type Ctx;
    type Shape;
    type Error;

    /// Context for the child reached through relation `key`.
    fn resolve(&self, parent: &Self::Ctx, key: &str) -> Result<Self::Ctx, Self::Error>;

    /// Shape of `node`, given the already-walked children in declaration order.
    fn shape(
        &self,
        ctx: &Self::Ctx,
        node: &SelectionNode,
        children: Vec<(&str, Self::Ctx, Self::Shape)>,
    ) -> Result<Self::Shape, Self::Error>;
}

/// Result of walking one node.
pub(crate) struct Walked<S> {
    /// Field paths for this node and everything below it.
    pub paths: String,
    /// Whether this node or any descendant projects fields.
    pub has_fields: bool,
    pub shape: S,
}

/// Walk `node` bottom-up, compiling its field paths under `base`.
///
/// `base` is empty at the top level and ends in `.` everywhere else.
pub(crate) fn walk<C: Channel>(
    channel: &C,
    node: &SelectionNode,
    base: &str,
    ctx: &C::Ctx,
) -> Result<Walked<C::Shape>, C::Error> {
    let mut mode = FieldMode::Wildcard;
    let mut child_paths = Vec::with_capacity(node.expand.len());
    let mut children = Vec::with_capacity(node.expand.len());

    for child in &node.expand {
        let child_ctx = channel.resolve(ctx, &child.key)?;
        let child_base = format!("{}expand.{}.", base, child.key);
        let walked = walk(channel, child, &child_base, &child_ctx)?;
        if walked.has_fields {
            mode = FieldMode::Explicit;
        }
        child_paths.push(walked.paths);
        children.push((child.key.as_str(), child_ctx, walked.shape));
    }

    let own = match &node.fields {
        Some(fields) => fields
            .iter()
            .map(|field| format!("{}{}", base, field))
            .collect::<Vec<_>>()
            .join(","),
        None if node.has_expand() => format!("{}*", base),
        None => base.strip_suffix('.').unwrap_or(base).to_string(),
    };

    let paths = if !node.has_expand() {
        own
    } else {
        match mode {
            FieldMode::Explicit => {
                let mut parts = Vec::with_capacity(child_paths.len() + 1);
                parts.push(own);
                parts.extend(child_paths);
                parts.join(",")
            }
            FieldMode::Wildcard => format!("{},{}expand.*", own, base),
        }
    };

    let shape = channel.shape(ctx, node, children)?;

    Ok(Walked {
        paths,
        has_fields: node.fields.is_some() || mode == FieldMode::Explicit,
        shape,
    })
}

/// Channel that only compiles paths.
struct Untyped;

impl Channel for Untyped {
    type Ctx = ();
    type Shape = ();
    type Error = Infallible;

    fn resolve(&self, _parent: &(), _key: &str) -> Result<(), Infallible> {
        Ok(())
    }

    fn shape(
        &self,
        _ctx: &(),
        _node: &SelectionNode,
        _children: Vec<(&str, (), ())>,
    ) -> Result<(), Infallible> {
        Ok(())
    }
}

fn walk_untyped(node: &SelectionNode, base: &str) -> Walked<()> {
    match walk(&Untyped, node, base, &()) {
        Ok(walked) => walked,
        Err(never) => match never {},
    }
}

/// Field paths for `node` and its expanded relations.
pub fn compile_fields(node: &SelectionNode, base: &str) -> String {
    walk_untyped(node, base).paths
}

/// Relation chains for a list of sibling expand nodes, e.g. `a,b.c`.
pub fn compile_expand(nodes: &[SelectionNode], base: &str) -> String {
    nodes
        .iter()
        .map(|node| {
            if node.has_expand() {
                compile_expand(&node.expand, &format!("{}{}.", base, node.key))
            } else {
                format!("{}{}", base, node.key)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Merge compiled paths with the root's pass-through options.
pub(crate) fn assemble<S>(root: &SelectionNode, walked: &Walked<S>) -> QueryParameters {
    let fields = walked.has_fields.then(|| walked.paths.clone());
    let expand = root
        .has_expand()
        .then(|| compile_expand(&root.expand, ""));

    let params = QueryParameters {
        fields: non_empty(fields),
        expand: non_empty(expand),
        sort: non_empty(root.sort.clone()),
        filter: non_empty(root.filter.clone()),
        request_key: non_empty(root.request_key.clone()),
    };

    tracing::debug!(
        key = %root.key,
        fields = ?params.fields,
        expand = ?params.expand,
        "compiled selection"
    );

    params
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Compile a selection tree into query parameters.
///
/// Never fails: relation keys and field names are not checked. Use
/// [`Schema::compile`](crate::schema::Schema::compile) to check them and get
/// the derived shape as well.
pub fn compile(root: &SelectionNode) -> QueryParameters {
    let walked = walk_untyped(root, "");
    assemble(root, &walked)
}
