//! Type-driven selections.
//!
//! A type implementing [`Record`] knows the collection it is read from and
//! the selection that produces it. Deriving it (see [`pbselect_derive`]) keeps
//! the Rust struct and the compiled `fields`/`expand` parameters in lock-step:
//! the struct shape *is* the query shape.
//!
//! # Example
//!
//! ```ignore
//! use pbselect_sdk::{Expansion, Record};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Record)]
//! #[record(collection = "posts")]
//! struct Post {
//!     title: String,
//!     #[record(expand)]
//!     expand: PostExpand,
//! }
//!
//! #[derive(Deserialize, Expansion)]
//! struct PostExpand {
//!     author: Author,
//! }
//!
//! #[derive(Deserialize, Record)]
//! #[record(collection = "users")]
//! struct Author {
//!     name: String,
//! }
//!
//! let posts = client.records::<Post>().sort("-created").send().await?;
//! ```

use crate::selection::SelectionNode;

/// A record type that describes its own selection.
pub trait Record {
    /// Collection the record is read from when it is the root of a query.
    const COLLECTION: &'static str;

    /// Fields to project, or `None` for all fields.
    fn fields() -> Option<Vec<String>>;

    /// Relations to expand from this record.
    fn expand() -> Vec<SelectionNode>;

    /// Selection for this record reached under `key`.
    fn node(key: &str) -> SelectionNode {
        SelectionNode {
            key: key.to_string(),
            fields: Self::fields(),
            expand: Self::expand(),
            ..Default::default()
        }
    }

    /// Selection for this record as the root of a query.
    fn selection() -> SelectionNode {
        Self::node(Self::COLLECTION)
    }
}

/// The relations expanded from a record, one per field.
pub trait Expansion {
    fn children() -> Vec<SelectionNode>;
}

impl<T: Expansion> Expansion for Option<T> {
    fn children() -> Vec<SelectionNode> {
        T::children()
    }
}

/// Untyped record: all fields, no further expansion.
///
/// Lets an [`Expansion`] field stay untyped (`author: serde_json::Value`).
impl Record for serde_json::Value {
    const COLLECTION: &'static str = "";

    fn fields() -> Option<Vec<String>> {
        None
    }

    fn expand() -> Vec<SelectionNode> {
        Vec::new()
    }
}
