extern crate self as pbselect_sdk;

pub mod auth;
#[cfg(feature = "blocking")]
pub mod blocking_client;
pub mod client;
pub mod compile;
pub mod datetime;
pub mod error;
pub mod pagination;
pub mod query;
pub mod record;
pub mod schema;
pub mod selection;
pub mod shape;

// Re-export key types at crate root for convenience.
pub use client::Client;
pub use compile::{compile, compile_expand, compile_fields, FieldMode, QueryParameters};
pub use error::{PocketBaseError, SchemaError};
pub use pagination::{ListResult, Page};
pub use pbselect_derive::{Expansion, Record};
pub use query::RecordsQuery;
pub use record::{Expansion, Record};
pub use schema::{Cardinality, FieldKind, RelationIndex, Schema};
pub use selection::SelectionNode;
pub use shape::{Compiled, ExpandShape, RecordShape};
