//! Error types for the pbselect SDK.
//!
//! [`SchemaError`] is raised when a selection tree does not fit the schema it
//! is checked against; the compilers themselves never fail.
//! [`PocketBaseError`] covers everything that can go wrong while talking to
//! a PocketBase server: transport errors, HTTP status failures, API error
//! bodies, and superseded requests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A selection tree, or the schema document itself, is inconsistent.
#[derive(Debug)]
pub enum SchemaError {
    /// The root key does not name an entity of the schema.
    UnknownEntity(String),
    /// A projected field does not exist on the entity.
    UnknownField { entity: String, field: String },
    /// The same field is projected twice at one level.
    DuplicateField { entity: String, field: String },
    /// The expand key is neither a forward relation nor a back-relation of the entity.
    UnresolvableRelation {
        entity: String,
        key: String,
        available: Vec<String>,
    },
    /// The expand key matches both a forward relation and a back-relation.
    AmbiguousRelation { entity: String, key: String },
    /// The same relation is expanded twice at one level.
    DuplicateExpand { entity: String, key: String },
    /// A relation in the schema document targets an entity that does not exist.
    UnknownTarget { relation: String, target: String },
    /// The schema document could not be read or parsed.
    Parse(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntity(name) => write!(f, "Unknown entity '{}'", name),
            Self::UnknownField { entity, field } => {
                write!(f, "Unknown field '{}' on '{}'", field, entity)
            }
            Self::DuplicateField { entity, field } => {
                write!(f, "Field '{}' selected twice on '{}'", field, entity)
            }
            Self::UnresolvableRelation {
                entity,
                key,
                available,
            } => {
                if available.is_empty() {
                    write!(f, "'{}' has no relation '{}'", entity, key)
                } else {
                    write!(
                        f,
                        "'{}' has no relation '{}' (available: {})",
                        entity,
                        key,
                        available.join(", ")
                    )
                }
            }
            Self::AmbiguousRelation { entity, key } => write!(
                f,
                "Relation '{}' on '{}' is both a forward relation and a back-relation",
                key, entity
            ),
            Self::DuplicateExpand { entity, key } => {
                write!(f, "Relation '{}' expanded twice on '{}'", key, entity)
            }
            Self::UnknownTarget { relation, target } => write!(
                f,
                "Relation '{}' targets unknown entity '{}'",
                relation, target
            ),
            Self::Parse(msg) => write!(f, "Invalid schema: {}", msg),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Error body returned by the PocketBase API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub code: u16,
    pub message: String,
    pub data: serde_json::Value,
}

/// Errors that can occur when querying a PocketBase server.
#[derive(Debug)]
pub enum PocketBaseError {
    /// The server rejected the credentials (401).
    Authentication(String),
    /// The credentials lack access to the collection or record (403).
    Forbidden(String),
    /// The collection or record does not exist (404).
    NotFound(String),
    /// Request was rate-limited.
    RateLimited {
        retry_after: Option<f64>,
        message: String,
    },
    /// A non-2xx response carrying a PocketBase error body.
    Api {
        status: u16,
        message: String,
        data: serde_json::Value,
    },
    /// Non-2xx HTTP response not covered by a more specific variant.
    HttpError { status: u16, body: String },
    /// Network or HTTP transport error.
    Network(reqwest::Error),
    /// The response body did not match the expected record type.
    Deserialize(String),
    /// A newer request with the same request key superseded this one.
    Cancelled(String),
    /// Client configuration error (bad base URL, unreadable token file).
    Config(String),
    /// The selection does not fit the schema.
    Schema(SchemaError),
    /// Internal error (e.g. runtime creation failure).
    Internal(String),
}

impl fmt::Display for PocketBaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication(msg) => write!(f, "Authentication error: {}", msg),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::RateLimited { message, .. } => write!(f, "Rate limited: {}", message),
            Self::Api {
                status,
                message,
                data,
            } => {
                let is_empty = data.as_object().map_or(true, |o| o.is_empty());
                if data.is_null() || is_empty {
                    write!(f, "API error {}: {}", status, message)
                } else {
                    write!(f, "API error {}: {} ({})", status, message, data)
                }
            }
            Self::HttpError { status, body } => {
                write!(f, "HTTP error {}: {}", status, body)
            }
            Self::Network(e) => write!(f, "Network error: {}", e),
            Self::Deserialize(msg) => write!(f, "Unexpected response: {}", msg),
            Self::Cancelled(key) => write!(f, "Request '{}' was cancelled", key),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Schema(e) => write!(f, "Schema error: {}", e),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for PocketBaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PocketBaseError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e)
    }
}

impl From<SchemaError> for PocketBaseError {
    fn from(e: SchemaError) -> Self {
        Self::Schema(e)
    }
}
