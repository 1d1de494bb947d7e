//! Schema and relation graph.
//!
//! A schema lists every entity with its fields, plus a relation map keyed by
//! relation name. A relation is usable from an entity in one of two ways:
//!
//! - **forward**: the entity has a field named like the relation key;
//! - **back-relation**: the key has the form `<name>(<via>)` and the relation
//!   `<via>` targets the entity.
//!
//! [`RelationIndex`] resolves both kinds once, when the schema is built.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

/// Kind of a field on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    Email,
    Url,
    Date,
    Autodate,
    Select,
    Json,
    File,
    Editor,
    Relation,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Email => "email",
            Self::Url => "url",
            Self::Date => "date",
            Self::Autodate => "autodate",
            Self::Select => "select",
            Self::Json => "json",
            Self::File => "file",
            Self::Editor => "editor",
            Self::Relation => "relation",
        };
        f.write_str(name)
    }
}

/// Whether a relation yields one record or a list of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

/// Relation entry as written in the schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    pub target: String,
    #[serde(default)]
    pub many: bool,
}

/// Fields of one entity, in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntitySchema {
    pub fields: BTreeMap<String, FieldKind>,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }
}

/// How a relation is reached from the entity it is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Direction {
    Forward,
    /// Reached through relation `via`, which points at `source`.
    Back { via: String, source: String },
}

/// A relation after indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub key: String,
    pub target: String,
    pub cardinality: Cardinality,
    pub direction: Direction,
}

/// Split a back-relation key `name(via)` into `(name, via)`.
fn split_back_relation(key: &str) -> Option<(&str, &str)> {
    let inner = key.strip_suffix(')')?;
    let open = inner.find('(')?;
    let via = &inner[open + 1..];
    if via.is_empty() {
        return None;
    }
    Some((&inner[..open], via))
}

/// Bidirectional relation lookup, built once per schema.
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    relations: BTreeMap<String, Relation>,
    /// entity -> relation keys that resolve from it (forward and back).
    outgoing: BTreeMap<String, BTreeSet<String>>,
    /// entity -> relation keys whose target is the entity.
    incoming: BTreeMap<String, BTreeSet<String>>,
}

impl RelationIndex {
    pub fn build(
        entities: &BTreeMap<String, EntitySchema>,
        defs: &BTreeMap<String, RelationDef>,
    ) -> Result<Self, SchemaError> {
        let mut index = Self::default();

        for (key, def) in defs {
            if !entities.contains_key(&def.target) {
                return Err(SchemaError::UnknownTarget {
                    relation: key.clone(),
                    target: def.target.clone(),
                });
            }

            let cardinality = if def.many {
                Cardinality::Many
            } else {
                Cardinality::One
            };

            // A `name(via)` key is a back-relation only when `via` is itself a relation.
            let back_source = split_back_relation(key)
                .and_then(|(_, via)| defs.get(via).map(|v| (via, &v.target)));

            let direction = match back_source {
                Some((via, source)) => {
                    index
                        .outgoing
                        .entry(source.clone())
                        .or_default()
                        .insert(key.clone());
                    Direction::Back {
                        via: via.to_string(),
                        source: source.clone(),
                    }
                }
                None => Direction::Forward,
            };

            index
                .incoming
                .entry(def.target.clone())
                .or_default()
                .insert(key.clone());
            index.relations.insert(
                key.clone(),
                Relation {
                    key: key.clone(),
                    target: def.target.clone(),
                    cardinality,
                    direction,
                },
            );
        }

        for (name, entity) in entities {
            for field in entity.fields.keys() {
                if index.relations.contains_key(field) {
                    index
                        .outgoing
                        .entry(name.clone())
                        .or_default()
                        .insert(field.clone());
                }
            }
        }

        Ok(index)
    }

    /// Resolve `key` as a relation of `entity`.
    ///
    /// `entity_schema` is the schema of `entity`; a forward match requires
    /// that it declares a field named `key`.
    pub fn resolve(
        &self,
        entity: &str,
        entity_schema: &EntitySchema,
        key: &str,
    ) -> Result<&Relation, SchemaError> {
        let Some(relation) = self.relations.get(key) else {
            return Err(self.unresolvable(entity, key));
        };

        let forward = entity_schema.fields.contains_key(key);
        let back = matches!(&relation.direction, Direction::Back { source, .. } if source == entity);

        match (forward, back) {
            (true, true) => Err(SchemaError::AmbiguousRelation {
                entity: entity.to_string(),
                key: key.to_string(),
            }),
            (true, false) | (false, true) => Ok(relation),
            (false, false) => Err(self.unresolvable(entity, key)),
        }
    }

    fn unresolvable(&self, entity: &str, key: &str) -> SchemaError {
        SchemaError::UnresolvableRelation {
            entity: entity.to_string(),
            key: key.to_string(),
            available: self.outgoing(entity).map(str::to_string).collect(),
        }
    }

    /// Relation keys that can be expanded from `entity`.
    pub fn outgoing<'a>(&'a self, entity: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.outgoing
            .get(entity)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Relation keys whose target is `entity`.
    pub fn incoming<'a>(&'a self, entity: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.incoming
            .get(entity)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Relation> {
        self.relations.get(key)
    }
}

#[derive(Deserialize)]
struct SchemaDocument {
    entities: BTreeMap<String, EntitySchema>,
    #[serde(default)]
    relations: BTreeMap<String, RelationDef>,
}

/// Entities plus their relation index.
#[derive(Debug, Clone)]
pub struct Schema {
    entities: BTreeMap<String, EntitySchema>,
    index: RelationIndex,
}

impl Schema {
    pub fn new(
        entities: BTreeMap<String, EntitySchema>,
        relations: BTreeMap<String, RelationDef>,
    ) -> Result<Self, SchemaError> {
        let index = RelationIndex::build(&entities, &relations)?;
        Ok(Self { entities, index })
    }

    /// Parse a schema document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let doc: SchemaDocument =
            serde_json::from_str(json).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::new(doc.entities, doc.relations)
    }

    /// Read and parse a schema document from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SchemaError::Parse(format!("could not read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn entity(&self, name: &str) -> Option<&EntitySchema> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&str, &EntitySchema)> {
        self.entities.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn relations(&self) -> &RelationIndex {
        &self.index
    }
}
