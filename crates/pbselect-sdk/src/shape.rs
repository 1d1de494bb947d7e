//! Derived response shapes.
//!
//! Checking a selection tree against a [`Schema`] yields a [`RecordShape`]:
//! the fields the response will carry at every level, and for each expanded
//! relation whether PocketBase returns a single record or a list. The shape
//! is produced by the same walk that compiles the field paths, so the two
//! cannot disagree about which relations are followed.

use crate::compile::{self, Channel, QueryParameters};
use crate::error::SchemaError;
use crate::schema::{Cardinality, EntitySchema, FieldKind, Schema};
use crate::selection::SelectionNode;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A field of a derived shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShapeField {
    pub name: String,
    pub kind: FieldKind,
}

/// An expanded relation: one record or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cardinality", content = "shape", rename_all = "lowercase")]
pub enum ExpandShape {
    One(RecordShape),
    Many(RecordShape),
}

impl ExpandShape {
    pub fn record(&self) -> &RecordShape {
        match self {
            Self::One(shape) | Self::Many(shape) => shape,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandEntry {
    pub key: String,
    #[serde(flatten)]
    pub shape: ExpandShape,
}

/// Shape of one record in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordShape {
    pub entity: String,
    /// `true` when the selection named its fields, `false` for the full entity.
    pub projected: bool,
    pub fields: Vec<ShapeField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expand: Vec<ExpandEntry>,
}

impl RecordShape {
    pub fn field(&self, name: &str) -> Option<FieldKind> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.kind)
    }

    pub fn expanded(&self, key: &str) -> Option<&ExpandShape> {
        self.expand.iter().find(|e| e.key == key).map(|e| &e.shape)
    }
}

fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    if key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        f.write_str(key)
    } else {
        write!(f, "{:?}", key)
    }
}

impl fmt::Display for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() && self.expand.is_empty() {
            return f.write_str("{}");
        }

        f.write_str("{ ")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write_key(f, &field.name)?;
            write!(f, ": {}", field.kind)?;
        }
        if !self.expand.is_empty() {
            if !self.fields.is_empty() {
                f.write_str("; ")?;
            }
            f.write_str("expand: ")?;
            write_expand(f, &self.expand)?;
        }
        f.write_str(" }")
    }
}

fn write_expand(f: &mut fmt::Formatter<'_>, entries: &[ExpandEntry]) -> fmt::Result {
    f.write_str("{ ")?;
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            f.write_str("; ")?;
        }
        write_key(f, &entry.key)?;
        match &entry.shape {
            ExpandShape::One(shape) => write!(f, ": {}", shape)?,
            ExpandShape::Many(shape) => write!(f, ": Array<{}>", shape)?,
        }
    }
    f.write_str(" }")
}

/// A selection checked against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Compiled {
    pub params: QueryParameters,
    pub shape: RecordShape,
}

/// What the walk knows about the entity at a node.
struct Target<'a> {
    entity: &'a str,
    schema: &'a EntitySchema,
    cardinality: Cardinality,
}

struct SchemaChannel<'a> {
    schema: &'a Schema,
}

impl<'a> SchemaChannel<'a> {
    fn target(&self, entity: &'a str, cardinality: Cardinality) -> Result<Target<'a>, SchemaError> {
        let schema = self
            .schema
            .entity(entity)
            .ok_or_else(|| SchemaError::UnknownEntity(entity.to_string()))?;
        Ok(Target {
            entity,
            schema,
            cardinality,
        })
    }
}

impl<'a> Channel for SchemaChannel<'a> {
    type Ctx = Target<'a>;
    type Shape = RecordShape;
    type Error = SchemaError;

    fn resolve(&self, parent: &Target<'a>, key: &str) -> Result<Target<'a>, SchemaError> {
        let relation = self
            .schema
            .relations()
            .resolve(parent.entity, parent.schema, key)?;
        self.target(&relation.target, relation.cardinality)
    }

    fn shape(
        &self,
        ctx: &Target<'a>,
        node: &SelectionNode,
        children: Vec<(&str, Target<'a>, RecordShape)>,
    ) -> Result<RecordShape, SchemaError> {
        let fields = match &node.fields {
            Some(names) => {
                let mut seen = BTreeSet::new();
                let mut fields = Vec::with_capacity(names.len());
                for name in names {
                    if !seen.insert(name.as_str()) {
                        return Err(SchemaError::DuplicateField {
                            entity: ctx.entity.to_string(),
                            field: name.clone(),
                        });
                    }
                    let kind = ctx.schema.field(name).ok_or_else(|| SchemaError::UnknownField {
                        entity: ctx.entity.to_string(),
                        field: name.clone(),
                    })?;
                    fields.push(ShapeField {
                        name: name.clone(),
                        kind,
                    });
                }
                fields
            }
            None => ctx
                .schema
                .fields
                .iter()
                .map(|(name, kind)| ShapeField {
                    name: name.clone(),
                    kind: *kind,
                })
                .collect(),
        };

        let mut seen = BTreeSet::new();
        let mut expand = Vec::with_capacity(children.len());
        for (key, target, shape) in children {
            if !seen.insert(key) {
                return Err(SchemaError::DuplicateExpand {
                    entity: ctx.entity.to_string(),
                    key: key.to_string(),
                });
            }
            let shape = match target.cardinality {
                Cardinality::One => ExpandShape::One(shape),
                Cardinality::Many => ExpandShape::Many(shape),
            };
            expand.push(ExpandEntry {
                key: key.to_string(),
                shape,
            });
        }

        Ok(RecordShape {
            entity: ctx.entity.to_string(),
            projected: node.fields.is_some(),
            fields,
            expand,
        })
    }
}

impl Schema {
    /// Check `root` against this schema, compiling its query parameters and
    /// deriving the shape of each returned record.
    pub fn compile(&self, root: &SelectionNode) -> Result<Compiled, SchemaError> {
        let channel = SchemaChannel { schema: self };
        let ctx = channel.target(&root.key, Cardinality::One)?;
        let walked = compile::walk(&channel, root, "", &ctx)?;
        let params = compile::assemble(root, &walked);
        Ok(Compiled {
            params,
            shape: walked.shape,
        })
    }

    /// Shape of each record `root` returns.
    pub fn derive_shape(&self, root: &SelectionNode) -> Result<RecordShape, SchemaError> {
        self.compile(root).map(|c| c.shape)
    }
}
