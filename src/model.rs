//! Compiled Model
//!
//! Post-compilation records handed to stub rendering. Field names follow
//! what the stub templates read: `name`, `sapling_name`, `field_map`,
//! `field_list`, `relationships` for entities and `from`/`to`/
//! `is_converse`/`relation` for relationship directions.
//!
//! Records are immutable once built; the model is a read-only snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::checksum::Checksum;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::linker::LinkEdge;
use crate::types::IfaceType;

/// A field after name normalization and type resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledField {
    /// Output identifier (hyphens replaced)
    pub name: String,
    /// Name as written in the schema
    pub sapling_name: String,
    pub notes: String,
    /// Secondary relation for relation-valued fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_rel: Option<String>,
    /// Resolved type; a `list<...>` for relation-valued fields
    #[serde(rename = "type")]
    pub field_type: IfaceType,
}

/// A parameter of a synthesized function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IfaceType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: IfaceType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A synthesized function signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSig {
    pub name: String,
    pub params: Vec<Param>,
    pub returns: IfaceType,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompiledEntity {
    pub name: String,
    pub sapling_name: String,
    /// Name of the record typedef (`fields_<name>`)
    pub typedef: String,
    pub id_type: IfaceType,
    /// Non-identifier fields in schema order
    pub field_map: Vec<CompiledField>,
    /// `'id', 'f1', 'f2'`
    pub field_list: String,
    /// Outgoing relationship directions, sorted by name
    pub relationships: Vec<LinkEdge>,
    /// get, query, all - in that order
    pub functions: Vec<FunctionSig>,
    pub notes: String,
}

/// One direction of a schema relationship
#[derive(Debug, Clone, Serialize)]
pub struct CompiledRelationship {
    /// Name exposed by this direction
    pub name: String,
    pub sapling_name: String,
    /// Underlying schema relationship (the forward name)
    pub relation: String,
    pub is_converse: bool,
    pub arity: String,
    /// Entity at the start of this direction
    pub from: String,
    /// Entity at the end of this direction
    pub to: String,
    /// Shared record typedef (`fields_<relation>`)
    pub typedef: String,
    /// Shared with the opposite direction
    pub field_map: Arc<Vec<CompiledField>>,
    /// `'from_link', 'to_link', 'f1'`
    pub field_list: String,
    /// This direction's function first, then the opposite direction's
    pub functions: Vec<FunctionSig>,
    pub notes: String,
}

/// Everything one compilation run produced, keyed by name
#[derive(Debug, Clone, Serialize)]
pub struct CompiledModel {
    pub service: String,
    pub module: String,
    /// SHA-256 of the emitted specification text
    pub spec_checksum: Checksum,
    pub entities: BTreeMap<String, CompiledEntity>,
    pub relationships: BTreeMap<String, CompiledRelationship>,
}

impl CompiledModel {
    pub fn entity(&self, name: &str) -> Option<&CompiledEntity> {
        self.entities.get(name)
    }

    pub fn relationship(&self, name: &str) -> Option<&CompiledRelationship> {
        self.relationships.get(name)
    }

    /// Resolve the endpoints of a relationship direction
    pub fn endpoints(
        &self,
        rel: &CompiledRelationship,
    ) -> Option<(&CompiledEntity, &CompiledEntity)> {
        Some((self.entity(&rel.from)?, self.entity(&rel.to)?))
    }

    /// The opposite direction of a relationship
    pub fn opposite(&self, rel: &CompiledRelationship) -> Option<&CompiledRelationship> {
        self.relationships
            .values()
            .find(|r| r.relation == rel.relation && r.is_converse != rel.is_converse)
    }

    /// Serialize for the rendering stage
    pub fn to_json(&self, format: OutputFormat) -> Result<String> {
        let json = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(self)?,
            OutputFormat::Compact => serde_json::to_string(self)?,
        };
        Ok(json)
    }
}

/// Comma-joined, single-quoted list of field names
pub(crate) fn quoted_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}
