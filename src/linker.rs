//! Relationship Linker
//!
//! Records, for every entity, the relationship directions that start at it:
//! the forward name where the entity is the `from` end, the converse name
//! where it is the `to` end. Built once per run, before any entity is
//! compiled, and read-only afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::SchemaRelationship;

/// One outgoing relationship direction of an entity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkEdge {
    /// Relationship (or converse) name for this direction
    pub name: String,
    /// Entity at the far end
    pub entity: String,
}

/// Entity name -> edges leaving that entity
#[derive(Debug, Default)]
pub struct LinkTable {
    edges: HashMap<String, Vec<LinkEdge>>,
}

impl LinkTable {
    /// Link every relationship in both directions
    pub fn build(relationships: &[SchemaRelationship]) -> Self {
        let mut table = Self::default();
        for rel in relationships {
            table.push(&rel.from, &rel.name, &rel.to);
            table.push(&rel.to, &rel.converse, &rel.from);
        }
        debug!(
            entities = table.edges.len(),
            edges = relationships.len() * 2,
            "linked relationships"
        );
        table
    }

    fn push(&mut self, source: &str, name: &str, target: &str) {
        self.edges
            .entry(source.to_string())
            .or_default()
            .push(LinkEdge {
                name: name.to_string(),
                entity: target.to_string(),
            });
    }

    /// Edges leaving `entity` in the order the relationships were given
    pub fn edges(&self, entity: &str) -> &[LinkEdge] {
        self.edges.get(entity).map(Vec::as_slice).unwrap_or_default()
    }

    /// Edges leaving `entity`, sorted by edge name (ordinal comparison)
    pub fn sorted_edges(&self, entity: &str) -> Vec<LinkEdge> {
        let mut edges = self.edges(entity).to_vec();
        edges.sort_by(|a, b| a.name.cmp(&b.name));
        edges
    }
}
