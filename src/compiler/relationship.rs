//! Relationship Compiler
//!
//! Every schema relationship yields two directions that share one field
//! list and one record typedef. Endpoints are looked up among the compiled
//! entities, so this stage must run after all entities are compiled.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{CompileError, Result};
use crate::model::{quoted_list, CompiledEntity, CompiledRelationship, FunctionSig, Param};
use crate::names::closest_match;
use crate::schema::SchemaRelationship;
use crate::types::{IfaceType, TypeMapper};

use super::entity::{compile_fields, fields_param, typedef_name};

/// Both directions of one relationship plus the forward endpoint key types
#[derive(Debug, Clone)]
pub struct RelationshipPair {
    pub forward: CompiledRelationship,
    pub converse: CompiledRelationship,
    pub from_key: IfaceType,
    pub to_key: IfaceType,
}

fn resolve_endpoint<'a>(
    rel: &SchemaRelationship,
    entity: &str,
    entities: &'a BTreeMap<String, CompiledEntity>,
) -> Result<&'a CompiledEntity> {
    entities
        .get(entity)
        .ok_or_else(|| CompileError::UnresolvedEndpoint {
            relationship: rel.name.clone(),
            entity: entity.to_string(),
            suggestion: closest_match(entity, entities.keys().map(String::as_str)),
        })
}

fn direction_function(
    name: &str,
    start: &CompiledEntity,
    typedef: &str,
    end: &CompiledEntity,
) -> FunctionSig {
    FunctionSig {
        name: format!("get_relationship_{}", name),
        params: vec![
            Param::new("ids", IfaceType::list(start.id_type.clone())),
            fields_param("from_fields"),
            fields_param("rel_fields"),
            fields_param("to_fields"),
        ],
        returns: IfaceType::list(IfaceType::Tuple(vec![
            IfaceType::named(&start.typedef),
            IfaceType::named(typedef),
            IfaceType::named(&end.typedef),
        ])),
    }
}

/// Compile both directions of a relationship
pub fn compile_relationship(
    rel: &SchemaRelationship,
    types: &TypeMapper,
    entities: &BTreeMap<String, CompiledEntity>,
) -> Result<RelationshipPair> {
    let from = resolve_endpoint(rel, &rel.from, entities)?;
    let to = resolve_endpoint(rel, &rel.to, entities)?;

    let field_map = Arc::new(compile_fields(&rel.fields, &rel.name, types)?);
    let typedef = typedef_name(&rel.name);
    let field_list = quoted_list(
        ["from_link", "to_link"]
            .into_iter()
            .chain(field_map.iter().map(|f| f.name.as_str())),
    );

    let forward_fn = direction_function(&rel.name, from, &typedef, to);
    let converse_fn = direction_function(&rel.converse, to, &typedef, from);

    let direction = |name: &str,
                     is_converse: bool,
                     start: &str,
                     end: &str,
                     functions: Vec<FunctionSig>| CompiledRelationship {
        name: name.to_string(),
        sapling_name: name.to_string(),
        relation: rel.name.clone(),
        is_converse,
        arity: rel.arity.clone(),
        from: start.to_string(),
        to: end.to_string(),
        typedef: typedef.clone(),
        field_map: Arc::clone(&field_map),
        field_list: field_list.clone(),
        functions,
        notes: rel.notes.clone(),
    };

    let forward = direction(
        &rel.name,
        false,
        &rel.from,
        &rel.to,
        vec![forward_fn.clone(), converse_fn.clone()],
    );
    let converse = direction(
        &rel.converse,
        true,
        &rel.to,
        &rel.from,
        vec![converse_fn, forward_fn],
    );

    debug!(
        relationship = %rel.name,
        converse = %rel.converse,
        fields = field_map.len(),
        "compiled relationship"
    );

    Ok(RelationshipPair {
        forward,
        converse,
        from_key: from.id_type.clone(),
        to_key: to.id_type.clone(),
    })
}
