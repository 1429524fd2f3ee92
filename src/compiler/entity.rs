//! Entity Compiler

use tracing::debug;

use crate::error::Result;
use crate::linker::LinkTable;
use crate::model::{quoted_list, CompiledEntity, CompiledField, FunctionSig, Param};
use crate::names::normalize_field_name;
use crate::schema::{SchemaEntity, SchemaField};
use crate::types::{IfaceType, TypeMapper};

/// Record typedef name for an entity or relationship
pub fn typedef_name(name: &str) -> String {
    format!("fields_{}", name)
}

/// Normalize and type a field list.
///
/// Relation-valued fields become `list<T>` of their scalar type. `owner`
/// names the entity or relationship for error context.
pub fn compile_fields(
    fields: &[SchemaField],
    owner: &str,
    types: &TypeMapper,
) -> Result<Vec<CompiledField>> {
    fields
        .iter()
        .map(|field| -> Result<CompiledField> {
            let scalar = types.map(&field.field_type, owner, &field.name)?;
            let field_type = match field.relation {
                Some(_) => IfaceType::list(scalar),
                None => scalar,
            };
            Ok(CompiledField {
                name: normalize_field_name(&field.name),
                sapling_name: field.name.clone(),
                notes: field.notes.clone(),
                field_rel: field.relation.clone(),
                field_type,
            })
        })
        .collect()
}

/// `list<string> fields`, the requested-fields parameter every function takes
pub(crate) fn fields_param(name: &str) -> Param {
    Param::new(name, IfaceType::list(IfaceType::string()))
}

fn query_triples() -> IfaceType {
    let s = IfaceType::string();
    IfaceType::list(IfaceType::Tuple(vec![s.clone(), s.clone(), s]))
}

/// Compile one entity. The link table must already hold every relationship.
pub fn compile_entity(
    entity: &SchemaEntity,
    types: &TypeMapper,
    links: &LinkTable,
) -> Result<CompiledEntity> {
    let id_type = types.map(&entity.key_type, &entity.name, "id")?;
    let field_map = compile_fields(&entity.fields, &entity.name, types)?;
    let typedef = typedef_name(&entity.name);

    let record_map = IfaceType::mapping(id_type.clone(), IfaceType::named(&typedef));
    let functions = vec![
        FunctionSig {
            name: format!("get_entity_{}", entity.name),
            params: vec![
                Param::new("ids", IfaceType::list(id_type.clone())),
                fields_param("fields"),
            ],
            returns: record_map.clone(),
        },
        FunctionSig {
            name: format!("query_entity_{}", entity.name),
            params: vec![Param::new("qry", query_triples()), fields_param("fields")],
            returns: record_map.clone(),
        },
        FunctionSig {
            name: format!("all_entities_{}", entity.name),
            params: vec![
                Param::new("start", IfaceType::int()),
                Param::new("count", IfaceType::int()),
                fields_param("fields"),
            ],
            returns: record_map,
        },
    ];

    let field_list = quoted_list(
        std::iter::once("id").chain(field_map.iter().map(|f| f.name.as_str())),
    );
    let relationships = links.sorted_edges(&entity.name);

    debug!(
        entity = %entity.name,
        fields = field_map.len(),
        links = relationships.len(),
        "compiled entity"
    );

    Ok(CompiledEntity {
        name: entity.name.clone(),
        sapling_name: entity.name.clone(),
        typedef,
        id_type,
        field_map,
        field_list,
        relationships,
        functions,
        notes: entity.notes.clone(),
    })
}
