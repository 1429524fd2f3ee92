//! Schema Compilation
//!
//! Turns a [`Schema`] into interface specification text plus a
//! [`CompiledModel`] for stub rendering.
//!
//! Architecture:
//! - NameRegistry: every entity, relationship and converse name, checked up front
//! - LinkTable: per-entity relationship directions, built before entities compile
//! - Entity / relationship compilers: pure record builders
//! - SpecEmitter: fed each record as soon as it is compiled
//!
//! All state lives inside one [`compile`] call, so several schemas can be
//! compiled in the same process without interfering.

pub mod entity;
pub mod job;
pub mod relationship;

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::checksum::Checksum;
use crate::emit::SpecEmitter;
use crate::error::Result;
use crate::linker::LinkTable;
use crate::model::{CompiledEntity, CompiledModel, CompiledRelationship};
use crate::names::NameRegistry;
use crate::schema::{Schema, SchemaEntity, SchemaRelationship};
use crate::types::TypeMapper;

pub use entity::{compile_entity, compile_fields, typedef_name};
pub use job::CompileJob;
pub use relationship::{compile_relationship, RelationshipPair};

/// Inputs to one compilation run besides the schema itself
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Service name recorded in the model
    pub service: String,
    /// Module name of the emitted specification
    pub module: String,
    pub types: TypeMapper,
}

impl CompileOptions {
    /// Options using the built-in type table
    pub fn new(service: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            module: module.into(),
            types: TypeMapper::new(),
        }
    }

    pub fn with_types(mut self, types: TypeMapper) -> Self {
        self.types = types;
        self
    }
}

/// Output of a successful run
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Interface specification text
    pub spec: String,
    pub model: CompiledModel,
}

fn sorted_entities(schema: &Schema) -> Vec<&SchemaEntity> {
    let mut entities: Vec<_> = schema.entities.iter().collect();
    entities.sort_by(|a, b| a.name.cmp(&b.name));
    entities
}

fn sorted_relationships(schema: &Schema) -> Vec<&SchemaRelationship> {
    let mut relationships: Vec<_> = schema.relationships.iter().collect();
    relationships.sort_by(|a, b| a.name.cmp(&b.name));
    relationships
}

/// Claim every entity, relationship and converse name in the schema
pub fn register_names(schema: &Schema) -> Result<NameRegistry> {
    let mut registry = NameRegistry::new();
    for entity in sorted_entities(schema) {
        registry.register(&entity.name)?;
    }
    for rel in sorted_relationships(schema) {
        registry.register(&rel.name)?;
        registry.register(&rel.converse)?;
    }
    Ok(registry)
}

/// Compile a schema.
///
/// Stages run in a fixed order, each a precondition of the next:
/// 1. all names are registered (any collision aborts before output exists)
/// 2. relationships are linked onto their endpoint entities
/// 3. entities are compiled and emitted in lexical order
/// 4. relationships are compiled and emitted in lexical order; endpoint
///    resolution needs every entity from step 3
/// 5. the specification is closed and the model exported
pub fn compile(schema: &Schema, options: &CompileOptions) -> Result<Compilation> {
    if schema.is_empty() {
        warn!("schema has no entities or relationships");
    }

    let registry = register_names(schema)?;
    info!(names = registry.len(), "registered names");

    let links = LinkTable::build(&schema.relationships);

    let mut emitter = SpecEmitter::begin(&options.module);

    let mut entities: BTreeMap<String, CompiledEntity> = BTreeMap::new();
    for entity in sorted_entities(schema) {
        let compiled = compile_entity(entity, &options.types, &links)?;
        emitter.entity(&compiled);
        entities.insert(compiled.name.clone(), compiled);
    }
    info!(count = entities.len(), "compiled entities");

    let mut relationships: BTreeMap<String, CompiledRelationship> = BTreeMap::new();
    for rel in sorted_relationships(schema) {
        let pair = compile_relationship(rel, &options.types, &entities)?;
        emitter.relationship(&pair.forward, &pair.from_key, &pair.to_key);
        relationships.insert(pair.forward.name.clone(), pair.forward);
        relationships.insert(pair.converse.name.clone(), pair.converse);
    }
    info!(count = schema.relationships.len(), "compiled relationships");

    let spec = emitter.finish();
    let model = CompiledModel {
        service: options.service.clone(),
        module: options.module.clone(),
        spec_checksum: Checksum::from_text(&spec),
        entities,
        relationships,
    };

    Ok(Compilation { spec, model })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::schema::SchemaField;

    fn schema() -> Schema {
        Schema::new()
            .with_entity(
                SchemaEntity::new("Genome", "string")
                    .with_field(SchemaField::new("name", "string")),
            )
            .with_entity(SchemaEntity::new("Feature", "string"))
            .with_relationship(SchemaRelationship::new(
                "HasFeature",
                "IsFeatureOf",
                "Genome",
                "Feature",
            ))
    }

    #[test]
    fn test_register_names_counts_all() {
        let registry = register_names(&schema()).unwrap();
        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["Feature", "Genome", "HasFeature", "IsFeatureOf"]
        );
    }

    #[test]
    fn test_entity_relationship_collision() {
        let schema = schema().with_relationship(SchemaRelationship::new(
            "Genome",
            "IsGenomeOf",
            "Genome",
            "Feature",
        ));
        let err = compile(&schema, &CompileOptions::new("svc", "M")).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateName { ref name } if name == "Genome"));
    }

    #[test]
    fn test_relationship_equal_to_own_converse() {
        let schema = schema().with_relationship(SchemaRelationship::new(
            "Touches",
            "Touches",
            "Feature",
            "Feature",
        ));
        let err = register_names(&schema).unwrap_err();
        assert!(matches!(err, CompileError::DuplicateName { ref name } if name == "Touches"));
    }

    #[test]
    fn test_model_contents() {
        let compilation = compile(&schema(), &CompileOptions::new("sapling", "Sapling")).unwrap();
        let model = &compilation.model;

        assert_eq!(model.service, "sapling");
        assert_eq!(model.entities.keys().collect::<Vec<_>>(), vec!["Feature", "Genome"]);
        assert_eq!(
            model.relationships.keys().collect::<Vec<_>>(),
            vec!["HasFeature", "IsFeatureOf"]
        );
        assert!(model.spec_checksum.verify(&compilation.spec));

        let converse = model.relationship("IsFeatureOf").unwrap();
        let (from, to) = model.endpoints(converse).unwrap();
        assert_eq!((from.name.as_str(), to.name.as_str()), ("Feature", "Genome"));
        assert_eq!(model.opposite(converse).unwrap().name, "HasFeature");

        let genome = model.entity("Genome").unwrap();
        assert_eq!(genome.relationships.len(), 1);
        assert_eq!(genome.relationships[0].name, "HasFeature");
        let feature = model.entity("Feature").unwrap();
        assert_eq!(feature.relationships[0].name, "IsFeatureOf");
    }

    #[test]
    fn test_spec_sections_in_order() {
        let spec = compile(&schema(), &CompileOptions::new("sapling", "Sapling")).unwrap().spec;
        let feature = spec.find("} fields_Feature;").unwrap();
        let genome = spec.find("} fields_Genome;").unwrap();
        let rel = spec.find("} fields_HasFeature;").unwrap();
        assert!(feature < genome && genome < rel);
        assert!(spec.starts_with("module Sapling {\n"));
        assert!(spec.ends_with("};\n"));
    }

    #[test]
    fn test_empty_schema_compiles_to_header_only() {
        let compilation = compile(&Schema::new(), &CompileOptions::new("svc", "Empty")).unwrap();
        assert!(compilation.model.entities.is_empty());
        assert!(compilation.spec.contains("typedef string rectangle;"));
    }
}
