//! Schema types and structures
//!
//! The in-memory form of a Sapling entity-relationship document. Values are
//! kept exactly as written; normalization and ordering happen in the compiler.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::{Document, Element};
use crate::error::Result;

/// A field of an entity or relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name as written (may contain hyphens)
    pub name: String,
    /// Schema primitive type (e.g. "string", "counter")
    pub field_type: String,
    /// Secondary relation holding zero-or-more values, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    #[serde(default)]
    pub notes: String,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            relation: None,
            notes: String::new(),
        }
    }

    /// Mark this field as relation-valued
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    fn from_element(element: &Element, owner: &str) -> Result<Self> {
        let context = format!("a field of {}", owner);
        Ok(Self {
            name: element.required_attr("name", &context)?.to_string(),
            field_type: element.required_attr("type", &context)?.to_string(),
            relation: element.attr("relation").map(str::to_string),
            notes: element.child_text("Notes"),
        })
    }
}

/// An entity: an object type with an identifier and fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntity {
    pub name: String,
    /// Primitive type of the identifier
    pub key_type: String,
    pub fields: Vec<SchemaField>,
    #[serde(default)]
    pub notes: String,
}

impl SchemaEntity {
    pub fn new(name: impl Into<String>, key_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_type: key_type.into(),
            fields: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn with_field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    fn from_element(element: &Element, index: usize) -> Result<Self> {
        let name = element
            .required_attr("name", &format!("entity #{}", index + 1))?
            .to_string();
        let context = format!("entity {}", name);
        let key_type = element.required_attr("keyType", &context)?.to_string();
        let fields = element
            .find("Fields/Field")
            .into_iter()
            .map(|f| SchemaField::from_element(f, &context))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            key_type,
            fields,
            notes: element.child_text("Notes"),
        })
    }
}

/// A directed relationship between two entities, always paired with a converse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRelationship {
    pub name: String,
    /// Name of the reverse (to -> from) direction
    pub converse: String,
    /// Arity marker as written (e.g. "1M", "MM")
    #[serde(default)]
    pub arity: String,
    pub from: String,
    pub to: String,
    pub fields: Vec<SchemaField>,
    #[serde(default)]
    pub notes: String,
}

impl SchemaRelationship {
    pub fn new(
        name: impl Into<String>,
        converse: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            converse: converse.into(),
            arity: String::new(),
            from: from.into(),
            to: to.into(),
            fields: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn with_arity(mut self, arity: impl Into<String>) -> Self {
        self.arity = arity.into();
        self
    }

    pub fn with_field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    fn from_element(element: &Element, index: usize) -> Result<Self> {
        let name = element
            .required_attr("name", &format!("relationship #{}", index + 1))?
            .to_string();
        let context = format!("relationship {}", name);
        let converse = element.required_attr("converse", &context)?.to_string();
        let from = element.required_attr("from", &context)?.to_string();
        let to = element.required_attr("to", &context)?.to_string();
        let fields = element
            .find("Fields/Field")
            .into_iter()
            .map(|f| SchemaField::from_element(f, &context))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            converse,
            arity: element.attr("arity").unwrap_or_default().to_string(),
            from,
            to,
            fields,
            notes: element.child_text("Notes"),
        })
    }
}

/// A complete schema document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub entities: Vec<SchemaEntity>,
    pub relationships: Vec<SchemaRelationship>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: SchemaEntity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_relationship(mut self, relationship: SchemaRelationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Read entities and relationships out of a parsed document
    pub fn from_document(doc: &Document) -> Result<Self> {
        let entities = doc
            .find("Entities/Entity")
            .into_iter()
            .enumerate()
            .map(|(i, e)| SchemaEntity::from_element(e, i))
            .collect::<Result<Vec<_>>>()?;

        let relationships = doc
            .find("Relationships/Relationship")
            .into_iter()
            .enumerate()
            .map(|(i, r)| SchemaRelationship::from_element(r, i))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            entities,
            relationships,
        })
    }

    /// Parse a schema from XML text
    pub fn parse(xml: &str) -> Result<Self> {
        Self::from_document(&Document::parse(xml)?)
    }

    /// Load a schema file from disk
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_document(&Document::open(path)?)
    }

    /// Look up an entity by exact name
    pub fn entity(&self, name: &str) -> Option<&SchemaEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;

    #[test]
    fn test_parse_entities_and_relationships() {
        let xml = r#"
            <Database>
              <Entities>
                <Entity name="Genome" keyType="string">
                  <Notes>A sequenced organism.</Notes>
                  <Fields>
                    <Field name="pub-date" type="date" />
                    <Field name="alias" type="string" relation="GenomeAlias">
                      <Notes>Alternate names</Notes>
                    </Field>
                  </Fields>
                </Entity>
                <Entity name="Feature" keyType="string" />
              </Entities>
              <Relationships>
                <Relationship name="HasFeature" converse="IsFeatureOf" arity="1M"
                              from="Genome" to="Feature">
                  <Fields><Field name="ordinal" type="int" /></Fields>
                </Relationship>
              </Relationships>
            </Database>"#;

        let schema = Schema::parse(xml).unwrap();
        assert_eq!(schema.entities.len(), 2);

        let genome = schema.entity("Genome").unwrap();
        assert_eq!(genome.key_type, "string");
        assert_eq!(genome.notes, "A sequenced organism.");
        assert_eq!(genome.fields[0].name, "pub-date");
        assert_eq!(genome.fields[1].relation.as_deref(), Some("GenomeAlias"));
        assert_eq!(genome.fields[1].notes, "Alternate names");

        let rel = &schema.relationships[0];
        assert_eq!(rel.converse, "IsFeatureOf");
        assert_eq!(rel.arity, "1M");
        assert_eq!((rel.from.as_str(), rel.to.as_str()), ("Genome", "Feature"));
        assert_eq!(rel.fields, vec![SchemaField::new("ordinal", "int")]);
    }

    #[test]
    fn test_missing_key_type_is_malformed() {
        let xml = r#"<Database><Entities><Entity name="Genome"/></Entities></Database>"#;
        let err = Schema::parse(xml).unwrap_err();
        assert!(matches!(err, CompileError::MalformedSchema(ref m) if m.contains("keyType")));
    }

    #[test]
    fn test_missing_converse_is_malformed() {
        let xml = r#"<Database><Relationships>
            <Relationship name="HasFeature" from="Genome" to="Feature"/>
        </Relationships></Database>"#;
        let err = Schema::parse(xml).unwrap_err();
        assert!(err.to_string().contains("relationship HasFeature"));
    }

    #[test]
    fn test_builder_matches_parsed() {
        let built = Schema::new().with_entity(
            SchemaEntity::new("Genome", "string").with_field(SchemaField::new("name", "string")),
        );
        let parsed = Schema::parse(
            r#"<Database><Entities><Entity name="Genome" keyType="string">
                 <Fields><Field name="name" type="string"/></Fields>
               </Entity></Entities></Database>"#,
        )
        .unwrap();
        assert_eq!(built, parsed);
    }
}
