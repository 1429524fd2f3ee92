//! Type Mapper
//!
//! Maps Sapling primitive type names onto interface-level types. The table
//! is fixed; configuration can only add scalar mappings for type names the
//! table does not know.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};
use crate::names::closest_match;

/// Composite types declared once at the top of every specification,
/// in header order
pub const COMPOSITE_TYPES: [&str; 3] = ["diamond", "countVector", "rectangle"];

const BUILTIN: &[(&str, ScalarType)] = &[
    ("boolean", ScalarType::Int),
    ("semi-boolean", ScalarType::String),
    ("char", ScalarType::String),
    ("counter", ScalarType::Int),
    ("date", ScalarType::String),
    ("float", ScalarType::Float),
    ("image", ScalarType::String),
    ("int", ScalarType::Int),
    ("long-string", ScalarType::String),
    ("string", ScalarType::String),
    ("hash-string", ScalarType::String),
    ("text", ScalarType::String),
    ("link", ScalarType::String),
    ("long-text", ScalarType::String),
    ("dna", ScalarType::String),
];

/// Interface scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Int,
    Float,
    String,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::String => "string",
        }
    }
}

/// An interface-level type expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum IfaceType {
    Scalar(ScalarType),
    /// A typedef declared elsewhere in the specification
    Named(String),
    List(Box<IfaceType>),
    Mapping(Box<IfaceType>, Box<IfaceType>),
    Tuple(Vec<IfaceType>),
}

impl IfaceType {
    pub fn int() -> Self {
        IfaceType::Scalar(ScalarType::Int)
    }

    pub fn string() -> Self {
        IfaceType::Scalar(ScalarType::String)
    }

    pub fn named(name: impl Into<String>) -> Self {
        IfaceType::Named(name.into())
    }

    pub fn list(inner: IfaceType) -> Self {
        IfaceType::List(Box::new(inner))
    }

    pub fn mapping(key: IfaceType, value: IfaceType) -> Self {
        IfaceType::Mapping(Box::new(key), Box::new(value))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, IfaceType::List(_))
    }
}

impl From<ScalarType> for IfaceType {
    fn from(scalar: ScalarType) -> Self {
        IfaceType::Scalar(scalar)
    }
}

impl fmt::Display for IfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IfaceType::Scalar(s) => f.write_str(s.as_str()),
            IfaceType::Named(name) => f.write_str(name),
            IfaceType::List(inner) => write!(f, "list<{}>", inner),
            IfaceType::Mapping(k, v) => write!(f, "mapping<{}, {}>", k, v),
            IfaceType::Tuple(items) => {
                f.write_str("tuple<")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(">")
            }
        }
    }
}

impl From<IfaceType> for String {
    fn from(ty: IfaceType) -> Self {
        ty.to_string()
    }
}

/// Schema type name -> interface type lookup
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    extra: BTreeMap<String, ScalarType>,
}

impl TypeMapper {
    /// The built-in table only
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table plus extra scalar mappings. Built-in names keep
    /// their built-in mapping.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = (S, ScalarType)>,
        S: Into<String>,
    {
        let extra = extra
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .filter(|(k, _)| builtin(k).is_none())
            .collect();
        Self { extra }
    }

    /// Look up a schema type name
    pub fn resolve(&self, type_name: &str) -> Option<IfaceType> {
        builtin(type_name).or_else(|| self.extra.get(type_name).map(|s| (*s).into()))
    }

    /// Look up a schema type name, failing with entity/field context
    pub fn map(&self, type_name: &str, entity: &str, field: &str) -> Result<IfaceType> {
        self.resolve(type_name).ok_or_else(|| CompileError::UnknownType {
            type_name: type_name.to_string(),
            entity: entity.to_string(),
            field: field.to_string(),
            suggestion: closest_match(type_name, self.known_types()),
        })
    }

    /// Every type name this mapper accepts
    pub fn known_types(&self) -> impl Iterator<Item = &str> {
        BUILTIN
            .iter()
            .map(|(name, _)| *name)
            .chain(COMPOSITE_TYPES)
            .chain(self.extra.keys().map(String::as_str))
    }
}

fn builtin(type_name: &str) -> Option<IfaceType> {
    if COMPOSITE_TYPES.contains(&type_name) {
        return Some(IfaceType::named(type_name));
    }
    BUILTIN
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, scalar)| (*scalar).into())
}
