//! Error types for the schema compiler

use std::path::PathBuf;

use thiserror::Error;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Schema compiler errors
///
/// Every variant is fatal: a compilation run either produces a complete
/// specification or nothing at all.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Duplicate name: {name} is already used by an entity, relationship or converse")]
    DuplicateName { name: String },

    #[error("Unknown type '{type_name}' for field {field} of {entity}{}", hint(.suggestion))]
    UnknownType {
        type_name: String,
        entity: String,
        field: String,
        suggestion: Option<String>,
    },

    #[error("Relationship {relationship} references unknown entity {entity}{}", hint(.suggestion))]
    UnresolvedEndpoint {
        relationship: String,
        entity: String,
        suggestion: Option<String>,
    },

    #[error("Malformed schema: {0}")]
    MalformedSchema(String),

    #[error("Failed to parse schema document {}: {message}", display_path(.path))]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stub output directory {} does not exist", .path.display())]
    MissingDirectory { path: PathBuf },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl CompileError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<string>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_message_with_suggestion() {
        let err = CompileError::UnknownType {
            type_name: "strng".to_string(),
            entity: "Genome".to_string(),
            field: "name".to_string(),
            suggestion: Some("string".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("strng"));
        assert!(msg.contains("Genome"));
        assert!(msg.contains("did you mean 'string'"));
    }

    #[test]
    fn test_parse_message_without_path() {
        let err = CompileError::Parse {
            path: None,
            message: "unexpected end".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to parse schema document <string>: unexpected end");
    }
}
