//! Configuration management for the schema compiler
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (typespec.toml)
//! - Environment variables (TYPESPEC__*)
//!
//! ## Example config file (typespec.toml):
//! ```toml
//! [export]
//! output_format = "compact"
//!
//! [types]
//! percent = "float"
//! md5 = "string"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{CompileError, Result};
use crate::types::{ScalarType, TypeMapper};

/// Main configuration for the compiler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Model export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Extra schema type -> scalar mappings
    #[serde(default)]
    pub types: BTreeMap<String, ScalarType>,
}

/// Export configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format of the model JSON
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl CompilerConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file that must exist
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        let files = config_files(config_path);

        for path in &files {
            let required = Some(path.as_path()) == config_path;
            builder = builder.add_source(File::from(path.as_path()).required(required));
        }

        // Load from environment variables (TYPESPEC__*)
        builder = builder.add_source(
            Environment::with_prefix("TYPESPEC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut loaded: Self = config.try_deserialize()?;

        // The builder lowercases keys but type names are case-sensitive, so
        // merged values are moved back under the spelling the files use
        for path in files.iter().filter(|p| p.is_file()) {
            for name in read_types_table(path)?.into_keys() {
                if let Some(scalar) = loaded.types.remove(&name.to_lowercase()) {
                    loaded.types.insert(name, scalar);
                }
            }
        }

        Ok(loaded)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            CompileError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        std::fs::write(path, content).map_err(|e| CompileError::io(path, e))
    }

    /// Type mapper with the configured extra mappings
    pub fn type_mapper(&self) -> TypeMapper {
        TypeMapper::with_extra(self.types.iter().map(|(k, v)| (k.clone(), *v)))
    }
}

/// Config files in precedence order, lowest first
fn config_files(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = ["typespec.toml", ".typespec.toml", "config/typespec.toml"]
        .iter()
        .map(PathBuf::from)
        .collect();

    // XDG config directory
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "sapling", "typespec") {
        files.push(config_dir.config_dir().join("typespec.toml"));
    }

    if let Some(path) = explicit {
        files.push(path.to_path_buf());
    }
    files
}

#[derive(Deserialize)]
struct TypesTable {
    #[serde(default)]
    types: BTreeMap<String, ScalarType>,
}

/// The `[types]` table of one file, with key case intact
fn read_types_table(path: &Path) -> Result<BTreeMap<String, ScalarType>> {
    let content = std::fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
    let table: TypesTable = toml::from_str(&content).map_err(|e| CompileError::Parse {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    Ok(table.types)
}
