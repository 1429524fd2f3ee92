//! File-to-file compilation
//!
//! Reads a schema document, compiles it and writes the specification text
//! and model JSON. Nothing is written unless the whole run succeeds.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::OutputFormat;
use crate::error::{CompileError, Result};
use crate::schema::Schema;
use crate::types::TypeMapper;

use super::{compile, Compilation, CompileOptions};

/// One `compile` invocation: input schema, two outputs and the stub directory
#[derive(Debug, Clone)]
pub struct CompileJob {
    pub service: String,
    pub module: String,
    pub schema_file: PathBuf,
    pub spec_output: PathBuf,
    pub model_output: PathBuf,
    /// Existing directory the stub renderer writes into
    pub stub_dir: PathBuf,
}

impl CompileJob {
    /// Compile and write both outputs.
    ///
    /// The stub directory and output parents are checked before the schema
    /// is read. The model is serialized before either file is written.
    pub fn run(&self, types: TypeMapper, format: OutputFormat) -> Result<Compilation> {
        if !self.stub_dir.is_dir() {
            return Err(CompileError::MissingDirectory {
                path: self.stub_dir.clone(),
            });
        }
        check_parent(&self.spec_output)?;
        check_parent(&self.model_output)?;

        let schema = Schema::load(&self.schema_file)?;
        let options = CompileOptions::new(&self.service, &self.module).with_types(types);
        let compilation = compile(&schema, &options)?;
        let model_json = compilation.model.to_json(format)?;

        write_file(&self.spec_output, &compilation.spec)?;
        if let Err(e) = write_file(&self.model_output, &model_json) {
            if fs::remove_file(&self.spec_output).is_err() {
                warn!(path = %self.spec_output.display(), "could not remove partial output");
            }
            return Err(e);
        }

        info!(
            spec = %self.spec_output.display(),
            model = %self.model_output.display(),
            stub_dir = %self.stub_dir.display(),
            "model ready for stub rendering"
        );
        Ok(compilation)
    }
}

fn check_parent(path: &Path) -> Result<()> {
    let missing = path
        .parent()
        .is_some_and(|parent| !parent.as_os_str().is_empty() && !parent.is_dir());
    if missing {
        let source = io::Error::new(io::ErrorKind::NotFound, "parent directory does not exist");
        return Err(CompileError::io(path, source));
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| CompileError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Checksum;

    const SCHEMA: &str = r#"<Database>
  <Entities>
    <Entity name="Genome" keyType="string">
      <Fields><Field name="scientific-name" type="string"/></Fields>
    </Entity>
    <Entity name="Feature" keyType="string"/>
  </Entities>
  <Relationships>
    <Relationship name="HasFeature" converse="IsFeatureOf" from="Genome" to="Feature" arity="1M"/>
  </Relationships>
</Database>
"#;

    fn job(root: &Path, schema: &str) -> CompileJob {
        let schema_file = root.join("schema.xml");
        fs::write(&schema_file, schema).unwrap();
        let stub_dir = root.join("stubs");
        fs::create_dir(&stub_dir).unwrap();
        CompileJob {
            service: "sapling".to_string(),
            module: "Sapling".to_string(),
            schema_file,
            spec_output: root.join("sapling.spec"),
            model_output: root.join("sapling.json"),
            stub_dir,
        }
    }

    #[test]
    fn test_writes_spec_and_model() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path(), SCHEMA);
        job.run(TypeMapper::new(), OutputFormat::Pretty).unwrap();

        let spec = fs::read_to_string(&job.spec_output).unwrap();
        assert!(spec.starts_with("module Sapling {\n"));
        assert!(spec.contains("} fields_HasFeature;"));

        let model: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&job.model_output).unwrap()).unwrap();
        assert_eq!(model["service"], "sapling");
        assert_eq!(model["spec_checksum"], Checksum::from_text(&spec).as_str());
        assert_eq!(model["entities"]["Genome"]["field_map"][0]["name"], "scientific_name");
    }

    #[test]
    fn test_missing_stub_dir_reads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job(dir.path(), SCHEMA);
        job.stub_dir = dir.path().join("absent");
        job.schema_file = dir.path().join("also-absent.xml");

        let err = job.run(TypeMapper::new(), OutputFormat::Pretty).unwrap_err();
        assert!(matches!(
            err,
            CompileError::MissingDirectory { ref path } if path.ends_with("absent")
        ));
        assert!(!job.spec_output.exists());
        assert!(!job.model_output.exists());
    }

    #[test]
    fn test_malformed_schema_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path(), "<Database><Entities></Database>");

        let err = job.run(TypeMapper::new(), OutputFormat::Pretty).unwrap_err();
        assert!(matches!(err, CompileError::Parse { path: Some(_), .. }));
        assert!(!job.spec_output.exists());
        assert!(!job.model_output.exists());
    }

    #[test]
    fn test_missing_model_parent_leaves_no_spec() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job(dir.path(), SCHEMA);
        job.model_output = dir.path().join("missing").join("sapling.json");

        let err = job.run(TypeMapper::new(), OutputFormat::Pretty).unwrap_err();
        assert!(matches!(err, CompileError::Io { ref path, .. } if path == &job.model_output));
        assert!(!job.spec_output.exists());
    }
}
