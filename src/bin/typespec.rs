//! Sapling Typespec CLI
//!
//! Compiles a Sapling schema into an interface specification and the model
//! consumed by stub templates.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sapling_typespec::{compile, CompileJob, CompileOptions, CompilerConfig, Schema};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sapling-typespec")]
#[command(about = "Compile Sapling schemas into typed interface specifications")]
struct Cli {
    /// Config file to load in addition to the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a schema and write the specification and model
    Compile {
        /// Service name recorded in the model
        service: String,
        /// Module name of the specification
        module: String,
        /// Sapling schema document (XML)
        schema_file: PathBuf,
        /// Where to write the specification text
        spec_output: PathBuf,
        /// Where to write the compiled model (JSON)
        model_output: PathBuf,
        /// Existing directory the stub renderer writes into
        stub_dir: PathBuf,
    },

    /// Compile a schema in memory and report what it contains
    Check {
        /// Sapling schema document (XML)
        schema_file: PathBuf,
        /// Module name to compile under
        #[arg(short, long, default_value = "Sapling")]
        module: String,
    },

    /// Write a config file with default values
    InitConfig {
        #[arg(short, long, default_value = "typespec.toml")]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    Schema::load(path).with_context(|| format!("cannot load schema {}", path.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CompilerConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Compile {
            service,
            module,
            schema_file,
            spec_output,
            model_output,
            stub_dir,
        } => {
            let job = CompileJob {
                service,
                module,
                schema_file,
                spec_output,
                model_output,
                stub_dir,
            };
            let compilation = job
                .run(config.type_mapper(), config.export.output_format)
                .with_context(|| format!("cannot compile {}", job.schema_file.display()))?;

            let relationships = compilation.model.relationships.values();
            println!("✅ Compiled {:?}", job.schema_file);
            println!("  Entities:      {}", compilation.model.entities.len());
            println!("  Relationships: {}", relationships.filter(|r| !r.is_converse).count());
            println!("  Spec:          {:?}", job.spec_output);
            println!("  Model:         {:?}", job.model_output);
            println!("  Checksum:      {}", compilation.model.spec_checksum);
            Ok(())
        }

        Commands::Check { schema_file, module } => {
            let schema = load_schema(&schema_file)?;
            let options = CompileOptions::new("check", module).with_types(config.type_mapper());
            let compilation = compile(&schema, &options)?;

            println!("✅ {:?} compiles", schema_file);
            for entity in compilation.model.entities.values() {
                println!(
                    "  {} ({} fields, {} links)",
                    entity.name,
                    entity.field_map.len(),
                    entity.relationships.len()
                );
            }
            for rel in compilation.model.relationships.values().filter(|r| !r.is_converse) {
                println!("  {}: {} -> {}", rel.name, rel.from, rel.to);
            }
            Ok(())
        }

        Commands::InitConfig { output } => {
            if output.exists() {
                bail!("{} already exists", output.display());
            }
            CompilerConfig::default().save(&output)?;
            println!("✅ Config written to {:?}", output);
            Ok(())
        }
    }
}
