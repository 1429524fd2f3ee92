//! Sapling Typespec Compiler
//!
//! Compiles a Sapling entity-relationship schema into two artifacts:
//!
//! - **Interface specification**: one module of record typedefs and query
//!   function declarations for every entity and relationship direction
//! - **Compiled model**: per-entity and per-relationship records consumed
//!   by the templates that render client stubs
//!
//! ## Pipeline
//!
//! ```text
//! schema.xml ──► Document ──► Schema
//!                               │
//!            NameRegistry ◄─────┤  (all names unique)
//!            LinkTable    ◄─────┤  (both directions per relationship)
//!                               ▼
//!                   entity compiler ──► SpecEmitter
//!                               ▼             │
//!             relationship compiler ──────────┤
//!                               ▼             ▼
//!                        CompiledModel     spec text
//! ```

pub mod checksum;
pub mod compiler;
pub mod config;
pub mod document;
pub mod emit;
pub mod error;
pub mod linker;
pub mod model;
pub mod names;
pub mod schema;
pub mod types;

pub use checksum::Checksum;
pub use compiler::{compile, Compilation, CompileJob, CompileOptions};
pub use config::{CompilerConfig, OutputFormat};
pub use document::{Document, Element};
pub use error::{CompileError, Result};
pub use linker::{LinkEdge, LinkTable};
pub use model::{CompiledEntity, CompiledField, CompiledModel, CompiledRelationship, FunctionSig};
pub use names::NameRegistry;
pub use schema::{Schema, SchemaEntity, SchemaField, SchemaRelationship};
pub use types::{IfaceType, ScalarType, TypeMapper};
