//! Specification Emitter
//!
//! Append-only serializer for the interface specification. It renders
//! records the compilers already built and performs no validation.
//!
//! Layout:
//!
//! ```text
//! module <name> {
//! typedef string diamond;
//! typedef string countVector;
//! typedef string rectangle;
//!
//! /* notes */
//! typedef structure {
//!     string id;
//!     string name nullable;
//! } fields_Genome;
//!
//! funcdef get_entity_Genome(list<string> ids, list<string> fields) returns(mapping<string, fields_Genome>);
//! ...
//! };
//! ```

use crate::model::{CompiledEntity, CompiledField, CompiledRelationship, FunctionSig};
use crate::types::{IfaceType, COMPOSITE_TYPES};

/// Streaming writer for one specification
#[derive(Debug)]
pub struct SpecEmitter {
    out: String,
}

impl SpecEmitter {
    /// Start a specification with the module header and composite typedefs
    pub fn begin(module: &str) -> Self {
        let mut out = String::new();
        out.push_str(&format!("module {} {{\n", module));
        for name in COMPOSITE_TYPES {
            out.push_str(&format!("typedef string {};\n", name));
        }
        out.push('\n');
        Self { out }
    }

    /// Append an entity typedef and its three functions
    pub fn entity(&mut self, entity: &CompiledEntity) {
        self.notes(&entity.notes);
        self.out.push_str("typedef structure {\n");
        self.out.push_str(&format!("\t{} id;\n", entity.id_type));
        self.fields(&entity.field_map);
        self.out.push_str(&format!("}} {};\n\n", entity.typedef));

        for func in &entity.functions {
            self.function(func);
        }
        self.out.push('\n');
    }

    /// Append a relationship typedef and both direction functions.
    ///
    /// `from_key`/`to_key` are the identifier types of the forward endpoints.
    pub fn relationship(
        &mut self,
        forward: &CompiledRelationship,
        from_key: &IfaceType,
        to_key: &IfaceType,
    ) {
        self.notes(&forward.notes);
        self.out.push_str("typedef structure {\n");
        self.out.push_str(&format!("\t{} from_link;\n", from_key));
        self.out.push_str(&format!("\t{} to_link;\n", to_key));
        self.fields(&forward.field_map);
        self.out.push_str(&format!("}} {};\n\n", forward.typedef));

        for func in &forward.functions {
            self.function(func);
        }
        self.out.push('\n');
    }

    /// Close the module and return the text
    pub fn finish(mut self) -> String {
        self.out.push_str("};\n");
        self.out
    }

    fn fields(&mut self, fields: &[CompiledField]) {
        for field in fields {
            self.out.push_str(&format!("\t{} {} nullable;\n", field.field_type, field.name));
        }
    }

    fn function(&mut self, func: &FunctionSig) {
        let params = func
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        self.out.push_str(&format!(
            "funcdef {}({}) returns({});\n",
            func.name, params, func.returns
        ));
    }

    fn notes(&mut self, notes: &str) {
        let notes = notes.trim();
        if notes.is_empty() {
            return;
        }
        self.out.push_str("/*\n");
        for line in notes.lines() {
            self.out.push_str(&format!("{}\n", line.trim().replace("*/", "* /")));
        }
        self.out.push_str("*/\n");
    }
}
