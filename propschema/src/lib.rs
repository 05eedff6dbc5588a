//! propschema core library.
//!
//! Field metadata declared on a class hierarchy is compiled into three artifacts:
//!
//! - a validation schema ([`SchemaNode`]) that parses JSON values,
//! - a MongoDB `$jsonSchema` document ([`JsonSchema`]) for collection validators,
//! - a list of index descriptions ([`IndexDescription`]).
//!
//! Declarations live in a [`Registry`]; a [`Compiler`] walks each class's inheritance chain
//! to build and cache schemas and indexes; [`translate`] turns a schema into a document.
//! [`Model`] bundles the three for one class.

pub mod builder;
pub mod ensure;
pub mod errors;
pub mod hint;
pub mod json_schema;
pub mod model;
pub mod prop;
pub mod registration;
pub mod registry;
pub mod schema;
pub mod types;
pub mod validators;

pub use builder::{Compiler, IndexDescription, compiler};
pub use ensure::{CollectionAdmin, ValidatorAction, ensure_indexes, ensure_model, ensure_validator};
pub use errors::*;
pub use json_schema::{BsonType, BsonTypes, Items, JsonSchema, SchemaOrBool, translate};
pub use model::{Model, model, validator, with_id};
pub use prop::{FieldBuilder, FieldDeclarer};
pub use registration::{ModelRegistration, get_model_by_collection, get_model_by_name, registered_models};
pub use registry::{Registry, registry};
pub use schema::{
    ArraySchema, NativeEnumMember, NativeEnumValue, NumberCheck, NumberSchema, ObjectSchema, Pattern, SafeParse,
    SchemaKind, SchemaNode, SetSchema, Shape, StringCheck, StringSchema, TupleSchema, UnknownKeys,
};
pub use types::*;

// Re-export inventory for `register_model!`
pub use inventory;
