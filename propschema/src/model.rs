use std::sync::Arc;

use serde_json::{Value, json};

use crate::builder::{Compiler, IndexDescription, compiler};
use crate::errors::SchemaError;
use crate::json_schema::{BsonType, JsonSchema, SchemaOrBool, translate};
use crate::schema::{SafeParse, SchemaNode};
use crate::types::{ClassId, Document};

/// Compiled view of one class: its validation schema, indexes and `$jsonSchema` document.
#[derive(Debug, Clone)]
pub struct Model {
    class: ClassId,
    name: String,
    schema: Arc<SchemaNode>,
    indexes: Arc<[IndexDescription]>,
}

/// Model of `T` from the process-wide compiler.
pub fn model<T: Document>() -> Result<Model, SchemaError> {
    let compiler = compiler();
    Model::build(compiler, compiler.class_of::<T>(), None)
}

impl Model {
    /// Build the schema and indexes of `class` up front so declaration errors surface here.
    ///
    /// A `description` is attached to a copy of the class schema; the cached schema shared
    /// with other models is left untouched.
    pub fn build(compiler: &Compiler, class: ClassId, description: Option<&str>) -> Result<Self, SchemaError> {
        let mut schema = compiler.build_validation_schema(class)?;
        if let Some(description) = description {
            schema = Arc::new(schema.as_ref().clone().describe(description));
        }
        let indexes = compiler.build_indexes(class, None)?;
        let name = compiler.registry().class_name(class).unwrap_or_else(|| class.to_string());
        Ok(Self {
            class,
            name,
            schema,
            indexes,
        })
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_schema(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    pub fn get_indexes(&self) -> &[IndexDescription] {
        &self.indexes
    }

    /// Fresh translation of the schema on every call.
    pub fn to_json(&self) -> Result<JsonSchema, SchemaError> {
        translate(&self.schema, None)
    }

    pub fn to_json_titled(&self, title: &str) -> Result<JsonSchema, SchemaError> {
        translate(&self.schema, Some(title))
    }

    /// Collection validator: `{"$jsonSchema": <document>}`.
    pub fn validator(&self) -> Result<Value, SchemaError> {
        validator(&self.to_json()?)
    }

    pub fn parse(&self, value: &Value) -> Result<Value, SchemaError> {
        Ok(self.schema.parse(value)?)
    }

    pub fn safe_parse(&self, value: &Value) -> SafeParse {
        self.schema.safe_parse(value)
    }
}

/// Wrap a document as a collection validator.
pub fn validator(document: &JsonSchema) -> Result<Value, SchemaError> {
    Ok(json!({ "$jsonSchema": document.to_value()? }))
}

/// Declare the `_id` field on a closed object document.
///
/// Documents that allow additional properties already accept `_id` and are returned as is.
pub fn with_id(mut document: JsonSchema) -> JsonSchema {
    if document.additional_properties != Some(SchemaOrBool::Bool(false)) {
        return document;
    }
    document
        .properties
        .get_or_insert_with(Default::default)
        .entry("_id".to_string())
        .or_insert_with(|| JsonSchema::typed(BsonType::ObjectId));
    let required = document.required.get_or_insert_with(Vec::new);
    if !required.iter().any(|key| key == "_id") {
        required.insert(0, "_id".to_string());
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::types::{FieldDetails, IndexSpec, TypeOptions, TypeTag};

    fn sample() -> (Compiler, ClassId) {
        let registry = Arc::new(Registry::new());
        let class = registry.define_class("Note", None).expect("define");
        registry.set_field_type(class, "body", TypeTag::String, TypeOptions::None);
        registry.set_field_type(class, "pinned", TypeTag::Bool, TypeOptions::None);
        registry.set_field_details(class, "pinned", FieldDetails::default().with_default(false));
        registry.set_field_index(class, "pinned", IndexSpec::new());
        (Compiler::new(registry), class)
    }

    #[test]
    fn model_exposes_schema_indexes_and_document() {
        let (compiler, class) = sample();
        let model = Model::build(&compiler, class, None).expect("model");

        assert_eq!(model.name(), "Note");
        assert!(Arc::ptr_eq(model.get_schema(), &compiler.build_validation_schema(class).expect("schema")));
        assert_eq!(model.get_indexes().len(), 1);
        assert_eq!(
            model.validator().expect("validator"),
            json!({
                "$jsonSchema": {
                    "bsonType": "object",
                    "required": ["body"],
                    "properties": {
                        "body": { "bsonType": "string" },
                        "pinned": { "bsonType": "bool" },
                    },
                    "additionalProperties": false,
                }
            })
        );
    }

    #[test]
    fn description_applies_to_a_copy() {
        let (compiler, class) = sample();
        let described = Model::build(&compiler, class, Some("Notes")).expect("model");
        let document = described.to_json_titled("note").expect("document");
        assert_eq!(document.description.as_deref(), Some("Notes"));
        assert_eq!(document.title.as_deref(), Some("note"));

        let plain = Model::build(&compiler, class, None).expect("model");
        assert_eq!(plain.to_json().expect("document").description, None);
    }

    #[test]
    fn parse_applies_defaults() {
        let (compiler, class) = sample();
        let model = Model::build(&compiler, class, None).expect("model");
        assert_eq!(
            model.parse(&json!({ "body": "hi" })).expect("valid"),
            json!({ "body": "hi", "pinned": false })
        );
        assert!(matches!(model.parse(&json!({})), Err(SchemaError::Validation(_))));
        assert!(!model.safe_parse(&json!({ "body": 1 })).is_success());
    }

    #[test]
    fn with_id_only_touches_closed_documents() {
        let (compiler, class) = sample();
        let model = Model::build(&compiler, class, None).expect("model");
        let document = with_id(model.to_json().expect("document"));
        assert_eq!(document.required, Some(vec!["_id".to_string(), "body".to_string()]));
        assert_eq!(
            document.properties.as_ref().and_then(|properties| properties.get("_id")),
            Some(&JsonSchema::typed(BsonType::ObjectId))
        );
        assert_eq!(with_id(document.clone()), document);

        let open = JsonSchema::typed(BsonType::Object);
        assert_eq!(with_id(open.clone()), open);
    }
}
