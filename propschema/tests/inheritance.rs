use std::sync::Arc;

use propschema::{
    ClassId, Compiler, Document, FieldDeclarer, FieldDetails, Registry, SchemaError, SchemaKind, StringOptions, translate,
};
use serde_json::json;

struct Animal;

impl Document for Animal {
    const NAME: &'static str = "Animal";

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        fields.field("name").string(StringOptions::default());
        fields.field("legs").int(Default::default());
        fields.field("sound").string(StringOptions::default()).details(FieldDetails::optional());
    }
}

struct Bird;

impl Document for Bird {
    const NAME: &'static str = "Bird";

    fn declare_base(registry: &Registry) -> Option<ClassId> {
        Some(registry.class_of::<Animal>())
    }

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        fields.field("legs").int(Default::default()).details(FieldDetails::default().with_default(2));
        fields.field("wingspan").double(Default::default());
    }
}

struct Parrot;

impl Document for Parrot {
    const NAME: &'static str = "Parrot";

    fn declare_base(registry: &Registry) -> Option<ClassId> {
        Some(registry.class_of::<Bird>())
    }

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        fields.field("words").array_of(ClassId::STRING);
    }
}

fn compiler() -> Compiler {
    Compiler::new(Arc::new(Registry::new()))
}

#[test]
fn descendants_inherit_and_override_fields() {
    let compiler = compiler();
    let parrot = compiler.class_of::<Parrot>();
    let schema = compiler.build_validation_schema(parrot).expect("schema");

    let object = schema.as_object().expect("object");
    let keys: Vec<&str> = object.shape.keys().collect();
    assert_eq!(keys, vec!["name", "legs", "sound", "wingspan", "words"]);
    assert!(matches!(
        object.shape.get("legs").map(|node| &node.kind),
        Some(SchemaKind::Default { .. })
    ));

    let document = translate(&schema, None).expect("document").to_value().expect("serializable");
    assert_eq!(document["required"], json!(["name", "wingspan", "words"]));
    assert_eq!(document["properties"]["wingspan"], json!({ "bsonType": "double" }));
    assert_eq!(
        document["properties"]["words"],
        json!({ "bsonType": "array", "items": { "bsonType": "string" } })
    );
}

#[test]
fn ancestors_are_not_affected_by_descendants() {
    let compiler = compiler();
    let animal = compiler.class_of::<Animal>();
    compiler.build_validation_schema(compiler.class_of::<Parrot>()).expect("schema");

    let schema = compiler.build_validation_schema(animal).expect("schema");
    let document = translate(&schema, None).expect("document").to_value().expect("serializable");
    assert_eq!(document["required"], json!(["name", "legs"]));
    assert!(document["properties"].get("wingspan").is_none());
}

#[test]
fn each_class_is_built_once() {
    let compiler = compiler();
    let bird = compiler.class_of::<Bird>();
    let first = compiler.build_validation_schema(bird).expect("schema");
    let second = compiler.build_validation_schema(bird).expect("schema");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn parse_applies_inherited_defaults() {
    let compiler = compiler();
    let schema = compiler.build_validation_schema(compiler.class_of::<Bird>()).expect("schema");
    let parsed = schema
        .parse(&json!({ "name": "robin", "wingspan": 0.3, "color": "red" }))
        .expect("valid bird");
    assert_eq!(parsed, json!({ "name": "robin", "legs": 2, "wingspan": 0.3 }));
}

#[test]
fn classes_are_per_registry() {
    let one = compiler();
    let two = compiler();
    let animal = one.class_of::<Animal>();
    assert_ne!(animal, two.class_of::<Animal>());
    assert!(!two.registry().contains(animal));
}

#[test]
fn unknown_base_is_rejected() {
    let registry = Registry::new();
    let orphan = Registry::new().define_class("Other", None).expect("define");
    let err = registry.define_class("Orphan", Some(orphan)).expect_err("base from another registry");
    assert!(matches!(err, SchemaError::InvalidClassArgument { .. }));
}
