use std::sync::Arc;

use propschema::{
    ClassId, Compiler, Document, FieldDeclarer, IndexDirection, IndexSpec, Registry, SchemaError, StringOptions,
};
use serde_json::json;

struct Location;

impl Document for Location {
    const NAME: &'static str = "Location";

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        fields.field("point").any().index(IndexSpec::new().direction(IndexDirection::TwoDSphere));
        fields.field("label").string(StringOptions::default()).index(IndexSpec::new().exclude());
    }
}

struct Timestamped;

impl Document for Timestamped {
    const NAME: &'static str = "Timestamped";

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        fields.field("createdAt").date().index(IndexSpec::new().direction(-1));
    }
}

struct Store;

impl Document for Store {
    const NAME: &'static str = "Store";

    fn declare_base(registry: &Registry) -> Option<ClassId> {
        Some(registry.class_of::<Timestamped>())
    }

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        let location = fields.class_of::<Location>();
        fields.field("code").string(StringOptions::default()).index(IndexSpec::new().unique());
        fields.field("location").object_of(location).index(IndexSpec::new().passthrough().sparse());
        fields.field("session").string(StringOptions::default()).index(IndexSpec::new().expire_after(3600));
    }
}

struct Misdeclared;

impl Document for Misdeclared {
    const NAME: &'static str = "Misdeclared";

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        fields.field("score").number(Default::default()).index(IndexSpec::new().direction("up"));
    }
}

fn compiler() -> Compiler {
    Compiler::new(Arc::new(Registry::new()))
}

#[test]
fn store_indexes_cover_lineage_and_pass_through() {
    let compiler = compiler();
    let indexes = compiler.build_indexes(compiler.class_of::<Store>(), None).expect("indexes");

    let payload = serde_json::to_value(indexes.as_ref()).expect("serializable");
    assert_eq!(
        payload,
        json!([
            { "name": "code_1", "key": { "code": 1 }, "unique": true },
            { "name": "location_1", "key": { "location": 1 }, "sparse": true },
            { "name": "location.point_2dsphere", "key": { "location.point": "2dsphere" } },
            { "name": "session_1", "key": { "session": 1 }, "expireAfterSeconds": 3600 },
            { "name": "createdAt_-1", "key": { "createdAt": -1 } },
        ])
    );
}

#[test]
fn excluded_fields_are_still_indexed_on_their_own_class() {
    let compiler = compiler();
    let indexes = compiler.build_indexes(compiler.class_of::<Location>(), None).expect("indexes");
    let paths: Vec<_> = indexes.iter().filter_map(|index| index.path()).collect();
    assert_eq!(paths, vec!["point", "label"]);
}

#[test]
fn index_lists_are_cached() {
    let compiler = compiler();
    let store = compiler.class_of::<Store>();
    let first = compiler.build_indexes(store, None).expect("indexes");
    let second = compiler.build_indexes(store, None).expect("indexes");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn unknown_direction_names_the_value() {
    let compiler = compiler();
    let err = compiler
        .build_indexes(compiler.class_of::<Misdeclared>(), None)
        .expect_err("invalid direction");
    assert!(matches!(err, SchemaError::InvalidDirection { ref direction } if direction == "up"));
    assert_eq!(err.to_string(), "invalid index direction: up");
}
