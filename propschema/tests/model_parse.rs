use std::sync::Arc;

use propschema::{
    ClassId, Compiler, Document, FieldDeclarer, FieldDetails, Model, NumberOptions, Registry, SafeParse, SchemaError,
    SetOptions, StringFormat, StringOptions,
};
use serde_json::json;

struct Address;

impl Document for Address {
    const NAME: &'static str = "Address";

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        fields.field("street").string(StringOptions::default());
        fields.field("zip").string(StringOptions {
            max_length: Some(5),
            ..StringOptions::default()
        });
    }
}

struct Customer;

impl Document for Customer {
    const NAME: &'static str = "Customer";

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        let address = fields.class_of::<Address>();
        fields.field("email").string(StringOptions {
            format: Some(StringFormat::Email),
            ..StringOptions::default()
        });
        fields.field("name").string(StringOptions {
            min_length: Some(2),
            ..StringOptions::default()
        });
        fields
            .field("age")
            .int(NumberOptions {
                minimum: Some(0.0),
                ..NumberOptions::default()
            })
            .details(FieldDetails::optional());
        fields.field("address").object_of(address).details(FieldDetails::nullable());
        fields.field("tags").array_of(ClassId::STRING);
        fields.field("kind").enumeration(["person", "company"]);
        fields
            .field("owner")
            .string(StringOptions {
                format: Some(StringFormat::ObjectId),
                ..StringOptions::default()
            })
            .details(FieldDetails::nullable().describe("Owner id"));
    }
}

struct Membership;

impl Document for Membership {
    const NAME: &'static str = "Membership";

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        fields.field("member").object_id();
        fields.field("groups").set(SetOptions {
            items: Some(ClassId::OBJECT_ID),
            ..SetOptions::default()
        });
    }
}

fn customer_model() -> Model {
    let compiler = Compiler::new(Arc::new(Registry::new()));
    let class = compiler.class_of::<Customer>();
    Model::build(&compiler, class, None).expect("model")
}

#[test]
fn valid_documents_are_returned_stripped() {
    let model = customer_model();
    let parsed = model
        .parse(&json!({
            "email": "ada@example.com",
            "name": "Ada",
            "address": null,
            "tags": ["vip"],
            "kind": "person",
            "owner": "65f1c0ffee0000000000cafe",
            "nickname": "countess",
        }))
        .expect("valid customer");

    assert_eq!(
        parsed,
        json!({
            "email": "ada@example.com",
            "name": "Ada",
            "address": null,
            "tags": ["vip"],
            "kind": "person",
            "owner": "65f1c0ffee0000000000cafe",
        })
    );
}

#[test]
fn issues_carry_dotted_paths_and_codes() {
    let model = customer_model();
    let result = model.safe_parse(&json!({
        "email": "nope",
        "name": "A",
        "age": 3.5,
        "address": { "street": 1, "zip": "123456" },
        "tags": ["a", 2],
        "kind": "robot",
        "owner": null,
    }));

    let SafeParse::Failure(error) = result else {
        panic!("expected a failure");
    };
    let found: Vec<(&str, &str)> = error
        .issues
        .iter()
        .map(|issue| (issue.field.as_str(), issue.code.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("email", "validation.email"),
            ("name", "validation.length"),
            ("age", "validation.int"),
            ("address.street", "validation.type"),
            ("address.zip", "validation.length"),
            ("tags.1", "validation.type"),
            ("kind", "validation.enum"),
        ]
    );
    assert_eq!(error.issues[3].message, "expected string, received number");
}

#[test]
fn missing_required_fields_are_reported() {
    let model = customer_model();
    let err = model.parse(&json!({ "name": "Bo" })).expect_err("incomplete");
    let SchemaError::Validation(error) = err else {
        panic!("expected a validation error");
    };
    let fields: Vec<&str> = error.fields().collect();
    assert_eq!(fields, vec!["email", "address", "tags", "kind", "owner"]);
    assert!(error.issues.iter().all(|issue| issue.code == "validation.required"));
}

#[test]
fn nullable_fields_collapse_in_the_document() {
    let model = customer_model();
    let document = model.to_json().expect("document").to_value().expect("serializable");

    assert_eq!(
        document["properties"]["owner"],
        json!({ "bsonType": ["objectId", "null"], "description": "Owner id" })
    );
    assert_eq!(
        document["properties"]["address"],
        json!({
            "anyOf": [
                {
                    "bsonType": "object",
                    "required": ["street", "zip"],
                    "properties": {
                        "street": { "bsonType": "string" },
                        "zip": { "bsonType": "string", "maxLength": 5 },
                    },
                    "additionalProperties": false,
                },
                { "bsonType": "null" },
            ]
        })
    );
    assert_eq!(
        document["properties"]["age"],
        json!({ "anyOf": [{ "bsonType": "int", "minimum": 0 }, { "not": {} }] })
    );
    assert_eq!(
        document["required"],
        json!(["email", "name", "address", "tags", "kind", "owner"])
    );
}

#[test]
fn object_id_fields_and_elements_reject_other_values() {
    let compiler = Compiler::new(Arc::new(Registry::new()));
    let model = Model::build(&compiler, compiler.class_of::<Membership>(), None).expect("model");

    let SafeParse::Failure(error) = model.safe_parse(&json!({ "member": 42, "groups": [true, "not-an-id"] })) else {
        panic!("expected a failure");
    };
    let fields: Vec<&str> = error.fields().collect();
    assert_eq!(fields, vec!["member", "groups.0", "groups.1"]);
    assert!(error.issues.iter().all(|issue| issue.code == "validation.object_id"));

    let valid = json!({
        "member": { "$oid": "65f1c0ffee0000000000cafe" },
        "groups": ["65f1c0ffee0000000000beef"],
    });
    assert_eq!(model.parse(&valid).expect("valid ids"), valid);

    let document = model.to_json().expect("document").to_value().expect("serializable");
    assert_eq!(document["properties"]["member"], json!({ "bsonType": "objectId" }));
    assert_eq!(
        document["properties"]["groups"],
        json!({ "bsonType": "array", "uniqueItems": true, "items": { "bsonType": "objectId" } })
    );
    assert_eq!(document["required"], json!(["groups"]));
}
