//! Models bundled with the CLI so it has something to show without a host application.

use propschema::{
    ClassId, Document, FieldDeclarer, FieldDetails, IndexSpec, NumberOptions, Registry, SetOptions, StringFormat,
    StringOptions, register_model,
};

/// Fields shared by every stored document.
pub struct Entity;

impl Document for Entity {
    const NAME: &'static str = "Entity";

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        fields.field("createdAt").date().index(IndexSpec::new().direction(-1));
        fields.field("updatedAt").date().details(FieldDetails::optional());
    }
}

pub struct Address;

impl Document for Address {
    const NAME: &'static str = "Address";

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        fields.field("street").string(StringOptions::default()).index(IndexSpec::new().exclude());
        fields.field("city").string(StringOptions::default()).index(IndexSpec::new());
        fields
            .field("zip")
            .string(StringOptions {
                min_length: Some(5),
                max_length: Some(10),
                ..StringOptions::default()
            })
            .details(FieldDetails::optional());
    }
}

pub struct User;

impl Document for User {
    const NAME: &'static str = "User";

    fn declare_base(registry: &Registry) -> Option<ClassId> {
        Some(registry.class_of::<Entity>())
    }

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        let address = fields.class_of::<Address>();
        fields
            .field("email")
            .string(StringOptions {
                format: Some(StringFormat::Email),
                ..StringOptions::default()
            })
            .index(IndexSpec::new().unique());
        fields.field("name").string(StringOptions {
            min_length: Some(1),
            ..StringOptions::default()
        });
        fields
            .field("age")
            .int(NumberOptions {
                minimum: Some(0.0),
                ..NumberOptions::default()
            })
            .details(FieldDetails::optional());
        fields
            .field("role")
            .enumeration(["admin", "member", "guest"])
            .details(FieldDetails::default().with_default("member"));
        fields
            .field("address")
            .object_of(address)
            .details(FieldDetails::nullable())
            .index(IndexSpec::new().sparse().passthrough());
        fields.field("tags").set(SetOptions {
            items: Some(ClassId::STRING),
            ..SetOptions::default()
        });
    }
}

pub struct Post;

impl Document for Post {
    const NAME: &'static str = "Post";

    fn declare_base(registry: &Registry) -> Option<ClassId> {
        Some(registry.class_of::<Entity>())
    }

    fn declare_fields(fields: &mut FieldDeclarer<'_>) {
        fields.field("title").string(StringOptions {
            max_length: Some(200),
            ..StringOptions::default()
        });
        fields.field("author").object_id().index(IndexSpec::new());
        fields.field("body").string(StringOptions::default()).details(FieldDetails::default().describe("Markdown source"));
        fields
            .field("published")
            .bool()
            .details(FieldDetails::default().with_default(false));
        fields
            .field("expiresAt")
            .date()
            .details(FieldDetails::optional())
            .index(IndexSpec::new().expire_after(0));
    }
}

register_model!(User, "users");
register_model!(Post, "posts");
