//! Fluent field registration.
//!
//! ```
//! use propschema::{Document, FieldDeclarer, FieldDetails, IndexSpec, StringOptions};
//!
//! struct User;
//!
//! impl Document for User {
//!     const NAME: &'static str = "User";
//!
//!     fn declare_fields(fields: &mut FieldDeclarer<'_>) {
//!         fields.field("email").string(StringOptions::default()).index(IndexSpec::new().unique());
//!         fields.field("age").int(Default::default()).details(FieldDetails::optional());
//!     }
//! }
//! ```

use crate::json_schema::BsonType;
use crate::registry::Registry;
use crate::schema::{NativeEnumMember, SchemaNode};
use crate::types::{
    AnyOptions, ArrayOptions, ClassId, Document, EnumOptions, FieldDetails, IndexSpec, MapOptions, NativeEnumOptions,
    NumberOptions, NumericType, ObjectOptions, RawOptions, SetOptions, StringOptions, TypeOptions, TypeTag,
};

/// Handed to [`Document::declare_fields`]; registers fields on one class.
pub struct FieldDeclarer<'r> {
    registry: &'r Registry,
    class: ClassId,
}

impl<'r> FieldDeclarer<'r> {
    pub fn new(registry: &'r Registry, class: ClassId) -> Self {
        Self { registry, class }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Class of another document type, declared on first use.
    pub fn class_of<T: Document>(&self) -> ClassId {
        self.registry.class_of::<T>()
    }

    pub fn field(&mut self, name: impl Into<String>) -> FieldBuilder<'r> {
        FieldBuilder {
            registry: self.registry,
            class: self.class,
            name: name.into(),
        }
    }
}

/// Registration calls for a single field. Each call merges into the stored declaration.
pub struct FieldBuilder<'r> {
    registry: &'r Registry,
    class: ClassId,
    name: String,
}

impl FieldBuilder<'_> {
    fn typed(self, tag: TypeTag, options: TypeOptions) -> Self {
        self.registry.set_field_type(self.class, &self.name, tag, options);
        self
    }

    fn numeric(self, numeric_type: NumericType, options: NumberOptions) -> Self {
        self.number(NumberOptions {
            numeric_type: Some(numeric_type),
            ..options
        })
    }

    pub fn any(self) -> Self {
        self.typed(TypeTag::Any, TypeOptions::Any(AnyOptions::default()))
    }

    /// Unconstrained value stored with a specific BSON type.
    pub fn any_of_type(self, bson_type: BsonType) -> Self {
        self.typed(
            TypeTag::Any,
            TypeOptions::Any(AnyOptions {
                bson_type: Some(bson_type),
            }),
        )
    }

    pub fn object_id(self) -> Self {
        self.any_of_type(BsonType::ObjectId)
    }

    pub fn bin_data(self) -> Self {
        self.any_of_type(BsonType::BinData)
    }

    pub fn timestamp(self) -> Self {
        self.any_of_type(BsonType::Timestamp)
    }

    /// Use a hand-built schema node as is.
    pub fn raw(self, schema: SchemaNode) -> Self {
        self.typed(TypeTag::Raw, TypeOptions::Raw(RawOptions { schema }))
    }

    pub fn bool(self) -> Self {
        self.typed(TypeTag::Bool, TypeOptions::None)
    }

    pub fn date(self) -> Self {
        self.typed(TypeTag::Date, TypeOptions::None)
    }

    pub fn big_int(self) -> Self {
        self.typed(TypeTag::BigInt, TypeOptions::None)
    }

    pub fn string(self, options: StringOptions) -> Self {
        self.typed(TypeTag::String, TypeOptions::String(options))
    }

    pub fn number(self, options: NumberOptions) -> Self {
        self.typed(TypeTag::Number, TypeOptions::Number(options))
    }

    pub fn int(self, options: NumberOptions) -> Self {
        self.numeric(NumericType::Int, options)
    }

    pub fn long(self, options: NumberOptions) -> Self {
        self.numeric(NumericType::Long, options)
    }

    pub fn double(self, options: NumberOptions) -> Self {
        self.numeric(NumericType::Double, options)
    }

    pub fn decimal(self, options: NumberOptions) -> Self {
        self.numeric(NumericType::Decimal, options)
    }

    pub fn enumeration<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.typed(TypeTag::Enum, TypeOptions::Enum(EnumOptions { values }))
    }

    pub fn native_enum(self, members: impl IntoIterator<Item = NativeEnumMember>) -> Self {
        let members = members.into_iter().collect();
        self.typed(TypeTag::NativeEnum, TypeOptions::NativeEnum(NativeEnumOptions { members }))
    }

    pub fn object(self, options: ObjectOptions) -> Self {
        self.typed(TypeTag::Object, TypeOptions::Object(options))
    }

    /// Embedded document of class `class`.
    pub fn object_of(self, class: ClassId) -> Self {
        self.object(ObjectOptions { class: Some(class) })
    }

    pub fn array(self, options: ArrayOptions) -> Self {
        self.typed(TypeTag::Array, TypeOptions::Array(options))
    }

    pub fn array_of(self, items: ClassId) -> Self {
        self.array(ArrayOptions {
            items: Some(items),
            ..ArrayOptions::default()
        })
    }

    pub fn set(self, options: SetOptions) -> Self {
        self.typed(TypeTag::Set, TypeOptions::Set(options))
    }

    pub fn map(self, options: MapOptions) -> Self {
        self.typed(TypeTag::Map, TypeOptions::Map(options))
    }

    pub fn details(self, details: FieldDetails) -> Self {
        self.registry.set_field_details(self.class, &self.name, details);
        self
    }

    pub fn index(self, index: IndexSpec) -> Self {
        self.registry.set_field_index(self.class, &self.name, index);
        self
    }
}
