use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::errors::SchemaError;
use crate::json_schema::BsonType;
use crate::prop::FieldDeclarer;
use crate::registry::Registry;
use crate::schema::{Pattern, SchemaNode};

/// Opaque identity of a declared class.
///
/// Identity is never derived from the class name: two classes defined with the same name
/// get distinct ids and distinct cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub(crate) u64);

// First id handed out to user classes; everything below is reserved for built-ins.
const FIRST_USER_CLASS: u64 = 64;

static NEXT_CLASS: AtomicU64 = AtomicU64::new(FIRST_USER_CLASS);

impl ClassId {
    pub const BOOLEAN: ClassId = ClassId(1);
    pub const STRING: ClassId = ClassId(2);
    pub const NUMBER: ClassId = ClassId(3);
    pub const DATE: ClassId = ClassId(4);
    pub const OBJECT: ClassId = ClassId(5);
    pub const ARRAY: ClassId = ClassId(6);
    pub const SET: ClassId = ClassId(7);
    pub const MAP: ClassId = ClassId(8);
    pub const OBJECT_ID: ClassId = ClassId(9);
    pub const BIN_DATA: ClassId = ClassId(10);
    pub const DOUBLE: ClassId = ClassId(11);
    pub const DECIMAL: ClassId = ClassId(12);
    pub const LONG: ClassId = ClassId(13);

    pub(crate) const BUILTINS: [(ClassId, &'static str); 13] = [
        (ClassId::BOOLEAN, "Boolean"),
        (ClassId::STRING, "String"),
        (ClassId::NUMBER, "Number"),
        (ClassId::DATE, "Date"),
        (ClassId::OBJECT, "Object"),
        (ClassId::ARRAY, "Array"),
        (ClassId::SET, "Set"),
        (ClassId::MAP, "Map"),
        (ClassId::OBJECT_ID, "ObjectId"),
        (ClassId::BIN_DATA, "Binary"),
        (ClassId::DOUBLE, "Double"),
        (ClassId::DECIMAL, "Decimal128"),
        (ClassId::LONG, "Long"),
    ];

    /// Allocate a fresh id, unique for the whole process.
    pub(crate) fn allocate() -> Self {
        ClassId(NEXT_CLASS.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_builtin(self) -> bool {
        self.0 < FIRST_USER_CLASS
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rust types that declare their fields with the fluent registration API.
///
/// The registry calls [`Document::declare_fields`] exactly once per registry, the first time
/// the type is resolved through [`Registry::class_of`].
pub trait Document: 'static {
    /// Display name used in error paths (`Name.field`).
    const NAME: &'static str;

    /// Parent class in the single-inheritance chain.
    fn declare_base(_registry: &Registry) -> Option<ClassId> {
        None
    }

    fn declare_fields(fields: &mut FieldDeclarer<'_>);
}

/// Which schema-construction rule applies to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Any,
    Raw,
    Bool,
    String,
    Number,
    BigInt,
    Date,
    Enum,
    NativeEnum,
    Object,
    Array,
    Set,
    Map,
}

impl TypeTag {
    /// Container tags reference other classes and are checked for self-references.
    pub fn is_container(self) -> bool {
        matches!(self, TypeTag::Object | TypeTag::Array | TypeTag::Set | TypeTag::Map)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Url,
    Uuid,
    Cuid,
    /// The following formats only carry a BSON type hint.
    ObjectId,
    BinData,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    Int,
    Long,
    Double,
    Decimal,
}

impl NumericType {
    pub fn bson_type(self) -> BsonType {
        match self {
            NumericType::Int => BsonType::Int,
            NumericType::Long => BsonType::Long,
            NumericType::Double => BsonType::Double,
            NumericType::Decimal => BsonType::Decimal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnyOptions {
    pub bson_type: Option<BsonType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawOptions {
    pub schema: SchemaNode,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringOptions {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub format: Option<StringFormat>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberOptions {
    pub numeric_type: Option<NumericType>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub multiple_of: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumOptions {
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeEnumOptions {
    pub members: Vec<crate::schema::NativeEnumMember>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObjectOptions {
    pub class: Option<ClassId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArrayOptions {
    pub items: Option<ClassId>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetOptions {
    pub items: Option<ClassId>,
    pub min_size: Option<usize>,
    pub max_size: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MapOptions {
    pub keys: Option<ClassId>,
    pub values: Option<ClassId>,
}

/// Tag-specific options recorded alongside a [`TypeTag`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TypeOptions {
    #[default]
    None,
    Any(AnyOptions),
    Raw(RawOptions),
    String(StringOptions),
    Number(NumberOptions),
    Enum(EnumOptions),
    NativeEnum(NativeEnumOptions),
    Object(ObjectOptions),
    Array(ArrayOptions),
    Set(SetOptions),
    Map(MapOptions),
}

impl TypeOptions {
    pub fn name(&self) -> &'static str {
        match self {
            TypeOptions::None => "no",
            TypeOptions::Any(_) => "any",
            TypeOptions::Raw(_) => "raw",
            TypeOptions::String(_) => "string",
            TypeOptions::Number(_) => "number",
            TypeOptions::Enum(_) => "enum",
            TypeOptions::NativeEnum(_) => "nativeEnum",
            TypeOptions::Object(_) => "object",
            TypeOptions::Array(_) => "array",
            TypeOptions::Set(_) => "set",
            TypeOptions::Map(_) => "map",
        }
    }

    /// Classes this field refers to (object type, element, key and value classes).
    pub fn referenced_classes(&self) -> Vec<ClassId> {
        match self {
            TypeOptions::Object(options) => options.class.into_iter().collect(),
            TypeOptions::Array(options) => options.items.into_iter().collect(),
            TypeOptions::Set(options) => options.items.into_iter().collect(),
            TypeOptions::Map(options) => options.keys.into_iter().chain(options.values).collect(),
            _ => Vec::new(),
        }
    }
}

/// Presentation and behavior modifiers applied after the base node is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDetails {
    pub optional: bool,
    pub nullable: bool,
    pub default_value: Option<Value>,
    pub description: Option<String>,
}

impl FieldDetails {
    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Self::default()
        }
    }

    pub fn nullable() -> Self {
        Self {
            nullable: true,
            ..Self::default()
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Index declarations
// ═══════════════════════════════════════════════════════════════════════════════

/// Index direction as declared. Validated into an [`IndexDirection`] when indexes are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionSpec {
    Number(i64),
    Name(String),
}

impl From<i32> for DirectionSpec {
    fn from(value: i32) -> Self {
        DirectionSpec::Number(value.into())
    }
}

impl From<&str> for DirectionSpec {
    fn from(value: &str) -> Self {
        DirectionSpec::Name(value.to_string())
    }
}

impl From<IndexDirection> for DirectionSpec {
    fn from(value: IndexDirection) -> Self {
        match value {
            IndexDirection::Ascending => DirectionSpec::Number(1),
            IndexDirection::Descending => DirectionSpec::Number(-1),
            other => DirectionSpec::Name(other.to_string()),
        }
    }
}

impl fmt::Display for DirectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionSpec::Number(value) => write!(f, "{value}"),
            DirectionSpec::Name(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexDirection {
    Ascending,
    Descending,
    TwoD,
    TwoDSphere,
    Text,
    GeoHaystack,
    Hashed,
}

impl IndexDirection {
    /// Value stored under the index `key`: `1`/`-1` or the index type name.
    pub fn to_json(self) -> Value {
        match self {
            IndexDirection::Ascending => Value::from(1),
            IndexDirection::Descending => Value::from(-1),
            other => Value::String(other.to_string()),
        }
    }
}

impl TryFrom<&DirectionSpec> for IndexDirection {
    type Error = SchemaError;

    fn try_from(spec: &DirectionSpec) -> Result<Self, Self::Error> {
        match spec {
            DirectionSpec::Number(1) => Ok(IndexDirection::Ascending),
            DirectionSpec::Number(-1) => Ok(IndexDirection::Descending),
            DirectionSpec::Name(name) => match name.as_str() {
                "2d" => Ok(IndexDirection::TwoD),
                "2dsphere" => Ok(IndexDirection::TwoDSphere),
                "text" => Ok(IndexDirection::Text),
                "geoHaystack" => Ok(IndexDirection::GeoHaystack),
                "hashed" => Ok(IndexDirection::Hashed),
                _ => Err(SchemaError::InvalidDirection {
                    direction: spec.to_string(),
                }),
            },
            DirectionSpec::Number(_) => Err(SchemaError::InvalidDirection {
                direction: spec.to_string(),
            }),
        }
    }
}

impl fmt::Display for IndexDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexDirection::Ascending => "1",
            IndexDirection::Descending => "-1",
            IndexDirection::TwoD => "2d",
            IndexDirection::TwoDSphere => "2dsphere",
            IndexDirection::Text => "text",
            IndexDirection::GeoHaystack => "geoHaystack",
            IndexDirection::Hashed => "hashed",
        })
    }
}

/// Index intent declared on a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSpec {
    /// Defaults to ascending.
    pub direction: Option<DirectionSpec>,
    pub unique: bool,
    pub sparse: bool,
    /// Recurse into the referenced object class under this field's path.
    pub passthrough: bool,
    /// Skip this field when reached through a parent's pass-through.
    pub exclude: bool,
    pub expire_after_seconds: Option<u64>,
}

impl IndexSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(mut self, direction: impl Into<DirectionSpec>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }

    pub fn passthrough(mut self) -> Self {
        self.passthrough = true;
        self
    }

    pub fn exclude(mut self) -> Self {
        self.exclude = true;
        self
    }

    pub fn expire_after(mut self, seconds: u64) -> Self {
        self.expire_after_seconds = Some(seconds);
        self
    }
}

/// Merged declaration for one (class, field) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub name: String,
    pub type_tag: Option<TypeTag>,
    pub type_options: TypeOptions,
    pub details: Option<FieldDetails>,
    pub index: Option<IndexSpec>,
}

impl FieldDeclaration {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: None,
            type_options: TypeOptions::None,
            details: None,
            index: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_validate_against_known_set() {
        assert_eq!(IndexDirection::try_from(&DirectionSpec::from(1)).ok(), Some(IndexDirection::Ascending));
        assert_eq!(IndexDirection::try_from(&DirectionSpec::from(-1)).ok(), Some(IndexDirection::Descending));
        assert_eq!(IndexDirection::try_from(&DirectionSpec::from("2dsphere")).ok(), Some(IndexDirection::TwoDSphere));
        assert_eq!(IndexDirection::try_from(&DirectionSpec::from("geoHaystack")).ok(), Some(IndexDirection::GeoHaystack));

        for invalid in [DirectionSpec::from(0), DirectionSpec::from(2), DirectionSpec::from("asc")] {
            let err = IndexDirection::try_from(&invalid).expect_err("direction outside the set");
            assert!(matches!(err, SchemaError::InvalidDirection { .. }));
        }
    }

    #[test]
    fn direction_json_values() {
        assert_eq!(IndexDirection::Descending.to_json(), serde_json::json!(-1));
        assert_eq!(IndexDirection::Hashed.to_json(), serde_json::json!("hashed"));
        assert_eq!(DirectionSpec::from(IndexDirection::Text), DirectionSpec::from("text"));
    }

    #[test]
    fn referenced_classes_cover_map_keys_and_values() {
        let options = TypeOptions::Map(MapOptions {
            keys: Some(ClassId::STRING),
            values: Some(ClassId::NUMBER),
        });
        assert_eq!(options.referenced_classes(), vec![ClassId::STRING, ClassId::NUMBER]);
        assert!(TypeOptions::None.referenced_classes().is_empty());
    }

    #[test]
    fn allocated_ids_are_not_builtin() {
        assert!(ClassId::allocate() != ClassId::allocate());
        assert!(!ClassId::allocate().is_builtin());
        assert!(ClassId::LONG.is_builtin());
    }
}
