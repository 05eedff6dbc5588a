//! Validation schema tree.
//!
//! A [`SchemaNode`] describes the accepted shape of a JSON document. Nodes are built by the
//! schema builder from field declarations (or by hand for `raw` fields), validated against
//! runtime values with [`SchemaNode::parse`] / [`SchemaNode::safe_parse`], and translated into
//! MongoDB `$jsonSchema` documents by [`crate::json_schema::translate`].
//!
//! Modifiers wrap the node they apply to, so a field declared optional, nullable and with a
//! default becomes `Default(Nullable(Optional(base)))`.

mod parse;

use std::fmt;

use regex::Regex;
use serde_json::Value;

pub use parse::SafeParse;

/// One node of the validation schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    /// Human readable description. May end with a `[bsonType:<name>]` type hint.
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Any,
    Unknown,
    Undefined,
    Void,
    Never,
    NaN,
    Null,
    Boolean,
    Date,
    BigInt,
    /// 24-digit hex string or extended JSON `{"$oid": ...}`. Absence is accepted.
    ObjectId,
    String(StringSchema),
    Number(NumberSchema),
    Literal(Value),
    Enum(Vec<String>),
    NativeEnum(Vec<NativeEnumMember>),
    Object(ObjectSchema),
    Record {
        key: Box<SchemaNode>,
        value: Box<SchemaNode>,
    },
    Array(ArraySchema),
    Tuple(TupleSchema),
    Set(SetSchema),
    Map {
        key: Box<SchemaNode>,
        value: Box<SchemaNode>,
    },
    Union(Vec<SchemaNode>),
    Intersection(Box<SchemaNode>, Box<SchemaNode>),
    Optional(Box<SchemaNode>),
    Nullable(Box<SchemaNode>),
    Default {
        inner: Box<SchemaNode>,
        value: Value,
    },
    /// Inner schema plus an arbitrary predicate. Has no `$jsonSchema` equivalent.
    Refined(Box<SchemaNode>, Refinement),
}

impl SchemaKind {
    /// Stable lowercase name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::Any => "any",
            SchemaKind::Unknown => "unknown",
            SchemaKind::Undefined => "undefined",
            SchemaKind::Void => "void",
            SchemaKind::Never => "never",
            SchemaKind::NaN => "nan",
            SchemaKind::Null => "null",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Date => "date",
            SchemaKind::BigInt => "bigint",
            SchemaKind::ObjectId => "objectId",
            SchemaKind::String(_) => "string",
            SchemaKind::Number(_) => "number",
            SchemaKind::Literal(_) => "literal",
            SchemaKind::Enum(_) => "enum",
            SchemaKind::NativeEnum(_) => "nativeEnum",
            SchemaKind::Object(_) => "object",
            SchemaKind::Record { .. } => "record",
            SchemaKind::Array(_) => "array",
            SchemaKind::Tuple(_) => "tuple",
            SchemaKind::Set(_) => "set",
            SchemaKind::Map { .. } => "map",
            SchemaKind::Union(_) => "union",
            SchemaKind::Intersection(..) => "intersection",
            SchemaKind::Optional(_) => "optional",
            SchemaKind::Nullable(_) => "nullable",
            SchemaKind::Default { .. } => "default",
            SchemaKind::Refined(..) => "refined",
        }
    }
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    pub fn unknown() -> Self {
        Self::new(SchemaKind::Unknown)
    }

    pub fn never() -> Self {
        Self::new(SchemaKind::Never)
    }

    pub fn null() -> Self {
        Self::new(SchemaKind::Null)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn date() -> Self {
        Self::new(SchemaKind::Date)
    }

    pub fn big_int() -> Self {
        Self::new(SchemaKind::BigInt)
    }

    pub fn object_id() -> Self {
        Self::new(SchemaKind::ObjectId)
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String(StringSchema::default()))
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number(NumberSchema::default()))
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(SchemaKind::Literal(value.into()))
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn native_enum(members: impl IntoIterator<Item = NativeEnumMember>) -> Self {
        Self::new(SchemaKind::NativeEnum(members.into_iter().collect()))
    }

    pub fn object(schema: ObjectSchema) -> Self {
        Self::new(SchemaKind::Object(schema))
    }

    /// Object without declared properties that keeps every key it receives.
    pub fn passthrough_object() -> Self {
        Self::object(ObjectSchema::new().passthrough())
    }

    pub fn record(key: SchemaNode, value: SchemaNode) -> Self {
        Self::new(SchemaKind::Record {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn array(element: SchemaNode) -> Self {
        Self::new(SchemaKind::Array(ArraySchema::new(element)))
    }

    pub fn tuple(items: impl IntoIterator<Item = SchemaNode>) -> Self {
        Self::new(SchemaKind::Tuple(TupleSchema {
            items: items.into_iter().collect(),
            rest: None,
        }))
    }

    pub fn set(element: SchemaNode) -> Self {
        Self::new(SchemaKind::Set(SetSchema::new(element)))
    }

    pub fn map(key: SchemaNode, value: SchemaNode) -> Self {
        Self::new(SchemaKind::Map {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn union(branches: impl IntoIterator<Item = SchemaNode>) -> Self {
        Self::new(SchemaKind::Union(branches.into_iter().collect()))
    }

    pub fn intersection(left: SchemaNode, right: SchemaNode) -> Self {
        Self::new(SchemaKind::Intersection(Box::new(left), Box::new(right)))
    }

    /// Wrap so that an absent value is accepted.
    pub fn optional(self) -> Self {
        Self::new(SchemaKind::Optional(Box::new(self)))
    }

    /// Wrap so that `null` is accepted.
    pub fn nullable(self) -> Self {
        Self::new(SchemaKind::Nullable(Box::new(self)))
    }

    /// Wrap so that an absent value is replaced by `value` before validation.
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        Self::new(SchemaKind::Default {
            inner: Box::new(self),
            value: value.into(),
        })
    }

    /// Wrap with a named predicate evaluated after the inner schema accepted the value.
    pub fn refine(self, message: impl Into<String>, check: fn(&Value) -> bool) -> Self {
        Self::new(SchemaKind::Refined(Box::new(self), Refinement::new(message, check)))
    }

    /// Replace the description of this node.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether a missing key satisfies this schema.
    ///
    /// Optional and default wrappers, `any`/`unknown`, and `undefined`/`void` accept absence,
    /// which is what decides membership in an object's `required` list.
    pub fn accepts_missing(&self) -> bool {
        match &self.kind {
            SchemaKind::Optional(_)
            | SchemaKind::Default { .. }
            | SchemaKind::Any
            | SchemaKind::Unknown
            | SchemaKind::ObjectId
            | SchemaKind::Undefined
            | SchemaKind::Void => true,
            SchemaKind::Nullable(inner) | SchemaKind::Refined(inner, _) => inner.accepts_missing(),
            SchemaKind::Union(branches) => branches.iter().any(SchemaNode::accepts_missing),
            SchemaKind::Intersection(left, right) => left.accepts_missing() && right.accepts_missing(),
            _ => false,
        }
    }

    /// Object body of this node, if it is an object node.
    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl From<StringSchema> for SchemaNode {
    fn from(schema: StringSchema) -> Self {
        SchemaNode::new(SchemaKind::String(schema))
    }
}

impl From<NumberSchema> for SchemaNode {
    fn from(schema: NumberSchema) -> Self {
        SchemaNode::new(SchemaKind::Number(schema))
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(schema: ObjectSchema) -> Self {
        SchemaNode::object(schema)
    }
}

impl From<ArraySchema> for SchemaNode {
    fn from(schema: ArraySchema) -> Self {
        SchemaNode::new(SchemaKind::Array(schema))
    }
}

impl From<SetSchema> for SchemaNode {
    fn from(schema: SetSchema) -> Self {
        SchemaNode::new(SchemaKind::Set(schema))
    }
}

impl From<TupleSchema> for SchemaNode {
    fn from(schema: TupleSchema) -> Self {
        SchemaNode::new(SchemaKind::Tuple(schema))
    }
}

/// Compiled regular expression compared by its source.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self(regex)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StringCheck {
    Min(usize),
    Max(usize),
    Regex(Pattern),
    Email,
    Url,
    Uuid,
    Cuid,
    StartsWith(String),
    EndsWith(String),
    /// Trims surrounding whitespace before later checks run.
    Trim,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    pub checks: Vec<StringCheck>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, check: StringCheck) -> Self {
        self.checks.push(check);
        self
    }

    pub fn min(self, length: usize) -> Self {
        self.with(StringCheck::Min(length))
    }

    pub fn max(self, length: usize) -> Self {
        self.with(StringCheck::Max(length))
    }

    pub fn regex(self, pattern: impl Into<Pattern>) -> Self {
        self.with(StringCheck::Regex(pattern.into()))
    }

    pub fn email(self) -> Self {
        self.with(StringCheck::Email)
    }

    pub fn url(self) -> Self {
        self.with(StringCheck::Url)
    }

    pub fn uuid(self) -> Self {
        self.with(StringCheck::Uuid)
    }

    pub fn cuid(self) -> Self {
        self.with(StringCheck::Cuid)
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        self.with(StringCheck::StartsWith(prefix.into()))
    }

    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        self.with(StringCheck::EndsWith(suffix.into()))
    }

    pub fn trim(self) -> Self {
        self.with(StringCheck::Trim)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumberCheck {
    Int,
    Min { value: f64, inclusive: bool },
    Max { value: f64, inclusive: bool },
    MultipleOf(f64),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    pub checks: Vec<NumberCheck>,
}

impl NumberSchema {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, check: NumberCheck) -> Self {
        self.checks.push(check);
        self
    }

    pub fn int(self) -> Self {
        self.with(NumberCheck::Int)
    }

    pub fn gte(self, value: f64) -> Self {
        self.with(NumberCheck::Min { value, inclusive: true })
    }

    pub fn gt(self, value: f64) -> Self {
        self.with(NumberCheck::Min { value, inclusive: false })
    }

    pub fn lte(self, value: f64) -> Self {
        self.with(NumberCheck::Max { value, inclusive: true })
    }

    pub fn lt(self, value: f64) -> Self {
        self.with(NumberCheck::Max { value, inclusive: false })
    }

    pub fn multiple_of(self, value: f64) -> Self {
        self.with(NumberCheck::MultipleOf(value))
    }

    pub fn is_int(&self) -> bool {
        self.checks.iter().any(|check| matches!(check, NumberCheck::Int))
    }
}

/// Value of a native enum member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEnumValue {
    String(String),
    Number(i64),
}

impl NativeEnumValue {
    pub fn to_json(&self) -> Value {
        match self {
            NativeEnumValue::String(value) => Value::String(value.clone()),
            NativeEnumValue::Number(value) => Value::from(*value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeEnumMember {
    pub name: String,
    pub value: NativeEnumValue,
}

impl NativeEnumMember {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: NativeEnumValue::String(value.into()),
        }
    }

    pub fn number(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value: NativeEnumValue::Number(value),
        }
    }
}

/// Handling of keys that are not part of an object's declared shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Drop unknown keys from the parsed value.
    #[default]
    Strip,
    /// Reject values carrying unknown keys.
    Strict,
    /// Keep unknown keys untouched.
    Passthrough,
}

/// Ordered property map. Inserting an existing key replaces the node in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape(Vec<(String, SchemaNode)>);

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, node: SchemaNode) {
        let key = key.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = node,
            None => self.0.push((key, node)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.0.iter().find(|(existing, _)| existing == key).map(|(_, node)| node)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.0.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert every entry of `other`, replacing nodes at keys that already exist.
    pub fn extend(&mut self, other: &Shape) {
        for (key, node) in other.iter() {
            self.insert(key, node.clone());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub shape: Shape,
    pub unknown_keys: UnknownKeys,
    /// Schema applied to every undeclared key; overrides `unknown_keys` when set.
    pub catchall: Option<Box<SchemaNode>>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shape(shape: Shape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    pub fn property(mut self, key: impl Into<String>, node: SchemaNode) -> Self {
        self.shape.insert(key, node);
        self
    }

    pub fn strict(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Strict;
        self
    }

    pub fn passthrough(mut self) -> Self {
        self.unknown_keys = UnknownKeys::Passthrough;
        self
    }

    pub fn catchall(mut self, node: SchemaNode) -> Self {
        self.catchall = Some(Box::new(node));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub element: Box<SchemaNode>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

impl ArraySchema {
    pub fn new(element: SchemaNode) -> Self {
        Self {
            element: Box::new(element),
            min_items: None,
            max_items: None,
        }
    }

    pub fn min(mut self, items: usize) -> Self {
        self.min_items = Some(items);
        self
    }

    pub fn max(mut self, items: usize) -> Self {
        self.max_items = Some(items);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetSchema {
    pub element: Box<SchemaNode>,
    pub min_size: Option<usize>,
    pub max_size: Option<usize>,
}

impl SetSchema {
    pub fn new(element: SchemaNode) -> Self {
        Self {
            element: Box::new(element),
            min_size: None,
            max_size: None,
        }
    }

    pub fn min(mut self, size: usize) -> Self {
        self.min_size = Some(size);
        self
    }

    pub fn max(mut self, size: usize) -> Self {
        self.max_size = Some(size);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleSchema {
    pub items: Vec<SchemaNode>,
    /// Schema for any elements past the fixed items.
    pub rest: Option<Box<SchemaNode>>,
}

impl TupleSchema {
    pub fn new(items: impl IntoIterator<Item = SchemaNode>) -> Self {
        Self {
            items: items.into_iter().collect(),
            rest: None,
        }
    }

    pub fn rest(mut self, node: SchemaNode) -> Self {
        self.rest = Some(Box::new(node));
        self
    }
}

/// Named predicate attached by [`SchemaNode::refine`].
#[derive(Clone)]
pub struct Refinement {
    pub message: String,
    pub check: fn(&Value) -> bool,
}

impl Refinement {
    pub fn new(message: impl Into<String>, check: fn(&Value) -> bool) -> Self {
        Self {
            message: message.into(),
            check,
        }
    }
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement").field("message", &self.message).finish_non_exhaustive()
    }
}

impl PartialEq for Refinement {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}
