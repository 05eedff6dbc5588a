use std::collections::BTreeMap;

use serde_json::Value;

use super::{BsonType, BsonTypes, Items, JsonSchema, SchemaOrBool, number};
use crate::errors::SchemaError;
use crate::hint;
use crate::schema::{
    ArraySchema, NativeEnumMember, NativeEnumValue, NumberCheck, NumberSchema, ObjectSchema, SchemaKind, SchemaNode,
    SetSchema, StringCheck, StringSchema, TupleSchema, UnknownKeys,
};

const EMAIL_PATTERN: &str = r#"^(([^<>()[\]\.,;:\s@\"]+(\.[^<>()[\]\.,;:\s@\"]+)*)|(\".+\"))@(([^<>()[\]\.,;:\s@\"]+\.)+[^<>()[\]\.,;:\s@\"]{2,})$"#;
const URL_PATTERN: &str = r"[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&//=]*)";
const UUID_PATTERN: &str =
    r"^([a-f0-9]{8}-[a-f0-9]{4}-[1-5][a-f0-9]{3}-[a-f0-9]{4}-[a-f0-9]{12}|00000000-0000-0000-0000-000000000000)$";
const CUID_PATTERN: &str = r"^c[^\s-]{8,}$";
// No leading or trailing whitespace.
const TRIMMED_PATTERN: &str = r"^(?:\S(?:[\s\S]*\S)?)?$";

/// Translate a validation schema into a MongoDB `$jsonSchema` document.
///
/// Pure structural recursion: nothing is cached, and every call walks `node` again.
/// Refined nodes have no JSON Schema equivalent and fail with
/// [`SchemaError::UnsupportedType`].
pub fn translate(node: &SchemaNode, title: Option<&str>) -> Result<JsonSchema, SchemaError> {
    let mut document = translate_node(node)?;
    if let Some(title) = title {
        document.title = Some(title.to_string());
    }
    Ok(document)
}

fn translate_node(node: &SchemaNode) -> Result<JsonSchema, SchemaError> {
    let (text, type_hint) = match node.description.as_deref() {
        Some(description) => hint::split(description),
        None => (None, None),
    };
    let mut document = translate_kind(&node.kind)?;
    if let Some(type_hint) = type_hint {
        apply_hint(&mut document, type_hint);
    }
    if let Some(text) = text {
        document.description = Some(text.to_string());
    }
    Ok(document)
}

fn translate_kind(kind: &SchemaKind) -> Result<JsonSchema, SchemaError> {
    let document = match kind {
        SchemaKind::Any | SchemaKind::Unknown => JsonSchema::default(),
        SchemaKind::Undefined | SchemaKind::Void | SchemaKind::Never | SchemaKind::NaN => JsonSchema::nothing(),
        SchemaKind::Null => JsonSchema::typed(BsonType::Null),
        SchemaKind::Boolean => JsonSchema::typed(BsonType::Bool),
        SchemaKind::Date => JsonSchema::typed(BsonType::Date),
        SchemaKind::BigInt => JsonSchema::typed(BsonType::Long),
        SchemaKind::ObjectId => JsonSchema::typed(BsonType::ObjectId),
        SchemaKind::String(schema) => translate_string(schema),
        SchemaKind::Number(schema) => translate_number(schema),
        SchemaKind::Literal(value) => JsonSchema {
            enum_values: Some(vec![value.clone()]),
            ..JsonSchema::default()
        },
        SchemaKind::Enum(values) => JsonSchema {
            enum_values: Some(values.iter().cloned().map(Value::String).collect()),
            ..JsonSchema::typed(BsonType::String)
        },
        SchemaKind::NativeEnum(members) => translate_native_enum(members),
        SchemaKind::Object(schema) => translate_object(schema)?,
        SchemaKind::Record { value, .. } => {
            let value = translate_node(value)?;
            JsonSchema {
                additional_properties: Some(if value.is_empty() {
                    SchemaOrBool::Bool(true)
                } else {
                    SchemaOrBool::Schema(Box::new(value))
                }),
                ..JsonSchema::typed(BsonType::Object)
            }
        }
        SchemaKind::Array(schema) => translate_array(schema)?,
        SchemaKind::Tuple(schema) => translate_tuple(schema)?,
        SchemaKind::Set(schema) => translate_set(schema)?,
        SchemaKind::Map { key, value } => translate_map(key, value)?,
        SchemaKind::Union(branches) => translate_union(branches)?,
        SchemaKind::Intersection(left, right) => JsonSchema {
            all_of: Some(vec![translate_node(left)?, translate_node(right)?]),
            ..JsonSchema::default()
        },
        // The default value itself is not representable.
        SchemaKind::Default { inner, .. } => translate_node(inner)?,
        SchemaKind::Optional(inner) => JsonSchema {
            any_of: Some(vec![translate_node(inner)?, JsonSchema::nothing()]),
            ..JsonSchema::default()
        },
        SchemaKind::Nullable(inner) => translate_nullable(inner)?,
        SchemaKind::Refined(..) => {
            return Err(SchemaError::UnsupportedType {
                kind: kind.name().to_string(),
            });
        }
    };
    Ok(document)
}

/// A hint always wins for `bsonType`; a nullable collapse keeps its `null` alternative.
fn apply_hint(document: &mut JsonSchema, type_hint: BsonType) {
    let nullable = matches!(&document.bson_type, Some(BsonTypes::Many(types)) if types.contains(&BsonType::Null));
    document.bson_type = Some(if nullable && type_hint != BsonType::Null {
        BsonTypes::Many(vec![type_hint, BsonType::Null])
    } else {
        type_hint.into()
    });
}

/// Node kinds with a direct `bsonType` equivalent.
fn primitive_type(kind: &SchemaKind) -> Option<BsonType> {
    match kind {
        SchemaKind::String(_) => Some(BsonType::String),
        SchemaKind::Number(_) => Some(BsonType::Number),
        SchemaKind::BigInt => Some(BsonType::Long),
        SchemaKind::ObjectId => Some(BsonType::ObjectId),
        SchemaKind::Boolean => Some(BsonType::Bool),
        SchemaKind::Date => Some(BsonType::Date),
        SchemaKind::Null => Some(BsonType::Null),
        _ => None,
    }
}

fn translate_nullable(inner: &SchemaNode) -> Result<JsonSchema, SchemaError> {
    if primitive_type(&inner.kind).is_none() {
        return Ok(JsonSchema {
            any_of: Some(vec![translate_node(inner)?, JsonSchema::typed(BsonType::Null)]),
            ..JsonSchema::default()
        });
    }
    let mut document = translate_node(inner)?;
    let mut types = document.bson_type.take().map(|types| types.to_vec()).unwrap_or_default();
    push_unique(&mut types, BsonType::Null);
    document.bson_type = Some(BsonTypes::from_list(types));
    Ok(document)
}

fn translate_union(branches: &[SchemaNode]) -> Result<JsonSchema, SchemaError> {
    if branches.is_empty() {
        return Ok(JsonSchema::nothing());
    }

    // Constraint-free primitives collapse into a list of types.
    let plain_types: Option<Vec<BsonType>> = branches
        .iter()
        .map(|branch| {
            let unconstrained = match &branch.kind {
                SchemaKind::String(schema) => schema.checks.is_empty(),
                SchemaKind::Number(schema) => schema.checks.is_empty(),
                _ => true,
            };
            let base = primitive_type(&branch.kind).filter(|_| unconstrained)?;
            Some(hint::of(branch.description.as_deref()).unwrap_or(base))
        })
        .collect();
    if let Some(plain_types) = plain_types {
        let mut types = Vec::new();
        for bson_type in plain_types {
            push_unique(&mut types, bson_type);
        }
        return Ok(JsonSchema::typed(BsonTypes::from_list(types)));
    }

    // Literals collapse into an enum tagged with their types.
    let literals: Option<Vec<(&Value, BsonType)>> = branches
        .iter()
        .map(|branch| match &branch.kind {
            SchemaKind::Literal(value) => literal_type(value).map(|bson_type| (value, bson_type)),
            _ => None,
        })
        .collect();
    if let Some(literals) = literals {
        let mut types = Vec::new();
        let mut values = Vec::new();
        for (value, bson_type) in literals {
            push_unique(&mut types, bson_type);
            push_unique(&mut values, value.clone());
        }
        return Ok(JsonSchema {
            enum_values: Some(values),
            ..JsonSchema::typed(BsonTypes::from_list(types))
        });
    }

    if branches.iter().all(|branch| matches!(branch.kind, SchemaKind::Enum(_))) {
        let mut values = Vec::new();
        for branch in branches {
            if let SchemaKind::Enum(allowed) = &branch.kind {
                for value in allowed {
                    push_unique(&mut values, Value::String(value.clone()));
                }
            }
        }
        return Ok(JsonSchema {
            enum_values: Some(values),
            ..JsonSchema::typed(BsonType::String)
        });
    }

    Ok(JsonSchema {
        any_of: Some(branches.iter().map(translate_node).collect::<Result<_, _>>()?),
        ..JsonSchema::default()
    })
}

fn literal_type(value: &Value) -> Option<BsonType> {
    match value {
        Value::String(_) => Some(BsonType::String),
        Value::Number(_) => Some(BsonType::Number),
        Value::Bool(_) => Some(BsonType::Bool),
        Value::Null => Some(BsonType::Null),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn translate_native_enum(members: &[NativeEnumMember]) -> JsonSchema {
    let numeric = members
        .iter()
        .filter(|member| matches!(member.value, NativeEnumValue::Number(_)))
        .count();
    let bson_type = if numeric == 0 {
        BsonTypes::Single(BsonType::String)
    } else if numeric == members.len() {
        BsonTypes::Single(BsonType::Number)
    } else {
        BsonTypes::Many(vec![BsonType::String, BsonType::Number])
    };
    JsonSchema {
        enum_values: Some(members.iter().map(|member| member.value.to_json()).collect()),
        ..JsonSchema::typed(bson_type)
    }
}

fn translate_string(schema: &StringSchema) -> JsonSchema {
    let mut document = JsonSchema::typed(BsonType::String);
    let mut patterns: Vec<String> = Vec::new();
    for check in &schema.checks {
        let pattern = match check {
            StringCheck::Min(length) => {
                document.min_length = Some(*length);
                continue;
            }
            StringCheck::Max(length) => {
                document.max_length = Some(*length);
                continue;
            }
            StringCheck::Regex(pattern) => pattern.as_str().to_string(),
            StringCheck::Email => EMAIL_PATTERN.to_string(),
            StringCheck::Url => URL_PATTERN.to_string(),
            StringCheck::Uuid => UUID_PATTERN.to_string(),
            StringCheck::Cuid => CUID_PATTERN.to_string(),
            StringCheck::StartsWith(prefix) => format!("^{}", regex::escape(prefix)),
            StringCheck::EndsWith(suffix) => format!("{}$", regex::escape(suffix)),
            StringCheck::Trim => TRIMMED_PATTERN.to_string(),
        };
        push_unique(&mut patterns, pattern);
    }
    match patterns.len() {
        0 => {}
        1 => document.pattern = patterns.pop(),
        _ => {
            document.all_of = Some(
                patterns
                    .into_iter()
                    .map(|pattern| JsonSchema {
                        pattern: Some(pattern),
                        ..JsonSchema::default()
                    })
                    .collect(),
            )
        }
    }
    document
}

fn translate_number(schema: &NumberSchema) -> JsonSchema {
    let mut document = JsonSchema::typed(BsonType::Number);
    for check in &schema.checks {
        match check {
            NumberCheck::Int => document.bson_type = Some(BsonType::Int.into()),
            NumberCheck::Min { value, inclusive } => {
                document.minimum = number(*value);
                document.exclusive_minimum = (!inclusive).then_some(true);
            }
            NumberCheck::Max { value, inclusive } => {
                document.maximum = number(*value);
                document.exclusive_maximum = (!inclusive).then_some(true);
            }
            NumberCheck::MultipleOf(value) => document.multiple_of = number(*value),
        }
    }
    document
}

fn translate_object(schema: &ObjectSchema) -> Result<JsonSchema, SchemaError> {
    let mut document = JsonSchema::typed(BsonType::Object);
    let mut properties = BTreeMap::new();
    let mut required = Vec::new();
    for (key, node) in schema.shape.iter() {
        properties.insert(key.to_string(), translate_node(node)?);
        if !node.accepts_missing() {
            required.push(key.to_string());
        }
    }
    if !properties.is_empty() {
        document.properties = Some(properties);
    }
    if !required.is_empty() {
        document.required = Some(required);
    }

    document.additional_properties = match (&schema.catchall, schema.unknown_keys) {
        (Some(catchall), _) => {
            let extra = translate_node(catchall)?;
            (!extra.is_empty()).then(|| SchemaOrBool::Schema(Box::new(extra)))
        }
        (None, UnknownKeys::Passthrough) => None,
        (None, UnknownKeys::Strict | UnknownKeys::Strip) => Some(SchemaOrBool::Bool(false)),
    };
    Ok(document)
}

/// Element document, `None` when it would match anything.
fn element_items(element: &SchemaNode) -> Result<Option<Items>, SchemaError> {
    let items = translate_node(element)?;
    Ok((!items.is_empty()).then(|| Items::Single(Box::new(items))))
}

fn translate_array(schema: &ArraySchema) -> Result<JsonSchema, SchemaError> {
    Ok(JsonSchema {
        items: element_items(&schema.element)?,
        min_items: schema.min_items,
        max_items: schema.max_items,
        ..JsonSchema::typed(BsonType::Array)
    })
}

fn translate_set(schema: &SetSchema) -> Result<JsonSchema, SchemaError> {
    Ok(JsonSchema {
        items: element_items(&schema.element)?,
        min_items: schema.min_size,
        max_items: schema.max_size,
        unique_items: Some(true),
        ..JsonSchema::typed(BsonType::Array)
    })
}

fn translate_tuple(schema: &TupleSchema) -> Result<JsonSchema, SchemaError> {
    let items = schema.items.iter().map(translate_node).collect::<Result<Vec<_>, _>>()?;
    let fixed = items.len();
    let mut document = JsonSchema {
        items: Some(Items::Tuple(items)),
        min_items: Some(fixed),
        ..JsonSchema::typed(BsonType::Array)
    };
    match &schema.rest {
        Some(rest) => document.additional_items = Some(SchemaOrBool::Schema(Box::new(translate_node(rest)?))),
        None => {
            document.additional_items = Some(SchemaOrBool::Bool(false));
            document.max_items = Some(fixed);
        }
    }
    Ok(document)
}

/// Maps are stored as arrays of `[key, value]` pairs.
fn translate_map(key: &SchemaNode, value: &SchemaNode) -> Result<JsonSchema, SchemaError> {
    let key = translate_node(key)?;
    let value = translate_node(value)?;
    let pair = JsonSchema {
        items: (!(key.is_empty() && value.is_empty())).then(|| Items::Tuple(vec![key, value])),
        min_items: Some(2),
        max_items: Some(2),
        ..JsonSchema::typed(BsonType::Array)
    };
    Ok(JsonSchema {
        items: Some(Items::Single(Box::new(pair))),
        ..JsonSchema::typed(BsonType::Array)
    })
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}
