//! MongoDB `$jsonSchema` documents.
//!
//! [`JsonSchema`] models the subset of JSON Schema draft 4 that MongoDB accepts as a
//! collection validator, with `bsonType` in place of `type`. Documents are produced from
//! validation schemas by [`translate`] and serialized with serde.

mod translate;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Number, Value};

use crate::errors::SchemaError;

pub use translate::translate;

/// BSON type names accepted by `bsonType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BsonType {
    Array,
    BinData,
    Bool,
    Date,
    Decimal,
    Double,
    Int,
    Javascript,
    JavascriptWithScope,
    Long,
    MaxKey,
    MinKey,
    Null,
    Number,
    Object,
    ObjectId,
    Regex,
    String,
    Timestamp,
}

impl BsonType {
    const ALL: [BsonType; 19] = [
        BsonType::Array,
        BsonType::BinData,
        BsonType::Bool,
        BsonType::Date,
        BsonType::Decimal,
        BsonType::Double,
        BsonType::Int,
        BsonType::Javascript,
        BsonType::JavascriptWithScope,
        BsonType::Long,
        BsonType::MaxKey,
        BsonType::MinKey,
        BsonType::Null,
        BsonType::Number,
        BsonType::Object,
        BsonType::ObjectId,
        BsonType::Regex,
        BsonType::String,
        BsonType::Timestamp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BsonType::Array => "array",
            BsonType::BinData => "binData",
            BsonType::Bool => "bool",
            BsonType::Date => "date",
            BsonType::Decimal => "decimal",
            BsonType::Double => "double",
            BsonType::Int => "int",
            BsonType::Javascript => "javascript",
            BsonType::JavascriptWithScope => "javascriptWithScope",
            BsonType::Long => "long",
            BsonType::MaxKey => "maxKey",
            BsonType::MinKey => "minKey",
            BsonType::Null => "null",
            BsonType::Number => "number",
            BsonType::Object => "object",
            BsonType::ObjectId => "objectId",
            BsonType::Regex => "regex",
            BsonType::String => "string",
            BsonType::Timestamp => "timestamp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bson_type| bson_type.as_str() == name)
    }
}

/// A single `bsonType` or a list of alternatives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BsonTypes {
    Single(BsonType),
    Many(Vec<BsonType>),
}

impl BsonTypes {
    /// `Single` for one entry, `Many` otherwise.
    pub fn from_list(mut types: Vec<BsonType>) -> Self {
        if types.len() == 1 {
            BsonTypes::Single(types.remove(0))
        } else {
            BsonTypes::Many(types)
        }
    }

    pub fn to_vec(&self) -> Vec<BsonType> {
        match self {
            BsonTypes::Single(bson_type) => vec![*bson_type],
            BsonTypes::Many(types) => types.clone(),
        }
    }
}

impl From<BsonType> for BsonTypes {
    fn from(bson_type: BsonType) -> Self {
        BsonTypes::Single(bson_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Items {
    Single(Box<JsonSchema>),
    Tuple(Vec<JsonSchema>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SchemaOrBool {
    Bool(bool),
    Schema(Box<JsonSchema>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bson_type: Option<BsonTypes>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<SchemaOrBool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<SchemaOrBool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<JsonSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<JsonSchema>>,
}

impl JsonSchema {
    pub fn typed(bson_type: impl Into<BsonTypes>) -> Self {
        Self {
            bson_type: Some(bson_type.into()),
            ..Self::default()
        }
    }

    /// `{not: {}}`: matches nothing.
    pub fn nothing() -> Self {
        Self {
            not: Some(Box::default()),
            ..Self::default()
        }
    }

    /// True for `{}`, the document that matches anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_value(&self) -> Result<Value, SchemaError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// JSON number for a bound, integral when the value has no fraction.
pub(crate) fn number(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_mongo_keywords() {
        let schema = JsonSchema {
            bson_type: Some(BsonTypes::Many(vec![BsonType::ObjectId, BsonType::Null])),
            enum_values: Some(vec![json!(1)]),
            min_items: Some(2),
            additional_properties: Some(SchemaOrBool::Bool(false)),
            ..JsonSchema::default()
        };
        assert_eq!(
            schema.to_value().expect("serializable"),
            json!({
                "bsonType": ["objectId", "null"],
                "enum": [1],
                "minItems": 2,
                "additionalProperties": false,
            })
        );
    }

    #[test]
    fn empty_and_nothing() {
        assert!(JsonSchema::default().is_empty());
        assert_eq!(JsonSchema::nothing().to_value().expect("serializable"), json!({ "not": {} }));
    }

    #[test]
    fn bson_type_names_round_trip() {
        for bson_type in BsonType::ALL {
            assert_eq!(BsonType::from_name(bson_type.as_str()), Some(bson_type));
            assert_eq!(serde_json::to_value(bson_type).expect("serializable"), json!(bson_type.as_str()));
        }
        assert_eq!(BsonType::from_name("boolean"), None);
    }

    #[test]
    fn numbers_prefer_integers() {
        assert_eq!(number(5.0), Some(Number::from(5)));
        assert_eq!(number(-2.0), Some(Number::from(-2)));
        assert_eq!(number(0.5).and_then(|n| n.as_f64()), Some(0.5));
        assert_eq!(number(f64::NAN), None);
    }
}
