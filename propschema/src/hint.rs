//! The `[bsonType:<name>]` marker.
//!
//! Validation nodes cannot express BSON-only types such as `objectId` or `decimal`, so the
//! type travels at the end of the node's description and is recovered during translation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::json_schema::BsonType;

static HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[bsonType:(\w+)\]$").expect("valid hint pattern"));

/// Marker text for `bson_type`.
pub fn marker(bson_type: BsonType) -> String {
    format!("[bsonType:{}]", bson_type.as_str())
}

/// Append the marker for `bson_type` to `text`.
pub fn compose(text: &str, bson_type: BsonType) -> String {
    format!("{text}{}", marker(bson_type))
}

/// Split a description into its human readable text and trailing type hint.
///
/// Markers naming an unknown BSON type are left in the text. An empty remainder becomes `None`.
pub fn split(description: &str) -> (Option<&str>, Option<BsonType>) {
    let found = HINT.captures(description).and_then(|captures| {
        let whole = captures.get(0)?;
        let bson_type = BsonType::from_name(captures.get(1)?.as_str())?;
        Some((whole.start(), bson_type))
    });
    match found {
        Some((start, bson_type)) => (non_empty(&description[..start]), Some(bson_type)),
        None => (non_empty(description), None),
    }
}

/// Type hint carried by an optional description.
pub fn of(description: Option<&str>) -> Option<BsonType> {
    description.and_then(|description| split(description).1)
}

fn non_empty(text: &str) -> Option<&str> {
    (!text.is_empty()).then_some(text)
}
