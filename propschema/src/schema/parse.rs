use chrono::DateTime;
use serde_json::{Map, Value};

use super::{NumberCheck, NumberSchema, ObjectSchema, SchemaKind, SchemaNode, StringCheck, StringSchema, UnknownKeys};
use crate::errors::{ValidationError, ValidationIssue, ValidationResult};
use crate::validators::{is_valid_cuid, is_valid_email, is_valid_object_id, is_valid_url, is_valid_uuid};

/// Outcome of [`SchemaNode::safe_parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum SafeParse {
    Success(Value),
    Failure(ValidationError),
}

impl SafeParse {
    pub fn is_success(&self) -> bool {
        matches!(self, SafeParse::Success(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            SafeParse::Success(value) => Some(value),
            SafeParse::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            SafeParse::Success(_) => None,
            SafeParse::Failure(error) => Some(error),
        }
    }

    pub fn into_result(self) -> ValidationResult<Value> {
        match self {
            SafeParse::Success(value) => Ok(value),
            SafeParse::Failure(error) => Err(error),
        }
    }
}

impl SchemaNode {
    /// Validate `value`, returning it conformed to the schema (defaults applied, unknown
    /// keys stripped, strings trimmed) or every issue found.
    pub fn parse(&self, value: &Value) -> ValidationResult<Value> {
        let mut issues = Vec::new();
        let parsed = self.check(Some(value), "", &mut issues);
        if issues.is_empty() {
            Ok(parsed.unwrap_or(Value::Null))
        } else {
            Err(ValidationError::new(issues))
        }
    }

    /// Like [`SchemaNode::parse`] but captures the failure in the returned value.
    pub fn safe_parse(&self, value: &Value) -> SafeParse {
        match self.parse(value) {
            Ok(value) => SafeParse::Success(value),
            Err(error) => SafeParse::Failure(error),
        }
    }

    /// `None` for `value` means the key was absent; a `None` result means the key stays absent.
    fn check(&self, value: Option<&Value>, path: &str, issues: &mut Vec<ValidationIssue>) -> Option<Value> {
        match &self.kind {
            SchemaKind::Optional(inner) => value.and_then(|value| inner.check(Some(value), path, issues)),
            SchemaKind::Default { inner, value: default } => inner.check(Some(value.unwrap_or(default)), path, issues),
            SchemaKind::Nullable(inner) => match value {
                Some(Value::Null) => Some(Value::Null),
                other => inner.check(other, path, issues),
            },
            SchemaKind::Any | SchemaKind::Unknown => value.cloned(),
            SchemaKind::ObjectId => value.and_then(|value| check_object_id(value, path, issues)),
            SchemaKind::Undefined | SchemaKind::Void => {
                if let Some(value) = value {
                    issues.push(type_issue(path, "undefined", value));
                }
                None
            }
            _ => match value {
                Some(value) => self.check_present(value, path, issues),
                None => {
                    issues.push(ValidationIssue::new(path, "validation.required", "value is required"));
                    None
                }
            },
        }
    }

    fn check_present(&self, value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) -> Option<Value> {
        match &self.kind {
            SchemaKind::Never => {
                issues.push(ValidationIssue::new(path, "validation.never", "no value is allowed here"));
                None
            }
            SchemaKind::NaN => {
                issues.push(type_issue(path, "nan", value));
                None
            }
            SchemaKind::Null => expect(value.is_null(), path, "null", value, issues),
            SchemaKind::Boolean => expect(value.is_boolean(), path, "boolean", value, issues),
            SchemaKind::BigInt => expect(value.is_i64() || value.is_u64(), path, "bigint", value, issues),
            SchemaKind::Date => match value.as_str() {
                Some(raw) if DateTime::parse_from_rfc3339(raw).is_ok() => Some(value.clone()),
                Some(_) => {
                    issues.push(ValidationIssue::new(path, "validation.date", "value must be an RFC 3339 date"));
                    None
                }
                None => {
                    issues.push(type_issue(path, "date", value));
                    None
                }
            },
            SchemaKind::String(schema) => match value.as_str() {
                Some(raw) => check_string(schema, raw, path, issues).map(Value::String),
                None => {
                    issues.push(type_issue(path, "string", value));
                    None
                }
            },
            SchemaKind::Number(schema) => match value.as_f64() {
                Some(number) => {
                    check_number(schema, number, path, issues);
                    Some(value.clone())
                }
                None => {
                    issues.push(type_issue(path, "number", value));
                    None
                }
            },
            SchemaKind::Literal(expected) => {
                if value == expected {
                    Some(value.clone())
                } else {
                    issues.push(ValidationIssue::new(
                        path,
                        "validation.literal",
                        format!("value must be {expected}"),
                    ));
                    None
                }
            }
            SchemaKind::Enum(allowed) => match value.as_str() {
                Some(raw) if allowed.iter().any(|candidate| candidate == raw) => Some(value.clone()),
                _ => {
                    issues.push(ValidationIssue::new(
                        path,
                        "validation.enum",
                        format!("value must be one of {allowed:?}"),
                    ));
                    None
                }
            },
            SchemaKind::NativeEnum(members) => {
                if members.iter().any(|member| member.value.to_json() == *value) {
                    Some(value.clone())
                } else {
                    let allowed: Vec<Value> = members.iter().map(|member| member.value.to_json()).collect();
                    issues.push(ValidationIssue::new(
                        path,
                        "validation.enum",
                        format!("value must be one of {}", Value::Array(allowed)),
                    ));
                    None
                }
            }
            SchemaKind::Object(schema) => match value.as_object() {
                Some(fields) => check_object(schema, fields, path, issues).map(Value::Object),
                None => {
                    issues.push(type_issue(path, "object", value));
                    None
                }
            },
            SchemaKind::Record { key, value: item } => {
                let Some(fields) = value.as_object() else {
                    issues.push(type_issue(path, "object", value));
                    return None;
                };
                let mut output = Map::new();
                for (name, field) in fields {
                    let child = join(path, name);
                    key.check(Some(&Value::String(name.clone())), &child, issues);
                    if let Some(parsed) = item.check(Some(field), &child, issues) {
                        output.insert(name.clone(), parsed);
                    }
                }
                Some(Value::Object(output))
            }
            SchemaKind::Array(schema) => {
                let items = as_array(value, path, issues)?;
                check_count(items.len(), schema.min_items, schema.max_items, path, issues);
                Some(Value::Array(check_elements(&schema.element, items, path, issues)))
            }
            SchemaKind::Set(schema) => {
                let items = as_array(value, path, issues)?;
                check_count(items.len(), schema.min_size, schema.max_size, path, issues);
                let duplicated = items
                    .iter()
                    .enumerate()
                    .any(|(index, item)| items[..index].contains(item));
                if duplicated {
                    issues.push(ValidationIssue::new(path, "validation.unique", "set elements must be unique"));
                }
                Some(Value::Array(check_elements(&schema.element, items, path, issues)))
            }
            SchemaKind::Tuple(schema) => {
                let items = as_array(value, path, issues)?;
                let fixed = schema.items.len();
                if items.len() < fixed || (schema.rest.is_none() && items.len() > fixed) {
                    issues.push(ValidationIssue::new(
                        path,
                        "validation.length",
                        format!("tuple expects {fixed} items, received {}", items.len()),
                    ));
                    return None;
                }
                let mut output = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let node = schema.items.get(index).or(schema.rest.as_deref());
                    if let Some(node) = node {
                        output.push(node.check(Some(item), &join(path, &index.to_string()), issues).unwrap_or(Value::Null));
                    }
                }
                Some(Value::Array(output))
            }
            SchemaKind::Map { key, value: item } => {
                let entries = as_array(value, path, issues)?;
                let mut output = Vec::with_capacity(entries.len());
                for (index, entry) in entries.iter().enumerate() {
                    let child = join(path, &index.to_string());
                    match entry.as_array().map(Vec::as_slice) {
                        Some([entry_key, entry_value]) => {
                            let parsed_key = key.check(Some(entry_key), &join(&child, "0"), issues);
                            let parsed_value = item.check(Some(entry_value), &join(&child, "1"), issues);
                            output.push(Value::Array(vec![
                                parsed_key.unwrap_or(Value::Null),
                                parsed_value.unwrap_or(Value::Null),
                            ]));
                        }
                        _ => issues.push(type_issue(&child, "[key, value] pair", entry)),
                    }
                }
                Some(Value::Array(output))
            }
            SchemaKind::Union(branches) => {
                for branch in branches {
                    let mut branch_issues = Vec::new();
                    let parsed = branch.check(Some(value), path, &mut branch_issues);
                    if branch_issues.is_empty() {
                        return parsed;
                    }
                }
                issues.push(ValidationIssue::new(
                    path,
                    "validation.union",
                    "value does not match any allowed type",
                ));
                None
            }
            SchemaKind::Intersection(left, right) => {
                let before = issues.len();
                let left = left.check(Some(value), path, issues);
                let right = right.check(Some(value), path, issues);
                if issues.len() > before {
                    return None;
                }
                merge_intersection(left, right, path, issues)
            }
            SchemaKind::Refined(inner, refinement) => {
                let before = issues.len();
                let parsed = inner.check(Some(value), path, issues)?;
                if issues.len() == before && !(refinement.check)(&parsed) {
                    issues.push(ValidationIssue::new(path, "validation.custom", refinement.message.clone()));
                }
                Some(parsed)
            }
            // Wrappers and absence-tolerant kinds are resolved in `check`.
            SchemaKind::Optional(_)
            | SchemaKind::Nullable(_)
            | SchemaKind::Default { .. }
            | SchemaKind::Any
            | SchemaKind::Unknown
            | SchemaKind::ObjectId
            | SchemaKind::Undefined
            | SchemaKind::Void => self.check(Some(value), path, issues),
        }
    }
}

fn check_object_id(value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) -> Option<Value> {
    let raw = match value {
        Value::String(raw) => Some(raw.as_str()),
        Value::Object(fields) if fields.len() == 1 => fields.get("$oid").and_then(Value::as_str),
        _ => None,
    };
    if raw.is_some_and(is_valid_object_id) {
        Some(value.clone())
    } else {
        issues.push(ValidationIssue::new(path, "validation.object_id", "Invalid Object ID"));
        None
    }
}

fn check_string(schema: &StringSchema, raw: &str, path: &str, issues: &mut Vec<ValidationIssue>) -> Option<String> {
    let mut current = raw.to_string();
    for check in &schema.checks {
        let length = current.chars().count();
        match check {
            StringCheck::Trim => current = current.trim().to_string(),
            StringCheck::Min(min) if length < *min => issues.push(ValidationIssue::new(
                path,
                "validation.length",
                format!("length must be at least {min}"),
            )),
            StringCheck::Max(max) if length > *max => issues.push(ValidationIssue::new(
                path,
                "validation.length",
                format!("length must be at most {max}"),
            )),
            StringCheck::Regex(pattern) if !pattern.is_match(&current) => issues.push(ValidationIssue::new(
                path,
                "validation.regex",
                format!("value does not match pattern {}", pattern.as_str()),
            )),
            StringCheck::Email if !is_valid_email(&current) => issues.push(ValidationIssue::new(
                path,
                "validation.email",
                "value must be a valid email address",
            )),
            StringCheck::Url if !is_valid_url(&current) => {
                issues.push(ValidationIssue::new(path, "validation.url", "value must be a valid URL"))
            }
            StringCheck::Uuid if !is_valid_uuid(&current) => {
                issues.push(ValidationIssue::new(path, "validation.uuid", "value must be a valid UUID"))
            }
            StringCheck::Cuid if !is_valid_cuid(&current) => {
                issues.push(ValidationIssue::new(path, "validation.cuid", "value must be a valid CUID"))
            }
            StringCheck::StartsWith(prefix) if !current.starts_with(prefix.as_str()) => issues.push(
                ValidationIssue::new(path, "validation.regex", format!("value must start with {prefix:?}")),
            ),
            StringCheck::EndsWith(suffix) if !current.ends_with(suffix.as_str()) => issues.push(
                ValidationIssue::new(path, "validation.regex", format!("value must end with {suffix:?}")),
            ),
            _ => {}
        }
    }
    Some(current)
}

fn check_number(schema: &NumberSchema, number: f64, path: &str, issues: &mut Vec<ValidationIssue>) {
    for check in &schema.checks {
        match check {
            NumberCheck::Int if number.fract() != 0.0 => {
                issues.push(ValidationIssue::new(path, "validation.int", "value must be an integer"))
            }
            NumberCheck::Min { value, inclusive } if number < *value || (!inclusive && number == *value) => {
                let bound = if *inclusive { "at least" } else { "greater than" };
                issues.push(ValidationIssue::new(
                    path,
                    "validation.range",
                    format!("value must be {bound} {value}"),
                ));
            }
            NumberCheck::Max { value, inclusive } if number > *value || (!inclusive && number == *value) => {
                let bound = if *inclusive { "at most" } else { "less than" };
                issues.push(ValidationIssue::new(
                    path,
                    "validation.range",
                    format!("value must be {bound} {value}"),
                ));
            }
            NumberCheck::MultipleOf(step) if !is_multiple_of(number, *step) => issues.push(ValidationIssue::new(
                path,
                "validation.multiple_of",
                format!("value must be a multiple of {step}"),
            )),
            _ => {}
        }
    }
}

fn is_multiple_of(number: f64, step: f64) -> bool {
    if step == 0.0 {
        return false;
    }
    let quotient = (number / step).round();
    (number - quotient * step).abs() <= f64::EPSILON * number.abs().max(1.0) * 4.0
}

fn check_object(
    schema: &ObjectSchema,
    fields: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Map<String, Value>> {
    let mut output = Map::new();
    for (key, node) in schema.shape.iter() {
        if let Some(parsed) = node.check(fields.get(key), &join(path, key), issues) {
            output.insert(key.to_string(), parsed);
        }
    }

    let mut unrecognized = Vec::new();
    for (key, field) in fields {
        if schema.shape.contains_key(key) {
            continue;
        }
        match (&schema.catchall, schema.unknown_keys) {
            (Some(catchall), _) => {
                if let Some(parsed) = catchall.check(Some(field), &join(path, key), issues) {
                    output.insert(key.clone(), parsed);
                }
            }
            (None, UnknownKeys::Passthrough) => {
                output.insert(key.clone(), field.clone());
            }
            (None, UnknownKeys::Strict) => unrecognized.push(key.as_str()),
            (None, UnknownKeys::Strip) => {}
        }
    }
    if !unrecognized.is_empty() {
        issues.push(ValidationIssue::new(
            path,
            "validation.unrecognized_keys",
            format!("unrecognized keys: {}", unrecognized.join(", ")),
        ));
    }
    Some(output)
}

fn check_elements(element: &SchemaNode, items: &[Value], path: &str, issues: &mut Vec<ValidationIssue>) -> Vec<Value> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            element
                .check(Some(item), &join(path, &index.to_string()), issues)
                .unwrap_or(Value::Null)
        })
        .collect()
}

fn check_count(count: usize, min: Option<usize>, max: Option<usize>, path: &str, issues: &mut Vec<ValidationIssue>) {
    if let Some(min) = min.filter(|min| count < *min) {
        issues.push(ValidationIssue::new(
            path,
            "validation.length",
            format!("must contain at least {min} items"),
        ));
    }
    if let Some(max) = max.filter(|max| count > *max) {
        issues.push(ValidationIssue::new(
            path,
            "validation.length",
            format!("must contain at most {max} items"),
        ));
    }
}

fn merge_intersection(
    left: Option<Value>,
    right: Option<Value>,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Value> {
    match (left, right) {
        (Some(Value::Object(mut left)), Some(Value::Object(right))) => {
            for (key, value) in right {
                left.entry(key).or_insert(value);
            }
            Some(Value::Object(left))
        }
        (left, right) if left == right => left,
        _ => {
            issues.push(ValidationIssue::new(
                path,
                "validation.intersection",
                "intersection results could not be merged",
            ));
            None
        }
    }
}

fn as_array<'v>(value: &'v Value, path: &str, issues: &mut Vec<ValidationIssue>) -> Option<&'v [Value]> {
    match value.as_array() {
        Some(items) => Some(items.as_slice()),
        None => {
            issues.push(type_issue(path, "array", value));
            None
        }
    }
}

fn expect(ok: bool, path: &str, expected: &str, value: &Value, issues: &mut Vec<ValidationIssue>) -> Option<Value> {
    if ok {
        Some(value.clone())
    } else {
        issues.push(type_issue(path, expected, value));
        None
    }
}

fn type_issue(path: &str, expected: &str, value: &Value) -> ValidationIssue {
    ValidationIssue::new(
        path,
        "validation.type",
        format!("expected {expected}, received {}", json_type_name(value)),
    )
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{ArraySchema, NativeEnumMember, SetSchema, TupleSchema};

    fn person() -> SchemaNode {
        SchemaNode::object(
            ObjectSchema::new()
                .property("name", StringSchema::new().min(2).into())
                .property("age", NumberSchema::new().int().gte(0.0).into())
                .property("nickname", SchemaNode::string().optional())
                .property("tags", SchemaNode::array(SchemaNode::string()).with_default(json!([]))),
        )
    }

    #[test]
    fn parses_and_applies_defaults() {
        let parsed = person()
            .parse(&json!({ "name": "Ada", "age": 36, "extra": true }))
            .expect("valid person");
        assert_eq!(parsed, json!({ "name": "Ada", "age": 36, "tags": [] }));
    }

    #[test]
    fn reports_every_failing_path() {
        let error = person()
            .parse(&json!({ "name": "A", "age": 1.5, "tags": ["ok", 3] }))
            .expect_err("invalid person");
        let fields: Vec<_> = error.fields().collect();
        assert_eq!(fields, vec!["name", "age", "tags.1"]);
        assert_eq!(error.issues[0].code, "validation.length");
        assert_eq!(error.issues[1].code, "validation.int");
        assert_eq!(error.issues[2].code, "validation.type");
    }

    #[test]
    fn missing_required_key_is_reported() {
        let error = person().parse(&json!({ "age": 3 })).expect_err("name missing");
        assert_eq!(error.issues[0].field, "name");
        assert_eq!(error.issues[0].code, "validation.required");
    }

    #[test]
    fn strict_objects_reject_unknown_keys() {
        let schema = SchemaNode::object(ObjectSchema::new().property("a", SchemaNode::boolean()).strict());
        let result = schema.safe_parse(&json!({ "a": true, "b": 1 }));
        assert!(!result.is_success());
        assert_eq!(
            result.error().map(|error| error.issues[0].code.as_str()),
            Some("validation.unrecognized_keys")
        );
    }

    #[test]
    fn passthrough_objects_keep_unknown_keys() {
        let parsed = SchemaNode::passthrough_object()
            .parse(&json!({ "anything": [1, 2] }))
            .expect("passthrough accepts");
        assert_eq!(parsed, json!({ "anything": [1, 2] }));
    }

    #[test]
    fn object_ids_are_checked_when_present() {
        let schema = SchemaNode::object(ObjectSchema::new().property("owner", SchemaNode::object_id()));
        assert_eq!(schema.parse(&json!({})).expect("absent id"), json!({}));
        assert!(schema.safe_parse(&json!({ "owner": "65f1c0ffee0000000000cafe" })).is_success());
        assert!(
            schema
                .safe_parse(&json!({ "owner": { "$oid": "65f1c0ffee0000000000cafe" } }))
                .is_success()
        );

        for bad in [json!(42), json!("65f1c0ffee"), json!({ "$oid": 1 })] {
            let error = schema.parse(&json!({ "owner": bad })).expect_err("not an object id");
            assert_eq!(error.issues[0].field, "owner");
            assert_eq!(error.issues[0].code, "validation.object_id");
            assert_eq!(error.issues[0].message, "Invalid Object ID");
        }
    }

    #[test]
    fn nullable_accepts_null_only_in_addition() {
        let schema = SchemaNode::string().nullable();
        assert!(schema.safe_parse(&json!(null)).is_success());
        assert!(schema.safe_parse(&json!("x")).is_success());
        assert!(!schema.safe_parse(&json!(1)).is_success());
    }

    #[test]
    fn string_formats_and_trim() {
        let email = SchemaNode::from(StringSchema::new().trim().email());
        assert_eq!(email.parse(&json!("  a@b.io ")).expect("trimmed email"), json!("a@b.io"));
        assert!(!email.safe_parse(&json!("nope")).is_success());

        let prefixed = SchemaNode::from(StringSchema::new().starts_with("usr_").ends_with("!"));
        assert!(prefixed.safe_parse(&json!("usr_1!")).is_success());
        assert_eq!(
            prefixed.parse(&json!("x")).expect_err("both fail").issues.len(),
            2
        );
    }

    #[test]
    fn number_bounds_respect_exclusivity() {
        let schema = SchemaNode::from(NumberSchema::new().gt(0.0).lte(10.0).multiple_of(0.5));
        assert!(schema.safe_parse(&json!(10)).is_success());
        assert!(schema.safe_parse(&json!(2.5)).is_success());
        assert!(!schema.safe_parse(&json!(0)).is_success());
        assert!(!schema.safe_parse(&json!(2.25)).is_success());
    }

    #[test]
    fn sets_require_unique_elements() {
        let schema = SchemaNode::from(SetSchema::new(SchemaNode::number()).max(3));
        assert!(schema.safe_parse(&json!([1, 2, 3])).is_success());
        let error = schema.parse(&json!([1, 1, 2, 3])).expect_err("duplicate and too large");
        let codes: Vec<_> = error.issues.iter().map(|issue| issue.code.as_str()).collect();
        assert_eq!(codes, vec!["validation.length", "validation.unique"]);
    }

    #[test]
    fn arrays_check_length_bounds() {
        let schema = SchemaNode::from(ArraySchema::new(SchemaNode::any()).min(1));
        assert!(!schema.safe_parse(&json!([])).is_success());
        assert!(schema.safe_parse(&json!([null])).is_success());
    }

    #[test]
    fn maps_are_arrays_of_pairs() {
        let schema = SchemaNode::map(SchemaNode::string(), SchemaNode::number());
        assert!(schema.safe_parse(&json!([["a", 1], ["b", 2]])).is_success());
        let error = schema.parse(&json!([["a", "x"], ["b"]])).expect_err("bad entries");
        let fields: Vec<_> = error.fields().collect();
        assert_eq!(fields, vec!["0.1", "1"]);
    }

    #[test]
    fn tuples_with_and_without_rest() {
        let fixed = SchemaNode::from(TupleSchema::new([SchemaNode::string(), SchemaNode::number()]));
        assert!(fixed.safe_parse(&json!(["a", 1])).is_success());
        assert!(!fixed.safe_parse(&json!(["a", 1, 2])).is_success());

        let variadic = SchemaNode::from(TupleSchema::new([SchemaNode::string()]).rest(SchemaNode::number()));
        assert!(variadic.safe_parse(&json!(["a", 1, 2])).is_success());
        assert!(!variadic.safe_parse(&json!(["a", "b"])).is_success());
    }

    #[test]
    fn unions_take_first_matching_branch() {
        let schema = SchemaNode::union([SchemaNode::literal("auto"), SchemaNode::number()]);
        assert!(schema.safe_parse(&json!("auto")).is_success());
        assert!(schema.safe_parse(&json!(4)).is_success());
        let error = schema.parse(&json!("manual")).expect_err("no branch matches");
        assert_eq!(error.issues[0].code, "validation.union");
    }

    #[test]
    fn intersections_merge_objects() {
        let left = SchemaNode::object(ObjectSchema::new().property("a", SchemaNode::number()));
        let right = SchemaNode::object(ObjectSchema::new().property("b", SchemaNode::number()));
        let parsed = SchemaNode::intersection(left, right)
            .parse(&json!({ "a": 1, "b": 2 }))
            .expect("both sides accept");
        assert_eq!(parsed, json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn native_enums_match_member_values() {
        let schema = SchemaNode::native_enum([NativeEnumMember::number("Low", 0), NativeEnumMember::number("High", 1)]);
        assert!(schema.safe_parse(&json!(1)).is_success());
        assert!(!schema.safe_parse(&json!("High")).is_success());
    }

    #[test]
    fn dates_are_rfc3339_strings() {
        let schema = SchemaNode::date();
        assert!(schema.safe_parse(&json!("2024-05-01T10:00:00Z")).is_success());
        assert!(!schema.safe_parse(&json!("yesterday")).is_success());
        assert!(!schema.safe_parse(&json!(1714557600)).is_success());
    }

    #[test]
    fn refinements_run_after_inner_schema() {
        fn even(value: &Value) -> bool {
            value.as_i64().is_some_and(|number| number % 2 == 0)
        }
        let schema = SchemaNode::number().refine("value must be even", even);
        assert!(schema.safe_parse(&json!(4)).is_success());
        let error = schema.parse(&json!(3)).expect_err("odd");
        assert_eq!(error.issues[0].message, "value must be even");
    }
}
