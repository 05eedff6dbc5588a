use email_address::EmailAddress;
use url::Url;
use uuid::Uuid;

/// Returns `true` if the provided string is a syntactically valid email address.
pub fn is_valid_email(value: &str) -> bool {
    EmailAddress::is_valid(value)
}

/// Returns `true` if the provided string parses as a URL with a scheme.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Returns `true` if the provided string parses as a UUID.
pub fn is_valid_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// Returns `true` for collision-resistant ids of the `c` + 8 or more non-space form.
pub fn is_valid_cuid(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some('c' | 'C'))
        && chars.clone().count() >= 8
        && chars.all(|c| !c.is_whitespace() && c != '-')
}

/// Returns `true` for 24-character hexadecimal ObjectId strings.
pub fn is_valid_object_id(value: &str) -> bool {
    value.len() == 24 && value.bytes().all(|byte| byte.is_ascii_hexdigit())
}
