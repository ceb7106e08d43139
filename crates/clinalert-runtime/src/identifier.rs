//! Record identifier resolution
//!
//! The study metadata names the record identifier through a label pattern
//! such as `"Study [record_id]"`. The field name is the text inside the first
//! bracket pair.

use crate::error::{Result, RuntimeError};

/// Extract the identifier field from a label pattern.
///
/// Characters outside `[A-Za-z0-9_-]` are stripped. Returns `None` when the
/// pattern has no bracket pair or the brackets hold no usable name.
pub fn resolve_identifier_field(label_pattern: &str) -> Option<String> {
    let open = label_pattern.find('[')?;
    let rest = &label_pattern[open + 1..];
    let close = rest.find(']')?;

    let field: String = rest[..close]
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    if field.is_empty() {
        None
    } else {
        Some(field)
    }
}

/// Like [`resolve_identifier_field`], but a pattern without an identifier is
/// a configuration error
pub fn require_identifier_field(label_pattern: &str) -> Result<String> {
    resolve_identifier_field(label_pattern).ok_or_else(|| {
        RuntimeError::Configuration(format!(
            "record label pattern '{}' does not name an identifier field",
            label_pattern
        ))
    })
}
