//! Forward conversion: Value → display text.
//!
//! Used for prompt labels on the producer side and for printing received
//! records on the consumer side.

use order_schema::{FieldDescriptor, Value};

/// Shown for a null value whose field has no displayable default.
pub const NULL_PLACEHOLDER: &str = "<null>";

/// Shown in place of array or object defaults.
pub const COMPLEX_PLACEHOLDER: &str = "<complex type>";

/// Render a received field value for display.
///
/// Non-null values render in their canonical text form, which converts back
/// to the same value. Null values fall back to the field's default.
pub fn display_value(field: &FieldDescriptor, value: &Value) -> String {
    match value {
        Value::Null => match field.default.as_ref() {
            Some(default) if !default.is_null() => format!("default: {}", display_default(default)),
            _ => NULL_PLACEHOLDER.to_string(),
        },
        other => other.to_string(),
    }
}

/// Render a schema default as plain text (strings without JSON quotes).
pub fn display_default(default: &serde_json::Value) -> String {
    match default {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            COMPLEX_PLACEHOLDER.to_string()
        }
    }
}

/// Prompt label for a field: `name (type) [required|optional|default: X]`.
pub fn prompt_label(field: &FieldDescriptor) -> String {
    let requirement = match &field.default {
        None if field.is_nullable() => "[optional]".to_string(),
        None => "[required]".to_string(),
        Some(default) => format!("[default: {}]", display_default(default)),
    };

    format!(
        "{} ({}) {requirement}",
        field.name,
        field.non_null_type().type_name()
    )
}
