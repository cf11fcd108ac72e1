//! Reverse conversion: raw text → Value.
//!
//! Converts one line of operator input into a typed value according to a
//! field's declared type. Empty input never reaches this module; the record
//! builder resolves it from nullability and defaults first.

use order_schema::{FieldDescriptor, FieldType, Value};

/// Reasons a raw input cannot become a field value.
///
/// Every variant is recoverable: the builder reports it and prompts again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("required field")]
    RequiredField,

    #[error("not a number")]
    NotANumber { input: String },

    #[error("not a boolean (use sí/si/no or true/false)")]
    InvalidBoolean { input: String },

    #[error("allowed values: [{}]", .allowed.join(", "))]
    InvalidEnumSymbol { allowed: Vec<String> },

    #[error("unsupported union shape")]
    UnsupportedUnion,

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("invalid default for field '{field}': {message}")]
    InvalidDefault { field: String, message: String },
}

/// Convert raw input for a field.
pub fn convert_field(raw: &str, field: &FieldDescriptor) -> Result<Value, ValidationError> {
    convert(raw, &field.field_type)
}

/// Convert raw input according to a declared type.
///
/// A union converts through its single non-null alternative; unions with
/// more than one non-null alternative are rejected.
pub fn convert(raw: &str, field_type: &FieldType) -> Result<Value, ValidationError> {
    match field_type {
        FieldType::Union(_) => match field_type.non_null_variants().as_slice() {
            [single] => convert(raw, single),
            _ => Err(ValidationError::UnsupportedUnion),
        },
        FieldType::String => Ok(Value::String(raw.to_string())),
        FieldType::Int => raw
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|_| not_a_number(raw)),
        FieldType::Long => raw
            .parse::<i64>()
            .map(Value::Long)
            .map_err(|_| not_a_number(raw)),
        FieldType::Float => raw
            .parse::<f32>()
            .map(Value::Float)
            .map_err(|_| not_a_number(raw)),
        FieldType::Double => raw
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| not_a_number(raw)),
        FieldType::Boolean => parse_boolean(raw).map(Value::Boolean),
        FieldType::Enum { symbols, .. } => {
            let upper = raw.to_uppercase();
            if symbols.contains(&upper) {
                Ok(Value::Enum(upper))
            } else {
                Err(ValidationError::InvalidEnumSymbol {
                    allowed: symbols.clone(),
                })
            }
        }
        FieldType::Null | FieldType::Unsupported(_) => {
            Err(ValidationError::UnsupportedType(field_type.type_name()))
        }
    }
}

/// Parse a yes/no answer.
///
/// Accepts `sí`/`si` and `no` in any case, then the `true`/`false` literals.
pub fn parse_boolean(raw: &str) -> Result<bool, ValidationError> {
    match raw.to_lowercase().as_str() {
        "sí" | "si" | "true" => Ok(true),
        "no" | "false" => Ok(false),
        _ => Err(ValidationError::InvalidBoolean {
            input: raw.to_string(),
        }),
    }
}

/// Resolve a field's schema default into a typed value.
///
/// Returns `None` when the field declares no default. An explicit JSON
/// `null` default resolves to [`Value::Null`].
pub fn default_value(field: &FieldDescriptor) -> Option<Result<Value, ValidationError>> {
    let default = field.default.as_ref()?;
    Some(json_to_value(field, default))
}

fn json_to_value(field: &FieldDescriptor, json: &serde_json::Value) -> Result<Value, ValidationError> {
    let invalid = |message: &str| ValidationError::InvalidDefault {
        field: field.name.clone(),
        message: message.to_string(),
    };

    if json.is_null() {
        return Ok(Value::Null);
    }

    match (field.non_null_type(), json) {
        (FieldType::String, serde_json::Value::String(s)) => Ok(Value::String(s.clone())),
        (FieldType::Boolean, serde_json::Value::Bool(b)) => Ok(Value::Boolean(*b)),
        (FieldType::Int, serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::Int)
            .ok_or_else(|| invalid("expected a 32-bit integer")),
        (FieldType::Long, serde_json::Value::Number(n)) => n
            .as_i64()
            .map(Value::Long)
            .ok_or_else(|| invalid("expected a 64-bit integer")),
        (FieldType::Float, serde_json::Value::Number(n)) => n
            .as_f64()
            .map(|f| Value::Float(f as f32))
            .ok_or_else(|| invalid("expected a number")),
        (FieldType::Double, serde_json::Value::Number(n)) => n
            .as_f64()
            .map(Value::Double)
            .ok_or_else(|| invalid("expected a number")),
        (FieldType::Enum { symbols, .. }, serde_json::Value::String(s)) if symbols.contains(s) => {
            Ok(Value::Enum(s.clone()))
        }
        (field_type, other) => Err(invalid(&format!(
            "{other} does not match type {field_type}"
        ))),
    }
}

fn not_a_number(raw: &str) -> ValidationError {
    ValidationError::NotANumber {
        input: raw.to_string(),
    }
}
