//! Typed values and records.
//!
//! Values are resolved one field at a time into a [`FieldValueMap`], which is
//! finalized into an immutable [`Record`] once every schema field has an entry.

use crate::schema::{RecordSchema, Result, SchemaError};
use std::collections::HashMap;
use std::fmt;

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit absence, only valid for nullable fields
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Enum symbol, already validated against the field's symbol list
    Enum(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(i64::from(*i)),
            Value::Long(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f64::from(*f)),
            Value::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
        }
    }
}

/// Canonical text form; `Null` renders as `null`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Long(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Double(x) => write!(f, "{x}"),
            Value::String(s) | Value::Enum(s) => write!(f, "{s}"),
        }
    }
}

/// Field values collected while building a record.
#[derive(Debug, Clone, Default)]
pub struct FieldValueMap {
    values: HashMap<String, Value>,
}

impl FieldValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the resolved value for a field, replacing any earlier one.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Finalize into a record ordered by the schema.
    ///
    /// Every schema field must have an entry; nullable fields carry an
    /// explicit [`Value::Null`] rather than being omitted.
    pub fn into_record(mut self, schema: &RecordSchema) -> Result<Record> {
        let mut fields = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let value = self
                .values
                .remove(&field.name)
                .ok_or_else(|| SchemaError::MissingField(field.name.clone()))?;
            fields.push((field.name.clone(), value));
        }

        Ok(Record {
            schema_name: schema.full_name(),
            fields,
        })
    }
}

/// A fully resolved record in schema field order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema_name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Assemble a record directly from ordered fields.
    pub fn from_fields(schema_name: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        Self {
            schema_name: schema_name.into(),
            fields,
        }
    }

    /// Fully qualified name of the schema this record was built against.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// String value of a field, used for the message key.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }
}
