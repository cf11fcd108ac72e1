//! Record schema definitions.
//!
//! A [`RecordSchema`] is an ordered list of [`FieldDescriptor`]s derived from an
//! Avro record schema. The field order is both the display order and the order
//! in which the interactive builder prompts for values.

use crate::types::FieldType;
use apache_avro::Schema as AvroSchema;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Avro definition of the `Order` record compiled into the binaries.
pub const ORDER_SCHEMA_JSON: &str = include_str!("../../../schemas/order.avsc");

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    /// Schema text is not valid Avro
    #[error("Failed to parse Avro schema: {0}")]
    Avro(#[from] apache_avro::Error),

    /// Schema could not be rendered back to JSON
    #[error("Failed to render schema: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level schema is not a record
    #[error("Expected a record schema, found {0}")]
    NotARecord(String),

    /// Field not found in the record schema
    #[error("Field '{0}' not found in schema")]
    FieldNotFound(String),

    /// A value map is missing an entry for a schema field
    #[error("No value resolved for field '{0}'")]
    MissingField(String),

    /// A record field holds a value of the wrong shape
    #[error("Field '{field}' has unexpected value: {message}")]
    InvalidValue { field: String, message: String },

    /// A declared default does not fit the field's type
    #[error("Field '{field}' has an invalid default: {message}")]
    InvalidDefault { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;

// ============================================================================
// Field Descriptor
// ============================================================================

/// Description of a single record field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name, unique within its schema
    pub name: String,

    /// Declared type
    pub field_type: FieldType,

    /// Default value as written in the schema.
    ///
    /// `Some(Value::Null)` is an explicit null default and differs from `None`.
    pub default: Option<serde_json::Value>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
        }
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Whether the field accepts null.
    pub fn is_nullable(&self) -> bool {
        self.field_type.is_nullable()
    }

    /// Whether the schema declares a default, including an explicit null.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// A field is required when it is neither nullable nor defaulted.
    pub fn is_required(&self) -> bool {
        !self.is_nullable() && !self.has_default()
    }

    /// Type with any nullable union wrapper removed.
    pub fn non_null_type(&self) -> &FieldType {
        self.field_type.non_null()
    }

    pub fn enum_symbols(&self) -> Option<&[String]> {
        self.field_type.enum_symbols()
    }

    /// Check that the declared default fits the non-null type.
    ///
    /// A null default is always accepted. Unsupported types and unions with
    /// several non-null branches are left for the builder to reject.
    pub fn validate_default(&self) -> Result<()> {
        use serde_json::Value as Json;

        let default = match &self.default {
            Some(default) if !default.is_null() => default,
            _ => return Ok(()),
        };

        let fits = match (self.non_null_type(), default) {
            (FieldType::String, Json::String(_)) => true,
            (FieldType::Boolean, Json::Bool(_)) => true,
            (FieldType::Int, Json::Number(n)) => {
                n.as_i64().is_some_and(|i| i32::try_from(i).is_ok())
            }
            (FieldType::Long, Json::Number(n)) => n.as_i64().is_some(),
            (FieldType::Float | FieldType::Double, Json::Number(_)) => true,
            (FieldType::Enum { symbols, .. }, Json::String(s)) => symbols.contains(s),
            (FieldType::Union(_) | FieldType::Unsupported(_), _) => true,
            _ => false,
        };

        if fits {
            Ok(())
        } else {
            Err(SchemaError::InvalidDefault {
                field: self.name.clone(),
                message: format!("{default} does not match type {}", self.field_type),
            })
        }
    }
}

// ============================================================================
// Record Schema
// ============================================================================

/// Ordered field definitions of a record type, plus the Avro schema it came from.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    /// Record name without namespace
    pub name: String,

    /// Avro namespace, if any
    pub namespace: Option<String>,

    fields: Vec<FieldDescriptor>,

    avro: AvroSchema,
}

impl RecordSchema {
    /// Parse an Avro record schema from its JSON text.
    pub fn parse(json: &str) -> Result<Self> {
        let avro = AvroSchema::parse_str(json)?;
        Self::from_avro(avro)
    }

    /// Load an Avro record schema from a `.avsc` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// The built-in `Order` schema.
    pub fn order() -> Result<Self> {
        Self::parse(ORDER_SCHEMA_JSON)
    }

    /// Build from an already parsed Avro schema.
    pub fn from_avro(avro: AvroSchema) -> Result<Self> {
        let record = match &avro {
            AvroSchema::Record(record) => record,
            other => {
                return Err(SchemaError::NotARecord(
                    FieldType::from_avro(other, &mut HashMap::new()).type_name(),
                ))
            }
        };

        let mut named = HashMap::new();
        let mut fields = Vec::with_capacity(record.fields.len());
        for field in &record.fields {
            let descriptor = FieldDescriptor {
                name: field.name.clone(),
                field_type: FieldType::from_avro(&field.schema, &mut named),
                default: field.default.clone(),
            };
            descriptor.validate_default()?;
            fields.push(descriptor);
        }

        Ok(Self {
            name: record.name.name.clone(),
            namespace: record.name.namespace.clone(),
            fields,
            avro,
        })
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a field by name or fail.
    pub fn require_field(&self, name: &str) -> Result<&FieldDescriptor> {
        self.field(name)
            .ok_or_else(|| SchemaError::FieldNotFound(name.to_string()))
    }

    /// All field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Fully qualified record name.
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{ns}.{}", self.name),
            _ => self.name.clone(),
        }
    }

    /// The underlying Avro schema, used for encoding and decoding.
    pub fn avro(&self) -> &AvroSchema {
        &self.avro
    }

    /// Parsing Canonical Form of the schema.
    pub fn canonical_form(&self) -> String {
        self.avro.canonical_form()
    }

    /// Compact JSON text, as sent to a schema registry.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.avro)?)
    }

    /// Indented JSON text for human consumption.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.avro)?)
    }

    /// Two schemas describe the same record when their canonical forms match
    /// and every field declares the same default.
    ///
    /// The canonical form drops `default`, so defaults are compared separately.
    pub fn same_as(&self, other: &RecordSchema) -> bool {
        self.canonical_form() == other.canonical_form()
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.default == b.default)
    }
}
