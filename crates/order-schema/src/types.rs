//! Field types understood by the record builder.
//!
//! `FieldType` is a plain-data projection of an Avro field schema. Only the
//! shapes the builder can prompt for are modelled precisely; everything else
//! is kept as [`FieldType::Unsupported`] so that the failure surfaces when the
//! operator reaches that field rather than when the schema is loaded.

use apache_avro::schema::SchemaKind;
use apache_avro::Schema as AvroSchema;
use std::collections::HashMap;
use std::fmt;

/// Declared type of a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Avro `null`; only meaningful as a union alternative
    Null,
    Boolean,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit IEEE 754 float
    Float,
    /// 64-bit IEEE 754 float
    Double,
    String,
    /// Named enumeration with its symbols in declaration order
    Enum { name: String, symbols: Vec<String> },
    /// Union of alternatives, e.g. `["null", "string"]`
    Union(Vec<FieldType>),
    /// Any other Avro kind (bytes, fixed, array, map, record, logical types)
    Unsupported(String),
}

impl FieldType {
    /// Project an Avro schema node into a `FieldType`.
    ///
    /// `named` holds enums already seen in the enclosing schema so that
    /// references by name resolve to the full definition.
    pub(crate) fn from_avro(schema: &AvroSchema, named: &mut HashMap<String, FieldType>) -> Self {
        match schema {
            AvroSchema::Null => FieldType::Null,
            AvroSchema::Boolean => FieldType::Boolean,
            AvroSchema::Int => FieldType::Int,
            AvroSchema::Long => FieldType::Long,
            AvroSchema::Float => FieldType::Float,
            AvroSchema::Double => FieldType::Double,
            AvroSchema::String => FieldType::String,
            AvroSchema::Enum(enum_schema) => {
                let field_type = FieldType::Enum {
                    name: enum_schema.name.name.clone(),
                    symbols: enum_schema.symbols.clone(),
                };
                named.insert(enum_schema.name.name.clone(), field_type.clone());
                field_type
            }
            AvroSchema::Union(union_schema) => FieldType::Union(
                union_schema
                    .variants()
                    .iter()
                    .map(|variant| FieldType::from_avro(variant, named))
                    .collect(),
            ),
            AvroSchema::Ref { name } => named
                .get(&name.name)
                .cloned()
                .unwrap_or_else(|| FieldType::Unsupported(format!("ref:{}", name.name))),
            other => FieldType::Unsupported(kind_name(other)),
        }
    }

    /// Whether `null` is an accepted value for this type.
    pub fn is_nullable(&self) -> bool {
        match self {
            FieldType::Null => true,
            FieldType::Union(variants) => variants.iter().any(|v| *v == FieldType::Null),
            _ => false,
        }
    }

    /// The first non-null alternative of a union, or the type itself.
    pub fn non_null(&self) -> &FieldType {
        match self {
            FieldType::Union(variants) => variants
                .iter()
                .find(|v| **v != FieldType::Null)
                .unwrap_or(self),
            _ => self,
        }
    }

    /// All non-null alternatives of a union.
    pub fn non_null_variants(&self) -> Vec<&FieldType> {
        match self {
            FieldType::Union(variants) => variants
                .iter()
                .filter(|v| **v != FieldType::Null)
                .collect(),
            other => vec![other],
        }
    }

    /// Enum symbols, looking through a nullable union.
    pub fn enum_symbols(&self) -> Option<&[String]> {
        match self.non_null() {
            FieldType::Enum { symbols, .. } => Some(symbols),
            _ => None,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            FieldType::Null => "null".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Int => "int".to_string(),
            FieldType::Long => "long".to_string(),
            FieldType::Float => "float".to_string(),
            FieldType::Double => "double".to_string(),
            FieldType::String => "string".to_string(),
            FieldType::Enum { .. } => "enum".to_string(),
            FieldType::Union(_) => "union".to_string(),
            FieldType::Unsupported(kind) => kind.clone(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Enum { name, .. } => write!(f, "enum:{name}"),
            FieldType::Union(variants) => {
                let names: Vec<String> = variants.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", names.join(", "))
            }
            other => write!(f, "{}", other.type_name()),
        }
    }
}

fn kind_name(schema: &AvroSchema) -> String {
    format!("{:?}", SchemaKind::from(schema)).to_lowercase()
}
