//! Conversion between [`Record`] and Avro binary datums.
//!
//! Encoding walks the schema's fields in declaration order and looks each one
//! up in the record. Decoding resolves the writer's datum against the local
//! (reader) schema, so fields the writer did not know about come back with
//! their declared defaults.

use crate::error::{Error, Result};
use apache_avro::types::Value as AvroValue;
use apache_avro::Schema as AvroSchema;
use order_schema::{FieldType, Record, RecordSchema, Value};

/// Encode a record as an Avro binary datum (no framing).
pub fn encode_record(schema: &RecordSchema, record: &Record) -> Result<Vec<u8>> {
    let value = record_to_avro(schema, record)?;
    Ok(apache_avro::to_avro_datum(schema.avro(), value)?)
}

/// Decode an Avro binary datum written with `writer`, projected onto `reader`.
pub fn decode_record(writer: &AvroSchema, reader: &RecordSchema, datum: &[u8]) -> Result<Record> {
    let mut input = datum;
    let value = apache_avro::from_avro_datum(writer, &mut input, Some(reader.avro()))?;

    let avro_fields = match value {
        AvroValue::Record(fields) => fields,
        other => {
            return Err(Error::UnsupportedValue(format!(
                "expected a record, got {}",
                avro_kind(&other)
            )))
        }
    };

    let mut fields = Vec::with_capacity(avro_fields.len());
    for (name, value) in avro_fields {
        fields.push((name, avro_to_value(value)?));
    }

    Ok(Record::from_fields(reader.full_name(), fields))
}

/// Build the Avro record value for `record` in `schema` field order.
pub fn record_to_avro(schema: &RecordSchema, record: &Record) -> Result<AvroValue> {
    let mut fields = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let value = record.get(&field.name).ok_or_else(|| Error::Encode {
            field: field.name.clone(),
            message: "missing from record".to_string(),
        })?;
        let avro = to_avro(&field.field_type, value).map_err(|message| Error::Encode {
            field: field.name.clone(),
            message,
        })?;
        fields.push((field.name.clone(), avro));
    }
    Ok(AvroValue::Record(fields))
}

fn to_avro(field_type: &FieldType, value: &Value) -> std::result::Result<AvroValue, String> {
    match (field_type, value) {
        (FieldType::Union(variants), Value::Null) => variants
            .iter()
            .position(|v| *v == FieldType::Null)
            .map(|idx| AvroValue::Union(idx as u32, Box::new(AvroValue::Null)))
            .ok_or_else(|| "null is not allowed by this union".to_string()),
        (FieldType::Union(variants), value) => {
            // Values always target the first non-null alternative
            let (idx, variant) = variants
                .iter()
                .enumerate()
                .find(|(_, v)| **v != FieldType::Null)
                .ok_or_else(|| "union has no non-null alternative".to_string())?;
            Ok(AvroValue::Union(idx as u32, Box::new(to_avro(variant, value)?)))
        }
        (FieldType::Null, Value::Null) => Ok(AvroValue::Null),
        (FieldType::Boolean, Value::Boolean(b)) => Ok(AvroValue::Boolean(*b)),
        (FieldType::Int, Value::Int(i)) => Ok(AvroValue::Int(*i)),
        (FieldType::Long, Value::Long(l)) => Ok(AvroValue::Long(*l)),
        (FieldType::Long, Value::Int(i)) => Ok(AvroValue::Long(i64::from(*i))),
        (FieldType::Float, Value::Float(f)) => Ok(AvroValue::Float(*f)),
        (FieldType::Double, Value::Double(d)) => Ok(AvroValue::Double(*d)),
        (FieldType::Double, Value::Float(f)) => Ok(AvroValue::Double(f64::from(*f))),
        (FieldType::String, Value::String(s)) => Ok(AvroValue::String(s.clone())),
        (FieldType::Enum { symbols, .. }, Value::Enum(symbol)) => symbols
            .iter()
            .position(|s| s == symbol)
            .map(|idx| AvroValue::Enum(idx as u32, symbol.clone()))
            .ok_or_else(|| format!("'{symbol}' is not one of [{}]", symbols.join(", "))),
        (FieldType::Unsupported(kind), _) => Err(format!("unsupported type: {kind}")),
        (expected, value) => Err(format!(
            "{} value does not match declared type {expected}",
            value.kind()
        )),
    }
}

/// Convert a resolved Avro value back into a record field value.
pub fn avro_to_value(value: AvroValue) -> Result<Value> {
    match value {
        AvroValue::Null => Ok(Value::Null),
        AvroValue::Boolean(b) => Ok(Value::Boolean(b)),
        AvroValue::Int(i) => Ok(Value::Int(i)),
        AvroValue::Long(l) => Ok(Value::Long(l)),
        AvroValue::Float(f) => Ok(Value::Float(f)),
        AvroValue::Double(d) => Ok(Value::Double(d)),
        AvroValue::String(s) => Ok(Value::String(s)),
        AvroValue::Enum(_, symbol) => Ok(Value::Enum(symbol)),
        AvroValue::Union(_, inner) => avro_to_value(*inner),
        other => Err(Error::UnsupportedValue(avro_kind(&other).to_string())),
    }
}

fn avro_kind(value: &AvroValue) -> &'static str {
    match value {
        AvroValue::Bytes(_) => "bytes",
        AvroValue::Fixed(..) => "fixed",
        AvroValue::Array(_) => "array",
        AvroValue::Map(_) => "map",
        AvroValue::Record(_) => "record",
        AvroValue::Union(..) => "union",
        AvroValue::Enum(..) => "enum",
        AvroValue::String(_) => "string",
        AvroValue::Null => "null",
        _ => "logical",
    }
}
