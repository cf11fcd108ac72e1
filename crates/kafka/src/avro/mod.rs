//! Avro encoding for records.
//!
//! - [`codec`] converts between [`Record`](order_schema::Record) and Avro datums
//! - [`wire`] adds and strips the Confluent schema-id header

pub mod codec;
pub mod wire;
