//! Core record types for order-stream.
//!
//! This crate provides the plain-data description of a record schema and the
//! values resolved against it:
//!
//! - [`FieldType`] - Declared field type projected from Avro
//! - [`FieldDescriptor`] / [`RecordSchema`] - Ordered field definitions
//! - [`Value`] / [`FieldValueMap`] / [`Record`] - Typed values and records
//! - [`Order`] - Strongly typed view of the shipped `Order` schema
//! - [`SchemaDiff`] / [`CompatibilityLevel`] - Schema evolution analysis
//!
//! # Architecture
//!
//! ```text
//! order-schema (this crate)
//!    │
//!    ├─── order-types     (raw text → Value, Value → display text)
//!    ├─── order-registry  (schema registry client, freshness check)
//!    ├─── order-kafka     (Record ↔ Avro datum, publish / listen)
//!    └─── order-producer / order-consumer
//! ```

pub mod evolution;
pub mod order;
pub mod schema;
pub mod types;
pub mod values;

pub use evolution::{CompatibilityLevel, FieldChange, FieldModification, RequiredCompatibility, SchemaDiff};
pub use order::{Order, OrderStatus, PaymentMethod};
pub use schema::{FieldDescriptor, RecordSchema, Result, SchemaError, ORDER_SCHEMA_JSON};
pub use types::FieldType;
pub use values::{FieldValueMap, Record, Value};
