//! Kafka plumbing for Avro-encoded order records.
//!
//! Features:
//!
//! - Publisher: sends one record at a time and waits for the broker acknowledgment
//! - Listener: consumer-group subscription that yields decoded records
//! - Confluent wire format: magic byte, 4-byte schema id, Avro binary datum
//! - Schema registry integration: writer schema registered on first send,
//!   looked up by id on receive

/// Record ↔ Avro datum conversion and Confluent framing
pub mod avro;

/// Consumer-group listener yielding decoded records
pub mod consumer;
pub mod error;

/// Blocking-per-record publisher with connectivity probe
pub mod publisher;

// Re-export main types for easy access
pub use avro::codec::{decode_record, encode_record};
pub use avro::wire::{frame, unframe, MAGIC_BYTE};
pub use consumer::{ListenerConfig, OrderListener, ReceivedRecord, WriterSchemas};
pub use error::{Error, Result};
pub use publisher::{DeliveryReport, KafkaPublisher, PartitionLeader, Publisher, PublisherConfig};
