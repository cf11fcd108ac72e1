//! order-stream
//!
//! Interactive producer and consumer for Avro-encoded `Order` records on
//! Kafka, backed by a Confluent-compatible schema registry.
//!
//! # CLI Usage
//!
//! ```bash
//! # Prompt for orders and publish them to the "orders" topic
//! order-stream produce --bootstrap-servers localhost:9092 --topic orders
//!
//! # Print received orders and serve GET /schema-status on :8080
//! order-stream consume --schema-registry-url http://localhost:8081
//!
//! # Compare two schema versions
//! order-stream schema diff schemas/order-v1.avsc schemas/order.avsc
//!
//! # Fail when the registry's compatibility level does not allow the change
//! order-stream schema check-compat schemas/order-v1.avsc schemas/order.avsc
//! ```

use clap::Parser;
use order_registry::RegistryClient;
use order_schema::RecordSchema;
use std::path::PathBuf;
use std::time::Duration;

pub mod commands;
pub mod config;

#[derive(Parser, Clone, Debug)]
pub struct KafkaOpts {
    /// Kafka bootstrap servers (comma-separated)
    #[arg(
        long,
        default_value = "localhost:9092",
        env = "KAFKA_BOOTSTRAP_SERVERS"
    )]
    pub bootstrap_servers: String,

    /// Topic orders are published to and consumed from
    #[arg(long, default_value = "orders", env = "KAFKA_TOPIC")]
    pub topic: String,

    /// Delivery timeout per message (e.g. "5s", "1m")
    #[arg(long, default_value = "5s", value_parser = config::parse_duration)]
    pub message_timeout: Duration,
}

#[derive(Parser, Clone, Debug)]
pub struct RegistryOpts {
    /// Schema registry base URL
    #[arg(
        long,
        default_value = "http://localhost:8081",
        env = "SCHEMA_REGISTRY_URL"
    )]
    pub schema_registry_url: String,

    /// Registry subject (default: "<topic>-value")
    #[arg(long)]
    pub subject: Option<String>,
}

impl RegistryOpts {
    /// Subject for `topic`, honoring an explicit `--subject`.
    pub fn subject_for(&self, topic: &str) -> String {
        self.subject
            .clone()
            .unwrap_or_else(|| format!("{topic}-value"))
    }

    pub fn client(&self) -> anyhow::Result<RegistryClient> {
        Ok(RegistryClient::new(&self.schema_registry_url)?)
    }
}

#[derive(Parser, Clone, Debug, Default)]
pub struct SchemaOpts {
    /// Avro schema file to use instead of the built-in Order schema
    #[arg(long, value_name = "PATH")]
    pub schema_file: Option<PathBuf>,
}

impl SchemaOpts {
    pub fn load(&self) -> anyhow::Result<RecordSchema> {
        use anyhow::Context;

        match &self.schema_file {
            Some(path) => RecordSchema::from_file(path)
                .with_context(|| format!("Failed to load schema from {path:?}")),
            None => RecordSchema::order().context("Built-in Order schema is invalid"),
        }
    }
}
