//! Schema registry access for order-stream.
//!
//! Talks to a Confluent-compatible schema registry over its REST API:
//!
//! - List subjects and fetch the latest version of a subject
//! - Register a schema under a subject and look schemas up by id
//! - Read the compatibility level configured for a subject
//! - Compare the locally compiled schema against the registry (freshness check)

pub mod client;
pub mod error;
pub mod freshness;

pub use client::{RegisteredSchema, RegistryClient, SchemaRegistry};
pub use error::{RegistryError, Result};
pub use freshness::{check_freshness, Freshness};
