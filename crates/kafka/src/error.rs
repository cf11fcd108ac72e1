use order_registry::RegistryError;
use order_schema::SchemaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// Broker unreachable or topic metadata unavailable
    #[error("Could not connect to Kafka: {0}")]
    Connectivity(String),

    #[error("Schema registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Avro error: {0}")]
    Avro(#[from] apache_avro::Error),

    #[error("Invalid message frame: {0}")]
    InvalidFrame(String),

    #[error("Field '{field}' cannot be encoded: {message}")]
    Encode { field: String, message: String },

    #[error("Unsupported Avro value: {0}")]
    UnsupportedValue(String),

    #[error("Consumer error: {0}")]
    Consumer(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Errors confined to a single message; the listener skips these and carries on.
    pub fn is_message_error(&self) -> bool {
        matches!(
            self,
            Error::Avro(_)
                | Error::InvalidFrame(_)
                | Error::UnsupportedValue(_)
                | Error::Schema(_)
                | Error::Registry(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
