use order_schema::SchemaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// Registry unreachable or the request could not be completed
    #[error("Schema registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Schema registry returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Subject '{0}' not found in the Schema Registry")]
    SubjectNotFound(String),

    #[error("Schema id {0} not found in the Schema Registry")]
    SchemaNotFound(u32),

    #[error("Invalid schema from registry: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
