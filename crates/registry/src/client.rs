use crate::error::{RegistryError, Result};
use async_trait::async_trait;
use order_schema::CompatibilityLevel;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A schema version as stored under a subject.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisteredSchema {
    pub subject: String,
    pub version: u32,
    pub id: u32,
    /// Schema definition as JSON text
    pub schema: String,
}

/// Operations the order tools need from a schema registry.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// All registered subject names.
    async fn subjects(&self) -> Result<Vec<String>>;

    /// Latest version registered under `subject`.
    async fn latest_schema(&self, subject: &str) -> Result<RegisteredSchema>;

    /// Schema text for a global schema id.
    async fn schema_by_id(&self, id: u32) -> Result<String>;

    /// Register `schema` under `subject`, returning its global id.
    ///
    /// Registering an identical schema again returns the existing id.
    async fn register_schema(&self, subject: &str, schema: &str) -> Result<u32>;

    /// Compatibility level for `subject`, falling back to the global level
    /// and then to the registry default.
    async fn compatibility_level(&self, subject: &str) -> Result<CompatibilityLevel>;
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    schema: &'a str,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    id: u32,
}

#[derive(Debug, Deserialize)]
struct SchemaByIdResponse {
    schema: String,
}

#[derive(Debug, Deserialize)]
struct ConfigResponse {
    #[serde(rename = "compatibilityLevel", alias = "compatibility")]
    compatibility_level: String,
}

/// HTTP client for a Confluent-compatible schema registry.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base: Url,
    http: Client,
}

impl RegistryClient {
    /// Create a client for the registry at `base_url` (e.g. "http://localhost:8081").
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RegistryError::InvalidConfig(format!(
                "Schema registry URL must start with http:// or https://: {base_url}"
            )));
        }

        let base = Url::parse(base_url)
            .map_err(|e| RegistryError::InvalidConfig(format!("Invalid schema registry URL {base_url}: {e}")))?;
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// URL for `segments` below the base URL, each percent-encoded as a
    /// single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RegistryError::InvalidConfig(format!(
                    "Schema registry URL cannot take a path: {}",
                    self.base
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, segments: &[&str]) -> Result<Response> {
        let url = self.endpoint(segments)?;
        tracing::debug!("GET {url}");
        Ok(self.http.get(url).send().await?)
    }

    async fn config_level(&self, segments: &[&str]) -> Result<Option<CompatibilityLevel>> {
        let response = self.get(segments).await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let config: ConfigResponse = response.json().await?;
        match config.compatibility_level.parse() {
            Ok(level) => Ok(Some(level)),
            Err(e) => {
                tracing::warn!("Ignoring compatibility level at /{}: {e}", segments.join("/"));
                Ok(None)
            }
        }
    }
}

async fn error_for_status(response: Response) -> RegistryError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    RegistryError::Status { status, body }
}

#[async_trait]
impl SchemaRegistry for RegistryClient {
    async fn subjects(&self) -> Result<Vec<String>> {
        let response = self.get(&["subjects"]).await?;
        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }
        Ok(response.json().await?)
    }

    async fn latest_schema(&self, subject: &str) -> Result<RegisteredSchema> {
        let response = self
            .get(&["subjects", subject, "versions", "latest"])
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RegistryError::SubjectNotFound(subject.to_string())),
            status if status.is_success() => Ok(response.json().await?),
            _ => Err(error_for_status(response).await),
        }
    }

    async fn schema_by_id(&self, id: u32) -> Result<String> {
        let response = self.get(&["schemas", "ids", &id.to_string()]).await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RegistryError::SchemaNotFound(id)),
            status if status.is_success() => {
                let body: SchemaByIdResponse = response.json().await?;
                Ok(body.schema)
            }
            _ => Err(error_for_status(response).await),
        }
    }

    async fn register_schema(&self, subject: &str, schema: &str) -> Result<u32> {
        let url = self.endpoint(&["subjects", subject, "versions"])?;
        tracing::debug!("POST {url}");

        let response = self
            .http
            .post(url)
            .json(&RegisterRequest { schema })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }

        let registered: RegisterResponse = response.json().await?;
        tracing::info!(
            subject = subject,
            schema_id = registered.id,
            "Schema registered"
        );
        Ok(registered.id)
    }

    async fn compatibility_level(&self, subject: &str) -> Result<CompatibilityLevel> {
        if let Some(level) = self.config_level(&["config", subject]).await? {
            return Ok(level);
        }
        if let Some(level) = self.config_level(&["config"]).await? {
            return Ok(level);
        }
        Ok(CompatibilityLevel::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_url() {
        let err = RegistryClient::new("localhost:8081").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidConfig(_)));
    }

    #[test]
    fn test_trims_trailing_slash() {
        let client = RegistryClient::new("http://localhost:8081/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8081");
    }

    #[test]
    fn test_subject_is_a_single_path_segment() {
        let client = RegistryClient::new("http://localhost:8081").unwrap();
        let url = client
            .endpoint(&["subjects", "team/orders value", "versions", "latest"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8081/subjects/team%2Forders%20value/versions/latest"
        );

        let prefixed = RegistryClient::new("http://localhost:8081/registry/").unwrap();
        assert_eq!(
            prefixed.endpoint(&["config"]).unwrap().as_str(),
            "http://localhost:8081/registry/config"
        );
    }

    #[test]
    fn test_registered_schema_deserialize() {
        let json = r#"{"subject":"orders-value","version":3,"id":7,"schema":"\"string\""}"#;
        let parsed: RegisteredSchema = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.version, 3);
        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.schema, "\"string\"");
    }

    #[test]
    fn test_config_response_aliases() {
        let a: ConfigResponse = serde_json::from_str(r#"{"compatibilityLevel":"FULL"}"#).unwrap();
        let b: ConfigResponse = serde_json::from_str(r#"{"compatibility":"NONE"}"#).unwrap();
        assert_eq!(a.compatibility_level, "FULL");
        assert_eq!(b.compatibility_level, "NONE");
    }
}
