//! Compare the locally compiled schema against the registry's latest version.

use crate::client::SchemaRegistry;
use order_schema::RecordSchema;

/// Outcome of a freshness check. Never an error: failures are a variant too.
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness {
    /// The subject has no registered versions
    SubjectNotFound { subject: String },
    /// Latest registered schema matches the local one
    UpToDate { version: u32 },
    /// Latest registered schema differs; both rendered as indented JSON
    Outdated { latest: String, current: String },
    /// The registry could not be queried or returned an unusable schema
    Failed { reason: String },
}

impl Freshness {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Freshness::UpToDate { .. })
    }

    /// Operator-facing summary.
    pub fn message(&self) -> String {
        match self {
            Freshness::SubjectNotFound { subject } => {
                format!("❌ Subject '{subject}' not found in the Schema Registry.")
            }
            Freshness::UpToDate { .. } => "✅ Schema is up-to-date.".to_string(),
            Freshness::Outdated { latest, current } => format!(
                "❌ Outdated schema.\nLatest Schema:\n{latest}\nCurrent Schema:\n{current}"
            ),
            Freshness::Failed { reason } => format!("Error checking schema: {reason}"),
        }
    }
}

/// Check whether `local` is the latest schema registered under `subject`.
///
/// The subject list is consulted first; an absent subject short-circuits
/// without fetching or comparing any schema. Schemas are compared by their
/// Avro Parsing Canonical Form plus field defaults, so formatting and doc
/// differences are ignored but a changed default is not.
pub async fn check_freshness<R>(registry: &R, subject: &str, local: &RecordSchema) -> Freshness
where
    R: SchemaRegistry + ?Sized,
{
    let subjects = match registry.subjects().await {
        Ok(subjects) => subjects,
        Err(e) => {
            tracing::error!("Error checking schema version: {e}");
            return Freshness::Failed {
                reason: e.to_string(),
            };
        }
    };

    if !subjects.iter().any(|s| s == subject) {
        tracing::warn!("Subject '{subject}' not found in the Schema Registry.");
        return Freshness::SubjectNotFound {
            subject: subject.to_string(),
        };
    }

    let latest = match registry.latest_schema(subject).await {
        Ok(latest) => latest,
        Err(e) => {
            tracing::error!("Error fetching latest schema for '{subject}': {e}");
            return Freshness::Failed {
                reason: e.to_string(),
            };
        }
    };

    let remote = match RecordSchema::parse(&latest.schema) {
        Ok(remote) => remote,
        Err(e) => {
            tracing::error!("Latest schema for '{subject}' does not parse: {e}");
            return Freshness::Failed {
                reason: e.to_string(),
            };
        }
    };

    if remote.same_as(local) {
        tracing::info!("Schemas match: latest schema is up-to-date.");
        return Freshness::UpToDate {
            version: latest.version,
        };
    }

    tracing::warn!("Schemas do not match: latest schema and current schema differ.");
    match (remote.to_pretty_json(), local.to_pretty_json()) {
        (Ok(latest), Ok(current)) => Freshness::Outdated { latest, current },
        (Err(e), _) | (_, Err(e)) => Freshness::Failed {
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RegisteredSchema;
    use crate::error::{RegistryError, Result};
    use async_trait::async_trait;
    use order_schema::CompatibilityLevel;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory registry holding at most one subject.
    struct FakeRegistry {
        subject: Option<(String, String)>,
        latest_calls: AtomicUsize,
        fail_subjects: bool,
    }

    impl FakeRegistry {
        fn empty() -> Self {
            Self {
                subject: None,
                latest_calls: AtomicUsize::new(0),
                fail_subjects: false,
            }
        }

        fn with(subject: &str, schema: &str) -> Self {
            Self {
                subject: Some((subject.to_string(), schema.to_string())),
                ..Self::empty()
            }
        }
    }

    #[async_trait]
    impl SchemaRegistry for FakeRegistry {
        async fn subjects(&self) -> Result<Vec<String>> {
            if self.fail_subjects {
                return Err(RegistryError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(self.subject.iter().map(|(s, _)| s.clone()).collect())
        }

        async fn latest_schema(&self, subject: &str) -> Result<RegisteredSchema> {
            self.latest_calls.fetch_add(1, Ordering::SeqCst);
            match &self.subject {
                Some((s, schema)) if s == subject => Ok(RegisteredSchema {
                    subject: s.clone(),
                    version: 1,
                    id: 1,
                    schema: schema.clone(),
                }),
                _ => Err(RegistryError::SubjectNotFound(subject.to_string())),
            }
        }

        async fn schema_by_id(&self, id: u32) -> Result<String> {
            Err(RegistryError::SchemaNotFound(id))
        }

        async fn register_schema(&self, _subject: &str, _schema: &str) -> Result<u32> {
            Ok(1)
        }

        async fn compatibility_level(&self, _subject: &str) -> Result<CompatibilityLevel> {
            Ok(CompatibilityLevel::DEFAULT)
        }
    }

    fn local() -> RecordSchema {
        RecordSchema::order().unwrap()
    }

    #[tokio::test]
    async fn test_subject_absent_skips_comparison() {
        let registry = FakeRegistry::with("payments-value", order_schema::ORDER_SCHEMA_JSON);
        let outcome = check_freshness(&registry, "orders-value", &local()).await;

        assert_eq!(
            outcome,
            Freshness::SubjectNotFound {
                subject: "orders-value".to_string()
            }
        );
        assert_eq!(registry.latest_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_up_to_date() {
        let registry = FakeRegistry::with("orders-value", order_schema::ORDER_SCHEMA_JSON);
        let outcome = check_freshness(&registry, "orders-value", &local()).await;
        assert_eq!(outcome, Freshness::UpToDate { version: 1 });
        assert_eq!(outcome.message(), "✅ Schema is up-to-date.");
    }

    #[tokio::test]
    async fn test_outdated_carries_both_schemas() {
        let remote = r#"{"type":"record","name":"Order","namespace":"com.example.kafka","fields":[{"name":"id","type":"string"}]}"#;
        let registry = FakeRegistry::with("orders-value", remote);
        let outcome = check_freshness(&registry, "orders-value", &local()).await;

        match outcome {
            Freshness::Outdated { latest, current } => {
                assert!(!latest.contains("order_status"));
                assert!(current.contains("order_status"));
            }
            other => panic!("Expected Outdated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_changed_default_is_outdated() {
        let remote = order_schema::ORDER_SCHEMA_JSON.replace(r#""default": "USD""#, r#""default": "EUR""#);
        let registry = FakeRegistry::with("orders-value", &remote);
        let outcome = check_freshness(&registry, "orders-value", &local()).await;

        match outcome {
            Freshness::Outdated { latest, current } => {
                assert!(latest.contains("EUR"));
                assert!(current.contains("USD"));
            }
            other => panic!("Expected Outdated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registry_failure_is_an_outcome() {
        let registry = FakeRegistry {
            fail_subjects: true,
            ..FakeRegistry::empty()
        };
        let outcome = check_freshness(&registry, "orders-value", &local()).await;
        assert!(matches!(outcome, Freshness::Failed { .. }));
        assert!(outcome.message().starts_with("Error checking schema:"));
    }
}
