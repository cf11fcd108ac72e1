use crate::avro::codec::decode_record;
use crate::avro::wire::unframe;
use crate::error::{Error, Result};
use apache_avro::Schema as AvroSchema;
use order_registry::SchemaRegistry;
use order_schema::{Record, RecordSchema};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer as RdkafkaConsumer, StreamConsumer as RdkafkaStreamConsumer};
use rdkafka::message::Message as RdkafkaMessage;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Configuration for the order listener
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// Consumer group ID
    pub group_id: String,
    /// Topic to consume from
    pub topic: String,
    /// Auto offset reset strategy ("earliest" or "latest")
    ///
    /// "earliest" replays the topic from the beginning when the group has
    /// no committed offsets yet.
    pub auto_offset_reset: String,
    /// Session timeout in milliseconds
    pub session_timeout_ms: String,
    /// Commit offsets in the background as messages are received
    pub enable_auto_commit: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "order-consumer-group".to_string(),
            topic: "orders".to_string(),
            auto_offset_reset: "earliest".to_string(),
            session_timeout_ms: "6000".to_string(),
            enable_auto_commit: true,
        }
    }
}

/// A decoded record together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedRecord {
    /// Message key (the order id), if any
    pub key: Option<String>,
    pub partition: i32,
    pub offset: i64,
    /// Registry id of the schema the record was written with
    pub schema_id: u32,
    pub record: Record,
}

/// Writer schemas fetched from the registry, memoized by id.
///
/// Payloads are decoded against the local reader schema, so records written
/// with an older or newer compatible schema resolve to the local field set.
pub struct WriterSchemas {
    registry: Arc<dyn SchemaRegistry>,
    reader: RecordSchema,
    cache: Mutex<HashMap<u32, Arc<AvroSchema>>>,
}

impl WriterSchemas {
    pub fn new(registry: Arc<dyn SchemaRegistry>, reader: RecordSchema) -> Self {
        Self {
            registry,
            reader,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn reader(&self) -> &RecordSchema {
        &self.reader
    }

    /// Writer schema for `id`, asking the registry only on first sight.
    pub async fn get(&self, id: u32) -> Result<Arc<AvroSchema>> {
        let mut cache = self.cache.lock().await;
        if let Some(schema) = cache.get(&id) {
            return Ok(Arc::clone(schema));
        }

        let text = self.registry.schema_by_id(id).await?;
        let schema = Arc::new(AvroSchema::parse_str(&text)?);
        tracing::debug!("Cached writer schema {id}");
        cache.insert(id, Arc::clone(&schema));
        Ok(schema)
    }

    /// Unframe and decode a message payload.
    pub async fn decode(&self, payload: &[u8]) -> Result<(u32, Record)> {
        let (schema_id, datum) = unframe(payload)?;
        let writer = self.get(schema_id).await?;
        let record = decode_record(&writer, &self.reader, datum)?;
        Ok((schema_id, record))
    }
}

/// Consumer-group member yielding decoded order records.
pub struct OrderListener {
    consumer: RdkafkaStreamConsumer,
    schemas: WriterSchemas,
}

impl OrderListener {
    /// Create the consumer and subscribe to the configured topic.
    pub fn new(
        config: &ListenerConfig,
        reader: RecordSchema,
        registry: Arc<dyn SchemaRegistry>,
    ) -> Result<Self> {
        let consumer: RdkafkaStreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", config.enable_auto_commit.to_string())
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("session.timeout.ms", &config.session_timeout_ms)
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| Error::Consumer(format!("Failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[&config.topic])
            .map_err(|e| Error::Consumer(format!("Failed to subscribe to topic: {e}")))?;

        tracing::info!(
            "Subscribed to '{}' as group '{}'",
            config.topic,
            config.group_id
        );

        Ok(Self {
            consumer,
            schemas: WriterSchemas::new(registry, reader),
        })
    }

    pub fn reader_schema(&self) -> &RecordSchema {
        self.schemas.reader()
    }

    /// Wait for the next message and decode it.
    ///
    /// A message that cannot be decoded yields an error for which
    /// [`Error::is_message_error`] holds; the listener stays usable.
    pub async fn recv(&self) -> Result<ReceivedRecord> {
        let msg = self
            .consumer
            .recv()
            .await
            .map_err(|e| Error::Consumer(format!("Error receiving message: {e}")))?
            .detach();

        let payload = msg
            .payload()
            .ok_or_else(|| Error::InvalidFrame("message has no payload".to_string()))?;
        let (schema_id, record) = self.schemas.decode(payload).await?;

        Ok(ReceivedRecord {
            key: msg.key().map(|k| String::from_utf8_lossy(k).into_owned()),
            partition: msg.partition(),
            offset: msg.offset(),
            schema_id,
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avro::codec::encode_record;
    use crate::avro::wire::frame;
    use async_trait::async_trait;
    use order_registry::{RegisteredSchema, RegistryError};
    use order_schema::{CompatibilityLevel, Order, OrderStatus, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRegistry {
        schemas: HashMap<u32, String>,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl SchemaRegistry for FixedRegistry {
        async fn subjects(&self) -> order_registry::Result<Vec<String>> {
            Ok(vec![])
        }

        async fn latest_schema(&self, subject: &str) -> order_registry::Result<RegisteredSchema> {
            Err(RegistryError::SubjectNotFound(subject.to_string()))
        }

        async fn schema_by_id(&self, id: u32) -> order_registry::Result<String> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.schemas
                .get(&id)
                .cloned()
                .ok_or(RegistryError::SchemaNotFound(id))
        }

        async fn register_schema(&self, _subject: &str, _schema: &str) -> order_registry::Result<u32> {
            Ok(1)
        }

        async fn compatibility_level(&self, _subject: &str) -> order_registry::Result<CompatibilityLevel> {
            Ok(CompatibilityLevel::DEFAULT)
        }
    }

    fn order() -> Order {
        Order {
            id: "B7".to_string(),
            customer_name: "Bo".to_string(),
            nationality: Some("SE".to_string()),
            email: "bo@example.com".to_string(),
            total_price: 4.25,
            product: None,
            quantity: None,
            discount: Some(10),
            is_gift: false,
            currency: "USD".to_string(),
            payment_method: None,
            order_status: OrderStatus::Pending,
        }
    }

    fn schemas() -> (WriterSchemas, Arc<FixedRegistry>) {
        let schema = RecordSchema::order().unwrap();
        let registry = Arc::new(FixedRegistry {
            schemas: HashMap::from([(3, schema.to_json().unwrap())]),
            lookups: AtomicUsize::new(0),
        });
        (WriterSchemas::new(registry.clone(), schema), registry)
    }

    #[tokio::test]
    async fn test_decode_framed_payload() {
        let (schemas, _) = schemas();
        let datum = encode_record(schemas.reader(), &Record::from(&order())).unwrap();

        let (id, record) = schemas.decode(&frame(3, &datum)).await.unwrap();
        assert_eq!(id, 3);
        assert_eq!(record.get("quantity"), Some(&Value::Null));
        assert_eq!(Order::try_from(&record).unwrap(), order());
    }

    #[tokio::test]
    async fn test_writer_schema_fetched_once_per_id() {
        let (schemas, registry) = schemas();
        let payload = frame(3, &encode_record(schemas.reader(), &Record::from(&order())).unwrap());

        schemas.decode(&payload).await.unwrap();
        schemas.decode(&payload).await.unwrap();
        assert_eq!(registry.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_schema_id_is_a_message_error() {
        let (schemas, _) = schemas();
        let err = schemas.decode(&frame(99, &[])).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Registry(RegistryError::SchemaNotFound(99))
        ));
        assert!(err.is_message_error());
    }

    #[tokio::test]
    async fn test_garbage_payload_is_a_message_error() {
        let (schemas, _) = schemas();
        let err = schemas.decode(b"not avro").await.unwrap_err();
        assert!(matches!(err, Error::InvalidFrame(_)));
        assert!(err.is_message_error());
    }

    #[test]
    fn test_listener_config_defaults() {
        let config = ListenerConfig::default();
        assert_eq!(config.group_id, "order-consumer-group");
        assert_eq!(config.auto_offset_reset, "earliest");
        assert!(config.enable_auto_commit);
    }
}
