use crate::avro::codec::encode_record;
use crate::avro::wire::frame;
use crate::error::{Error, Result};
use async_trait::async_trait;
use order_registry::SchemaRegistry;
use order_schema::{Record, RecordSchema};
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::metadata::Metadata;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Configuration for the Kafka publisher
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// Topic every record is published to
    pub topic: String,
    /// Registry subject the writer schema is registered under
    pub subject: String,
    /// How long a send may wait for delivery before failing
    pub message_timeout: Duration,
    /// Required acknowledgments ("all" waits for every in-sync replica)
    pub acks: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            topic: "orders".to_string(),
            subject: "orders-value".to_string(),
            message_timeout: Duration::from_secs(5),
            acks: "all".to_string(),
        }
    }
}

impl PublisherConfig {
    pub fn new(brokers: impl Into<String>, topic: impl Into<String>) -> Self {
        let topic = topic.into();
        Self {
            brokers: brokers.into(),
            subject: format!("{topic}-value"),
            topic,
            ..Self::default()
        }
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("acks", &self.acks)
            .set(
                "message.timeout.ms",
                self.message_timeout.as_millis().to_string(),
            );
        config
    }
}

/// Where a record landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub partition: i32,
    pub offset: i64,
}

/// Leader of one topic partition, as reported by the connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionLeader {
    pub partition: i32,
    pub broker_id: i32,
    pub host: String,
    pub port: i32,
}

impl fmt::Display for PartitionLeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition {} -> {}:{}", self.partition, self.host, self.port)
    }
}

/// Sends one record at a time and waits for its acknowledgment.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn send(&self, key: &str, record: &Record) -> Result<DeliveryReport>;
}

/// Publishes Confluent-framed Avro records to a single topic.
pub struct KafkaPublisher {
    producer: FutureProducer,
    registry: Arc<dyn SchemaRegistry>,
    schema: RecordSchema,
    config: PublisherConfig,
    schema_id: OnceCell<u32>,
}

impl KafkaPublisher {
    pub fn new(
        config: PublisherConfig,
        schema: RecordSchema,
        registry: Arc<dyn SchemaRegistry>,
    ) -> Result<Self> {
        if config.topic.is_empty() {
            return Err(Error::InvalidConfig("topic must not be empty".to_string()));
        }

        let producer: FutureProducer = config.client_config().create()?;

        Ok(Self {
            producer,
            registry,
            schema,
            config,
            schema_id: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Fetch the topic's metadata and report the leader of every partition.
    ///
    /// Fails with [`Error::Connectivity`] when the brokers cannot be reached
    /// or the topic has no available partitions.
    pub async fn probe(&self) -> Result<Vec<PartitionLeader>> {
        let producer = self.producer.clone();
        let topic = self.config.topic.clone();
        let timeout = self.config.message_timeout;

        // librdkafka metadata requests block the calling thread
        tokio::task::spawn_blocking(move || {
            let metadata = producer
                .client()
                .fetch_metadata(Some(&topic), timeout)
                .map_err(|e| Error::Connectivity(e.to_string()))?;
            partition_leaders(&metadata, &topic)
        })
        .await
        .map_err(|e| Error::Connectivity(format!("metadata request aborted: {e}")))?
    }

    /// Create the topic if it does not exist yet.
    pub async fn ensure_topic(&self, partitions: i32) -> Result<()> {
        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.config.brokers)
            .create()?;

        let new_topic = NewTopic::new(&self.config.topic, partitions, TopicReplication::Fixed(1));
        let opts = AdminOptions::new().operation_timeout(Some(self.config.message_timeout));

        let results = admin_client
            .create_topics(&[new_topic], &opts)
            .await
            .map_err(|e| Error::Connectivity(format!("Failed to create topics: {e}")))?;

        for result in results {
            match result {
                Ok(topic_name) => {
                    tracing::info!("Topic '{topic_name}' created successfully");
                }
                Err((topic_name, err)) => {
                    if err == rdkafka::types::RDKafkaErrorCode::TopicAlreadyExists {
                        tracing::info!("Topic '{topic_name}' already exists");
                    } else {
                        return Err(Error::InvalidConfig(format!(
                            "Failed to create topic '{topic_name}': {err}"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Wait for outstanding deliveries.
    pub fn flush(&self) -> Result<()> {
        self.producer
            .flush(Timeout::After(self.config.message_timeout))?;
        Ok(())
    }

    /// Registry id of the writer schema, registering it on first use.
    async fn schema_id(&self) -> Result<u32> {
        let id = self
            .schema_id
            .get_or_try_init(|| async {
                let json = self.schema.to_json()?;
                let id = self
                    .registry
                    .register_schema(&self.config.subject, &json)
                    .await?;
                tracing::info!(
                    "Registered schema {} under subject '{}' with id {id}",
                    self.schema.full_name(),
                    self.config.subject
                );
                Ok::<u32, Error>(id)
            })
            .await?;
        Ok(*id)
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn send(&self, key: &str, record: &Record) -> Result<DeliveryReport> {
        let schema_id = self.schema_id().await?;
        let datum = encode_record(&self.schema, record)?;
        let payload = frame(schema_id, &datum);

        let (partition, offset) = self
            .producer
            .send(
                FutureRecord::to(&self.config.topic)
                    .key(key)
                    .payload(&payload),
                Timeout::After(self.config.message_timeout),
            )
            .await
            .map_err(|(err, _)| err)?;

        tracing::debug!(
            "Delivered record '{key}' to {}[{partition}] at offset {offset}",
            self.config.topic
        );

        Ok(DeliveryReport { partition, offset })
    }
}

fn partition_leaders(metadata: &Metadata, topic: &str) -> Result<Vec<PartitionLeader>> {
    let topic_metadata = metadata
        .topics()
        .iter()
        .find(|t| t.name() == topic)
        .ok_or_else(|| Error::Connectivity(format!("topic '{topic}' not found in metadata")))?;

    if let Some(err) = topic_metadata.error() {
        return Err(Error::Connectivity(format!(
            "topic '{topic}' unavailable: {err:?}"
        )));
    }

    let mut leaders = Vec::with_capacity(topic_metadata.partitions().len());
    for partition in topic_metadata.partitions() {
        let broker = metadata
            .brokers()
            .iter()
            .find(|b| b.id() == partition.leader())
            .ok_or_else(|| {
                Error::Connectivity(format!(
                    "partition {} of '{topic}' has no available leader",
                    partition.id()
                ))
            })?;
        leaders.push(PartitionLeader {
            partition: partition.id(),
            broker_id: broker.id(),
            host: broker.host().to_string(),
            port: broker.port(),
        });
    }

    if leaders.is_empty() {
        return Err(Error::Connectivity(format!(
            "topic '{topic}' has no partitions"
        )));
    }

    Ok(leaders)
}
