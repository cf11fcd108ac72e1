use crate::{KafkaOpts, RegistryOpts};
use anyhow::Context;
use order_kafka::{KafkaPublisher, PublisherConfig};
use order_producer::{report_leaders, run_session, TerminalPrompter};
use order_schema::RecordSchema;
use std::io;
use std::sync::Arc;

/// Probe the brokers, then prompt for orders until the operator exits.
///
/// A failed probe is fatal; failed sends are reported on stderr and the
/// session goes on.
pub async fn run_produce(
    kafka: KafkaOpts,
    registry: RegistryOpts,
    schema: RecordSchema,
    create_topic: Option<i32>,
) -> anyhow::Result<()> {
    let mut config = PublisherConfig::new(&kafka.bootstrap_servers, &kafka.topic);
    config.subject = registry.subject_for(&kafka.topic);
    config.message_timeout = kafka.message_timeout;

    let publisher = KafkaPublisher::new(config, schema.clone(), Arc::new(registry.client()?))
        .context("Failed to create Kafka producer")?;

    if let Some(partitions) = create_topic {
        publisher
            .ensure_topic(partitions)
            .await
            .with_context(|| format!("Failed to create topic '{}'", kafka.topic))?;
    }

    let leaders = publisher
        .probe()
        .await
        .context("Kafka connectivity check failed")?;
    report_leaders(&kafka.topic, &leaders, &mut io::stdout().lock())?;

    let stdin = io::stdin();
    let mut prompter = TerminalPrompter::new(stdin.lock(), io::stdout());
    let summary = run_session(&schema, &publisher, &mut prompter, &mut io::stderr()).await?;
    tracing::info!(
        "Session finished: {} sent, {} failed",
        summary.sent,
        summary.failed
    );

    publisher.flush().context("Failed to flush producer")?;
    println!("Producer closed");
    Ok(())
}
