use crate::{KafkaOpts, RegistryOpts};
use anyhow::Context;
use order_consumer::{listen, serve_status, StatusState};
use order_kafka::{ListenerConfig, OrderListener};
use order_registry::SchemaRegistry;
use order_schema::RecordSchema;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

/// Print received orders and serve the schema status endpoint until Ctrl-C.
pub async fn run_consume(
    kafka: KafkaOpts,
    registry: RegistryOpts,
    schema: RecordSchema,
    group_id: String,
    status_addr: SocketAddr,
) -> anyhow::Result<()> {
    let client: Arc<dyn SchemaRegistry> = Arc::new(registry.client()?);
    let schema = Arc::new(schema);

    let status = StatusState {
        registry: Arc::clone(&client),
        subject: registry.subject_for(&kafka.topic),
        schema: Arc::clone(&schema),
    };
    let status_task = tokio::spawn(serve_status(status_addr, status));

    let config = ListenerConfig {
        brokers: kafka.bootstrap_servers.clone(),
        group_id,
        topic: kafka.topic.clone(),
        ..Default::default()
    };
    let listener = OrderListener::new(&config, schema.as_ref().clone(), client)
        .context("Failed to start Kafka consumer")?;

    let mut stdout = io::stdout();
    tokio::select! {
        result = listen(&listener, &mut stdout) => result?,
        result = status_task => result.context("Status endpoint task panicked")??,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            println!("Consumer closed");
        }
    }

    Ok(())
}
