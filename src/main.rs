//! Command-line interface for order-stream
//!
//! # Usage Examples
//!
//! ## Producer
//! ```bash
//! # Interactive producer; creates the topic with 3 partitions if missing
//! order-stream produce \
//!   --bootstrap-servers localhost:9092 \
//!   --topic orders \
//!   --create-topic 3
//! ```
//!
//! ## Consumer
//! ```bash
//! order-stream consume \
//!   --bootstrap-servers localhost:9092 \
//!   --schema-registry-url http://localhost:8081 \
//!   --status-addr 0.0.0.0:8080
//!
//! curl -i http://localhost:8080/schema-status
//! ```
//!
//! ## Schema Evolution
//! ```bash
//! order-stream schema diff old.avsc new.avsc
//! order-stream schema check-compat old.avsc new.avsc --subject orders-value
//! order-stream schema status
//! ```

use clap::{Parser, Subcommand};
use order_stream::commands;
use order_stream::{KafkaOpts, RegistryOpts, SchemaOpts};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "order-stream")]
#[command(about = "Produce and consume Avro-encoded orders on Kafka")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prompt for orders and publish each one to Kafka
    Produce {
        #[command(flatten)]
        kafka: KafkaOpts,

        #[command(flatten)]
        registry: RegistryOpts,

        #[command(flatten)]
        schema: SchemaOpts,

        /// Create the topic with this many partitions if it does not exist
        #[arg(long, value_name = "PARTITIONS")]
        create_topic: Option<i32>,
    },

    /// Print received orders and serve GET /schema-status
    Consume {
        #[command(flatten)]
        kafka: KafkaOpts,

        #[command(flatten)]
        registry: RegistryOpts,

        #[command(flatten)]
        schema: SchemaOpts,

        /// Consumer group ID
        #[arg(long, default_value = "order-consumer-group")]
        group_id: String,

        /// Address the schema status endpoint listens on
        #[arg(long, default_value = "0.0.0.0:8080")]
        status_addr: SocketAddr,
    },

    /// Schema evolution tooling
    Schema {
        #[command(subcommand)]
        command: SchemaCommand,
    },
}

#[derive(Subcommand)]
enum SchemaCommand {
    /// Show field-level differences between two schema files
    Diff {
        /// Previous schema version (.avsc)
        old: PathBuf,
        /// New schema version (.avsc)
        new: PathBuf,
    },

    /// Check a schema change against the registry's compatibility level
    CheckCompat {
        /// Previous schema version (.avsc)
        old: PathBuf,
        /// New schema version (.avsc)
        new: PathBuf,

        #[command(flatten)]
        registry: RegistryOpts,

        /// Topic whose "<topic>-value" subject is checked
        #[arg(long, default_value = "orders", env = "KAFKA_TOPIC")]
        topic: String,
    },

    /// Compare the local schema with the latest registered version
    Status {
        #[command(flatten)]
        registry: RegistryOpts,

        #[command(flatten)]
        schema: SchemaOpts,

        /// Topic whose "<topic>-value" subject is checked
        #[arg(long, default_value = "orders", env = "KAFKA_TOPIC")]
        topic: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Produce {
            kafka,
            registry,
            schema,
            create_topic,
        } => {
            let schema = schema.load()?;
            commands::run_produce(kafka, registry, schema, create_topic).await?;
        }
        Commands::Consume {
            kafka,
            registry,
            schema,
            group_id,
            status_addr,
        } => {
            let schema = schema.load()?;
            commands::run_consume(kafka, registry, schema, group_id, status_addr).await?;
        }
        Commands::Schema { command } => match command {
            SchemaCommand::Diff { old, new } => commands::run_diff(&old, &new)?,
            SchemaCommand::CheckCompat {
                old,
                new,
                registry,
                topic,
            } => commands::run_check_compat(&old, &new, &registry, &topic).await?,
            SchemaCommand::Status {
                registry,
                schema,
                topic,
            } => {
                let local = schema.load()?;
                let client = registry.client()?;
                commands::run_status(&client, &registry.subject_for(&topic), &local).await?;
            }
        },
    }

    Ok(())
}
