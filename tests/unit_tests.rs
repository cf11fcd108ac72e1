use clap::Parser;
use order_stream::{KafkaOpts, RegistryOpts, SchemaOpts};
use std::io::Write;
use std::time::Duration;

#[derive(Parser)]
struct TestCli {
    #[command(flatten)]
    kafka: KafkaOpts,

    #[command(flatten)]
    registry: RegistryOpts,

    #[command(flatten)]
    schema: SchemaOpts,
}

#[test]
fn test_kafka_opts_from_flags() {
    let cli = TestCli::parse_from([
        "test",
        "--bootstrap-servers",
        "kafka:29092",
        "--topic",
        "eu-orders",
        "--message-timeout",
        "1m",
    ]);

    assert_eq!(cli.kafka.bootstrap_servers, "kafka:29092");
    assert_eq!(cli.kafka.topic, "eu-orders");
    assert_eq!(cli.kafka.message_timeout, Duration::from_secs(60));
}

#[test]
fn test_subject_defaults_to_topic_value() {
    let opts = RegistryOpts {
        schema_registry_url: "http://localhost:8081".to_string(),
        subject: None,
    };
    assert_eq!(opts.subject_for("orders"), "orders-value");

    let opts = RegistryOpts {
        subject: Some("custom".to_string()),
        ..opts
    };
    assert_eq!(opts.subject_for("orders"), "custom");
}

#[test]
fn test_invalid_message_timeout_rejected() {
    let result = TestCli::try_parse_from(["test", "--message-timeout", "soon"]);
    assert!(result.is_err());
}

#[test]
fn test_registry_client_requires_http_url() {
    let opts = RegistryOpts {
        schema_registry_url: "localhost:8081".to_string(),
        subject: None,
    };
    assert!(opts.client().is_err());
}

#[test]
fn test_builtin_schema_loads() {
    let schema = SchemaOpts::default().load().unwrap();
    assert_eq!(schema.full_name(), "com.example.kafka.Order");
    assert_eq!(schema.fields().len(), 12);
}

#[test]
fn test_schema_file_override() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"type": "record", "name": "Refund", "namespace": "com.example.kafka",
            "fields": [{{"name": "id", "type": "string"}}]}}"#
    )
    .unwrap();

    let opts = SchemaOpts {
        schema_file: Some(file.path().to_path_buf()),
    };
    let schema = opts.load().unwrap();
    assert_eq!(schema.name, "Refund");
    assert_eq!(schema.field_names(), vec!["id"]);
}

#[test]
fn test_missing_schema_file_reports_path() {
    let opts = SchemaOpts {
        schema_file: Some("/nonexistent/order.avsc".into()),
    };
    let err = opts.load().unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/order.avsc"));
}
