use anyhow::Context;
use order_kafka::{OrderListener, ReceivedRecord};
use order_schema::{Record, RecordSchema, Value};
use order_types::display_value;
use std::io::Write;

pub const HEADER: &str = "📥 Received order:";
pub const SEPARATOR: &str = "-------------------------------------";

/// Render a record as `name: value` lines in schema order.
///
/// Fields are looked up through `schema` so null values can fall back to
/// the declared default.
pub fn format_record(schema: &RecordSchema, record: &Record) -> String {
    let mut text = String::new();
    for field in schema.fields() {
        let shown = match record.get(&field.name) {
            Some(value) => display_value(field, value),
            None => display_value(field, &Value::Null),
        };
        text.push_str(&format!("{}: {shown}\n", field.name));
    }
    text
}

pub fn print_received<W: Write>(
    schema: &RecordSchema,
    received: &ReceivedRecord,
    out: &mut W,
) -> std::io::Result<()> {
    writeln!(out, "{HEADER}")?;
    write!(out, "{}", format_record(schema, &received.record))?;
    writeln!(out, "{SEPARATOR}")?;
    out.flush()
}

/// Print every record the listener yields. Runs until the listener fails
/// with a non-message error.
pub async fn listen<W: Write>(listener: &OrderListener, out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "🔄 Listening for new orders...")?;

    loop {
        match listener.recv().await {
            Ok(received) => {
                tracing::debug!(
                    "Received '{}' from partition {} at offset {} (schema {})",
                    received.key.as_deref().unwrap_or_default(),
                    received.partition,
                    received.offset,
                    received.schema_id
                );
                print_received(listener.reader_schema(), &received, out)
                    .context("Failed to print record")?;
            }
            Err(e) if e.is_message_error() => {
                tracing::warn!("Skipping undecodable message: {e}");
            }
            Err(e) => {
                tracing::error!("Error receiving message: {e}");
                return Err(e).context("Listener stopped");
            }
        }
    }
}
