//! The producer's main loop.

use crate::builder::{BuildError, RecordBuilder, TerminalPrompter};
use anyhow::Context;
use order_kafka::{PartitionLeader, Publisher};
use order_schema::RecordSchema;
use std::io::{BufRead, Write};
use tokio::runtime::{Handle, RuntimeFlavor};

/// Typed at the "create new order" prompt to end the session (any case).
pub const EXIT_SENTINEL: &str = "exit";

/// Field whose value becomes the message key.
pub const KEY_FIELD: &str = "id";

const NEXT_ORDER_PROMPT: &str = "Create new order? (Enter | 'exit'): ";
const SEPARATOR_WIDTH: usize = 50;

/// Counts of what happened during a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Print the partition leaders found by the connectivity probe.
pub fn report_leaders<W: Write>(topic: &str, leaders: &[PartitionLeader], out: &mut W) -> std::io::Result<()> {
    writeln!(out, "✅ Connected to Kafka. Topic '{topic}' partitions:")?;
    for leader in leaders {
        writeln!(out, "   Leader for {leader}")?;
    }
    Ok(())
}

/// Run a blocking read of operator input.
///
/// On a multi-threaded runtime the worker hands its other tasks off while
/// the read blocks. A current-thread runtime has nowhere to hand them, so the
/// read runs inline there.
fn blocking_input<T>(read: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(read)
        }
        _ => read(),
    }
}

/// Prompt for orders and publish them until the operator exits or input ends.
///
/// A failed send is written with its cause to `errors` and the loop moves on
/// to the next order.
pub async fn run_session<R, W, E, P>(
    schema: &RecordSchema,
    publisher: &P,
    prompter: &mut TerminalPrompter<R, W>,
    errors: &mut E,
) -> anyhow::Result<SessionSummary>
where
    R: BufRead,
    W: Write,
    E: Write,
    P: Publisher + ?Sized,
{
    let builder = RecordBuilder::new(schema);
    let mut summary = SessionSummary::default();

    loop {
        let answer = blocking_input(|| prompter.ask(NEXT_ORDER_PROMPT))
            .context("Failed to read from input")?;
        match answer {
            None => break,
            Some(a) if a.trim().eq_ignore_ascii_case(EXIT_SENTINEL) => break,
            Some(_) => {}
        }

        let record = match blocking_input(|| prompter.build_record(&builder)) {
            Ok(record) => record,
            Err(BuildError::InputClosed { field }) => {
                tracing::info!("Input closed while reading '{field}', ending session");
                break;
            }
            Err(e) => return Err(e).context("Failed to build order"),
        };

        let key = record.get_str(KEY_FIELD).unwrap_or_default().to_string();
        match publisher.send(&key, &record).await {
            Ok(report) => {
                summary.sent += 1;
                let out = prompter.output();
                writeln!(
                    out,
                    "\n✅ Order sent to partition {} at offset {}",
                    report.partition, report.offset
                )?;
                writeln!(out, "{}", "=".repeat(SEPARATOR_WIDTH))?;
            }
            Err(e) => {
                summary.failed += 1;
                tracing::warn!("Send failed for order '{key}': {e}");
                writeln!(errors, "\n❌ Error sending order: {:#}", anyhow::Error::new(e))?;
                errors.flush()?;
            }
        }
    }

    Ok(summary)
}
