//! Interactive order producer.
//!
//! - [`builder`] walks a record schema field by field, converting operator
//!   input and applying null/default rules
//! - [`session`] drives the "create order, send, report" loop against a
//!   [`Publisher`](order_kafka::Publisher)

pub mod builder;
pub mod session;

pub use builder::{BuildError, FieldPrompter, RecordBuilder, TerminalPrompter};
pub use session::{report_leaders, run_session, SessionSummary, EXIT_SENTINEL, KEY_FIELD};
