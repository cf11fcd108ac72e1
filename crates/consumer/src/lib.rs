//! Order consumer.
//!
//! - [`display`] prints received records field by field
//! - [`status`] serves `GET /schema-status`, comparing the local schema with
//!   the registry's latest version

pub mod display;
pub mod status;

pub use display::{format_record, listen, print_received, SEPARATOR};
pub use status::{router, serve_status, StatusState};
