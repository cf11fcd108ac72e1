//! Subcommand implementations.

pub mod consume;
pub mod produce;
pub mod schema;

pub use consume::run_consume;
pub use produce::run_produce;
pub use schema::{check_compat, print_diff, run_check_compat, run_diff, run_status};
