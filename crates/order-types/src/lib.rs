//! Text conversions for order-schema values.
//!
//! This crate provides conversions between operator-typed text and
//! order-schema's `Value`.
//!
//! # Modules
//!
//! - [`reverse`] - raw text → `Value` (the field value converter)
//! - [`forward`] - `Value` → display text, prompt labels
//!
//! # Example
//!
//! ```ignore
//! use order_schema::FieldType;
//! use order_types::{convert, display_value};
//!
//! let value = convert("42", &FieldType::Int).unwrap();
//! assert_eq!(value.to_string(), "42");
//! ```

pub mod forward;
pub mod reverse;

pub use forward::{display_default, display_value, prompt_label, COMPLEX_PLACEHOLDER, NULL_PLACEHOLDER};
pub use reverse::{convert, convert_field, default_value, parse_boolean, ValidationError};
