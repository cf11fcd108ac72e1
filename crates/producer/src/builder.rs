//! Schema-driven record construction from operator input.

use order_schema::{FieldDescriptor, FieldValueMap, Record, RecordSchema, SchemaError, Value};
use order_types::{convert_field, default_value, prompt_label, ValidationError};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    /// Input ended before every field was resolved
    #[error("input closed while reading field '{field}'")]
    InputClosed { field: String },

    /// The schema declares a default the field's type cannot hold
    #[error(transparent)]
    InvalidDefault(ValidationError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Source of raw field input and sink for validation errors.
pub trait FieldPrompter {
    /// Next raw answer for `field`, or `None` once input is closed.
    fn prompt(&mut self, field: &FieldDescriptor) -> Option<String>;

    /// Tell the operator why the last answer for `field` was rejected.
    fn report(&mut self, field: &FieldDescriptor, error: &ValidationError);
}

struct FnPrompter<P, R> {
    prompt_fn: P,
    report_fn: R,
}

impl<P, R> FieldPrompter for FnPrompter<P, R>
where
    P: FnMut(&FieldDescriptor) -> Option<String>,
    R: FnMut(&FieldDescriptor, &ValidationError),
{
    fn prompt(&mut self, field: &FieldDescriptor) -> Option<String> {
        (self.prompt_fn)(field)
    }

    fn report(&mut self, field: &FieldDescriptor, error: &ValidationError) {
        (self.report_fn)(field, error)
    }
}

/// Builds one record per call by resolving every field in schema order.
pub struct RecordBuilder<'a> {
    schema: &'a RecordSchema,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(schema: &'a RecordSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &RecordSchema {
        self.schema
    }

    /// Build a record from closures.
    ///
    /// `prompt_fn` is called until the field resolves; `report_fn` receives
    /// every rejected answer.
    pub fn build<P, R>(&self, prompt_fn: P, report_fn: R) -> Result<Record, BuildError>
    where
        P: FnMut(&FieldDescriptor) -> Option<String>,
        R: FnMut(&FieldDescriptor, &ValidationError),
    {
        self.build_with(&mut FnPrompter {
            prompt_fn,
            report_fn,
        })
    }

    /// Build a record, asking `prompter` for each field in schema order.
    pub fn build_with<F: FieldPrompter + ?Sized>(&self, prompter: &mut F) -> Result<Record, BuildError> {
        let mut values = FieldValueMap::new();
        for field in self.schema.fields() {
            let value = self.resolve(field, prompter)?;
            values.insert(field.name.clone(), value);
        }
        Ok(values.into_record(self.schema)?)
    }

    fn resolve<F: FieldPrompter + ?Sized>(
        &self,
        field: &FieldDescriptor,
        prompter: &mut F,
    ) -> Result<Value, BuildError> {
        loop {
            let raw = prompter.prompt(field).ok_or_else(|| BuildError::InputClosed {
                field: field.name.clone(),
            })?;
            let input = raw.trim();

            if input.is_empty() {
                if field.is_nullable() {
                    return Ok(Value::Null);
                }
                if field.default.as_ref().is_some_and(|d| !d.is_null()) {
                    if let Some(default) = default_value(field) {
                        return default.map_err(BuildError::InvalidDefault);
                    }
                }
                prompter.report(field, &ValidationError::RequiredField);
                continue;
            }

            match convert_field(input, field) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::debug!("Rejected input for '{}': {e}", field.name);
                    prompter.report(field, &e);
                }
            }
        }
    }
}

/// Line-oriented prompter over any reader/writer pair.
///
/// The field label is printed once per field; a rejected answer is followed
/// by an error line that asks again on the same line.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    retrying: bool,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            retrying: false,
        }
    }

    /// Print `prompt` and read one line without its line terminator.
    ///
    /// Returns `None` at end of input.
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        self.read_line()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Build one record interactively.
    pub fn build_record(&mut self, builder: &RecordBuilder<'_>) -> Result<Record, BuildError> {
        self.retrying = false;
        builder.build_with(self)
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> FieldPrompter for TerminalPrompter<R, W> {
    fn prompt(&mut self, field: &FieldDescriptor) -> Option<String> {
        if !std::mem::take(&mut self.retrying) {
            if let Err(e) = write!(self.output, "\n{}: ", prompt_label(field)) {
                tracing::error!("Failed to write prompt: {e}");
                return None;
            }
        }
        if let Err(e) = self.output.flush() {
            tracing::error!("Failed to flush prompt: {e}");
            return None;
        }

        match self.read_line() {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read input: {e}");
                None
            }
        }
    }

    fn report(&mut self, _field: &FieldDescriptor, error: &ValidationError) {
        self.retrying = true;
        if let Err(e) = write!(self.output, "✖ Error: {error}. Try again: ") {
            tracing::error!("Failed to write error: {e}");
        }
    }
}
