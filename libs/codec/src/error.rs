//! Codec errors
//!
//! Every encoding failure is a caller error: the values handed to the
//! encoder do not have the shape the schema declares. Nothing is coerced.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// Values do not match the declared type tags
    #[error("Schema mismatch in {schema}{}: {reason}", position_suffix(.position))]
    SchemaMismatch {
        schema: String,
        position: Option<usize>,
        reason: String,
    },
}

fn position_suffix(position: &Option<usize>) -> String {
    match position {
        Some(index) => format!(" at field {}", index),
        None => String::new(),
    }
}

impl CodecError {
    /// Wrong number of values for the schema
    pub fn arity(schema: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::SchemaMismatch {
            schema: schema.into(),
            position: None,
            reason: format!("expected {} values, got {}", expected, got),
        }
    }

    /// Value at `position` does not satisfy its type tag
    pub fn field(schema: impl Into<String>, position: usize, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            schema: schema.into(),
            position: Some(position),
            reason: reason.into(),
        }
    }
}
