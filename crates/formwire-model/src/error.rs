#![forbid(unsafe_code)]

//! Model access and conversion errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

/// Strict accessor failures. These signal caller errors, not user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("model value is invalid for its domain")]
    Invalid,

    #[error("model is inapplicable: its domain is empty")]
    Inapplicable,

    #[error("model holds no value")]
    NullValue,
}

/// A converter could not turn control input into a model value.
///
/// Captured by [`Model::convert_from`](crate::Model::convert_from); it never
/// escapes into notification dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("cannot convert {input:?}: {reason}")]
    Rejected { input: String, reason: String },
}

impl ConversionError {
    #[must_use]
    pub fn new(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::Rejected {
            input: input.into(),
            reason: reason.to_string(),
        }
    }
}
