#![forbid(unsafe_code)]

//! Domain construction and configuration errors.

use thiserror::Error;

use crate::view::ViewTag;

pub type Result<T> = std::result::Result<T, DomainError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("step must be positive and finite, got {step}")]
    InvalidStep { step: String },

    #[error("lower bound {min} exceeds upper bound {max}")]
    InvertedBounds { min: String, max: String },

    #[error("upper bound {max} is not reachable from {min} in whole steps of {step}")]
    MisalignedBounds {
        min: String,
        max: String,
        step: String,
    },

    #[error("bounds must be finite numbers")]
    NonFiniteBounds,

    #[error("domain has no {tag} view")]
    MissingView { tag: ViewTag },
}

impl DomainError {
    #[must_use]
    pub fn invalid_step(step: impl ToString) -> Self {
        Self::InvalidStep {
            step: step.to_string(),
        }
    }

    #[must_use]
    pub fn inverted(min: impl ToString, max: impl ToString) -> Self {
        Self::InvertedBounds {
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}
