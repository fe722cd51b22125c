#![forbid(unsafe_code)]

//! Closed intervals over any totally ordered type (dates, versions, names).

use std::fmt;

use crate::error::{DomainError, Result};
use crate::view::Snapping;

/// `[first, last]` under `Ord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Between<T> {
    first: T,
    last: T,
}

impl<T: Ord + Clone + fmt::Debug> Between<T> {
    pub(crate) fn new(first: T, last: T) -> Result<Self> {
        if first > last {
            return Err(DomainError::inverted(
                format!("{first:?}"),
                format!("{last:?}"),
            ));
        }
        Ok(Self { first, last })
    }

    pub(crate) fn contains(&self, value: &T) -> bool {
        *value >= self.first && *value <= self.last
    }
}

impl<T: Ord + Clone + Send + Sync> Snapping<T> for Between<T> {
    fn snap(&self, value: Option<&T>) -> Option<T> {
        let snapped = match value {
            None => self.first.clone(),
            Some(v) => v.clone().clamp(self.first.clone(), self.last.clone()),
        };
        Some(snapped)
    }
}
