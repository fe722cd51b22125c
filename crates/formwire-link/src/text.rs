#![forbid(unsafe_code)]

//! Parse and format functions for text controls.
//!
//! The pair obeys three rules:
//!
//! 1. The parser consumes its whole (trimmed) input or fails.
//! 2. Blank input parses to `None`.
//! 3. `parse_text(&format_text(Some(&v))) == Ok(Some(v))` for canonical `v`.

use std::fmt::Display;
use std::str::FromStr;

use formwire_model::ConversionError;

/// Parse trimmed `input`; blank input is `None`.
///
/// # Errors
///
/// [`ConversionError::Rejected`] if the trimmed input does not parse as a
/// whole.
pub fn parse_text<T>(input: &str) -> Result<Option<T>, ConversionError>
where
    T: FromStr,
    T::Err: Display,
{
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|err| ConversionError::new(trimmed, err))
}

/// Canonical text for `value`; `None` is the empty string.
pub fn format_text<T: Display>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}
