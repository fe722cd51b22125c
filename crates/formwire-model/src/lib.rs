#![forbid(unsafe_code)]

//! Models: validated value holders under a swappable [`Domain`].
//!
//! A [`Model`] stores a raw value and a domain, and derives two observable
//! flags from them:
//!
//! - **applicable**: the domain is non-empty;
//! - **valid**: the raw value belongs to the domain, or the model is
//!   inapplicable (vacuously valid).
//!
//! The raw value is always readable through [`Model::raw`]. The safe accessor
//! [`Model::get`] returns `None` whenever the model is invalid or
//! inapplicable, so consumers never need to special-case bad states.
//!
//! [`Domain`]: formwire_domain::Domain

pub mod error;
pub mod model;

pub use error::{ConversionError, ModelError, Result};
pub use model::{Model, ModelState};
