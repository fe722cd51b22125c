#![forbid(unsafe_code)]

//! Domains: immutable descriptions of permitted values.
//!
//! A [`Domain<T>`] combines a membership predicate, an "allows null" flag, an
//! "is empty" flag, and an ordered registry of capability [`View`]s. Domains
//! never change after construction; every refinement (for example
//! [`Domain::nullable`]) returns a new domain. Handles are `Arc`-backed, so a
//! domain can be shared read-only by any number of models.
//!
//! # Factories
//!
//! | Factory                         | Views                                        |
//! |---------------------------------|----------------------------------------------|
//! | [`Domain::empty`], [`Domain::any`], [`Domain::of`] | none                    |
//! | [`Domain::values`], [`Domain::single`] | enumeration                           |
//! | [`Domain::bounded`], [`Domain::range`] | enumeration, stepping, snapping, continuous |
//! | [`Domain::continuous_between`]  | continuous, snapping                         |
//! | [`Domain::between`]             | snapping                                     |
//!
//! # Invariants
//!
//! 1. `contains(None) == allows_null()`, except that an empty domain contains
//!    nothing at all.
//! 2. `nullable()` never mutates its receiver.
//! 3. Factory preconditions are checked when the domain is built, never at
//!    first use.

pub mod domain;
pub mod error;
pub mod numeric;
mod ordered;
pub mod view;

pub use domain::Domain;
pub use error::{DomainError, Result};
pub use numeric::{NumericBounds, Stepped};
pub use view::{
    Capability, Continuous, ContinuousView, Enumeration, EnumerationView, Snapping, SnappingView,
    Stepping, SteppingView, View, ViewTag,
};
