#![forbid(unsafe_code)]

//! Capability views a domain may expose.
//!
//! # Design
//!
//! A view is an optional interaction capability. Instead of a type hierarchy
//! of domain kinds, each domain keeps an ordered registry of [`View`] variants
//! and callers look a capability up by [`ViewTag`]. Four capabilities exist:
//!
//! | Tag                      | Trait           | Purpose                              |
//! |--------------------------|-----------------|--------------------------------------|
//! | [`ViewTag::Enumeration`] | [`Enumeration`] | index <-> value, size, list          |
//! | [`ViewTag::Continuous`]  | [`Continuous`]  | fraction in `[0, 1]` <-> value       |
//! | [`ViewTag::Stepping`]    | [`Stepping`]    | move N logical steps                 |
//! | [`ViewTag::Snapping`]    | [`Snapping`]    | clamp or normalize into the domain   |
//!
//! [`Capability`] ties each trait-object alias to its tag and to the no-op
//! implementation returned when a domain lacks the view.
//!
//! # Invariants
//!
//! 1. No-op views never invent values: the no-op enumeration is empty, the
//!    no-op continuous view maps every fraction to `None`.
//! 2. No-op stepping and snapping views return their input unchanged.

use std::fmt;
use std::sync::Arc;

/// Capability tag used to look views up in a domain's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewTag {
    Enumeration,
    Continuous,
    Stepping,
    Snapping,
}

impl ViewTag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enumeration => "enumeration",
            Self::Continuous => "continuous",
            Self::Stepping => "stepping",
            Self::Snapping => "snapping",
        }
    }
}

impl fmt::Display for ViewTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finite, indexed listing of a domain's values.
pub trait Enumeration<T>: Send + Sync {
    /// Number of values.
    fn size(&self) -> usize;

    /// Value at `index`, or `None` past the end.
    fn get(&self, index: usize) -> Option<T>;

    /// Index of `value`, or `None` if it is not listed.
    fn index_of(&self, value: &T) -> Option<usize>;

    /// All values in index order.
    fn to_vec(&self) -> Vec<T> {
        (0..self.size()).filter_map(|index| self.get(index)).collect()
    }
}

/// Mapping between a domain's values and fractions of `[0, 1]`.
pub trait Continuous<T>: Send + Sync {
    /// Value at `fraction`; out-of-range fractions are clamped.
    fn get(&self, fraction: f64) -> Option<T>;

    /// Position of `value` in `[0, 1]`. `None` maps to `0.0`.
    fn fraction_of(&self, value: Option<&T>) -> f64;
}

/// Moves a value by whole logical steps.
pub trait Stepping<T>: Send + Sync {
    /// Move `value` by `steps` (negative steps move down).
    ///
    /// `steps == 0` returns the input unchanged, even when it lies outside
    /// the domain.
    fn step(&self, value: Option<&T>, steps: i64) -> Option<T>;
}

/// Brings an arbitrary value into the domain.
pub trait Snapping<T>: Send + Sync {
    fn snap(&self, value: Option<&T>) -> Option<T>;
}

pub type EnumerationView<T> = Arc<dyn Enumeration<T>>;
pub type ContinuousView<T> = Arc<dyn Continuous<T>>;
pub type SteppingView<T> = Arc<dyn Stepping<T>>;
pub type SnappingView<T> = Arc<dyn Snapping<T>>;

/// One entry of a domain's view registry.
pub enum View<T> {
    Enumeration(EnumerationView<T>),
    Continuous(ContinuousView<T>),
    Stepping(SteppingView<T>),
    Snapping(SnappingView<T>),
}

impl<T> View<T> {
    #[must_use]
    pub const fn tag(&self) -> ViewTag {
        match self {
            Self::Enumeration(_) => ViewTag::Enumeration,
            Self::Continuous(_) => ViewTag::Continuous,
            Self::Stepping(_) => ViewTag::Stepping,
            Self::Snapping(_) => ViewTag::Snapping,
        }
    }
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Enumeration(v) => Self::Enumeration(Arc::clone(v)),
            Self::Continuous(v) => Self::Continuous(Arc::clone(v)),
            Self::Stepping(v) => Self::Stepping(Arc::clone(v)),
            Self::Snapping(v) => Self::Snapping(Arc::clone(v)),
        }
    }
}

impl<T> fmt::Debug for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("View").field(&self.tag()).finish()
    }
}

/// A typed view handle that can be looked up in a registry.
pub trait Capability<T>: Sized {
    const TAG: ViewTag;

    /// Extract this capability from a registry entry with a matching tag.
    fn extract(view: &View<T>) -> Option<Self>;

    /// The harmless stand-in used when a domain lacks this capability.
    fn noop() -> Self;
}

impl<T: 'static> Capability<T> for EnumerationView<T> {
    const TAG: ViewTag = ViewTag::Enumeration;

    fn extract(view: &View<T>) -> Option<Self> {
        match view {
            View::Enumeration(v) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    fn noop() -> Self {
        Arc::new(NoEnumeration)
    }
}

impl<T: 'static> Capability<T> for ContinuousView<T> {
    const TAG: ViewTag = ViewTag::Continuous;

    fn extract(view: &View<T>) -> Option<Self> {
        match view {
            View::Continuous(v) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    fn noop() -> Self {
        Arc::new(NoContinuous)
    }
}

impl<T: Clone + 'static> Capability<T> for SteppingView<T> {
    const TAG: ViewTag = ViewTag::Stepping;

    fn extract(view: &View<T>) -> Option<Self> {
        match view {
            View::Stepping(v) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    fn noop() -> Self {
        Arc::new(NoStepping)
    }
}

impl<T: Clone + 'static> Capability<T> for SnappingView<T> {
    const TAG: ViewTag = ViewTag::Snapping;

    fn extract(view: &View<T>) -> Option<Self> {
        match view {
            View::Snapping(v) => Some(Arc::clone(v)),
            _ => None,
        }
    }

    fn noop() -> Self {
        Arc::new(NoSnapping)
    }
}

struct NoEnumeration;

impl<T> Enumeration<T> for NoEnumeration {
    fn size(&self) -> usize {
        0
    }

    fn get(&self, _index: usize) -> Option<T> {
        None
    }

    fn index_of(&self, _value: &T) -> Option<usize> {
        None
    }
}

struct NoContinuous;

impl<T> Continuous<T> for NoContinuous {
    fn get(&self, _fraction: f64) -> Option<T> {
        None
    }

    fn fraction_of(&self, _value: Option<&T>) -> f64 {
        0.0
    }
}

struct NoStepping;

impl<T: Clone> Stepping<T> for NoStepping {
    fn step(&self, value: Option<&T>, _steps: i64) -> Option<T> {
        value.cloned()
    }
}

struct NoSnapping;

impl<T: Clone> Snapping<T> for NoSnapping {
    fn snap(&self, value: Option<&T>) -> Option<T> {
        value.cloned()
    }
}

/// Snapping view of a nullable domain: `None` passes through untouched.
pub(crate) struct NullPassing<T> {
    inner: SnappingView<T>,
}

impl<T> NullPassing<T> {
    pub(crate) fn wrap(inner: SnappingView<T>) -> Self {
        Self { inner }
    }
}

impl<T> Snapping<T> for NullPassing<T> {
    fn snap(&self, value: Option<&T>) -> Option<T> {
        value.and_then(|v| self.inner.snap(Some(v)))
    }
}

/// Enumeration over a fixed, shared slice.
pub(crate) struct Listed<T> {
    values: Arc<[T]>,
}

impl<T> Listed<T> {
    pub(crate) fn new(values: Arc<[T]>) -> Self {
        Self { values }
    }
}

impl<T: Clone + PartialEq + Send + Sync> Enumeration<T> for Listed<T> {
    fn size(&self) -> usize {
        self.values.len()
    }

    fn get(&self, index: usize) -> Option<T> {
        self.values.get(index).cloned()
    }

    fn index_of(&self, value: &T) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }

    fn to_vec(&self) -> Vec<T> {
        self.values.to_vec()
    }
}
