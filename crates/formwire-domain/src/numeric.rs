#![forbid(unsafe_code)]

//! Bounded numeric domains with a fixed step.
//!
//! # Design
//!
//! [`Stepped<N>`] is a validated `(min, max, step)` triple. Its normalizer
//! maps any number to the nearest grid point `min + k * step`, then clamps it
//! to the bounds. A remainder of exactly half a step rounds toward `min`, so
//! `5` normalizes to `4` on the grid `0, 2, 4, ... 10`.
//!
//! The same normalizer backs every view a bounded domain exposes, so the
//! enumeration, stepping, snapping, and continuous views always agree.
//!
//! [`NumericBounds`] abstracts the arithmetic for `i32`, `i64`, and `f64`.
//! Integers compute in `i128`, so no intermediate can overflow.
//!
//! # Invariants
//!
//! 1. `min <= max`, `step > 0`, and everything else is checked in [`Stepped::new`].
//! 2. For integers, `max - min` is a whole multiple of `step`.
//! 3. `normalize` always returns a value inside `[min, max]`.
//!
//! # Failure Modes
//!
//! - NaN normalizes to `min`.
//! - Infinite values clamp to the nearer bound.

use std::fmt;

use crate::error::{DomainError, Result};
use crate::view::{Continuous, Enumeration, Snapping, Stepping};

/// Arithmetic needed by a bounded, stepped domain.
pub trait NumericBounds: Copy + PartialOrd + fmt::Display + fmt::Debug + Send + Sync + 'static {
    /// Step used by [`Domain::range`](crate::Domain::range).
    const UNIT: Self;

    /// Check the preconditions of a `(min, max, step)` triple.
    fn validate(min: Self, max: Self, step: Self) -> Result<()>;

    /// Nearest grid point, clamped to the bounds.
    fn normalize(self, min: Self, max: Self, step: Self) -> Self;

    /// Whether `self` is a grid point inside the bounds.
    fn on_grid(self, min: Self, max: Self, step: Self) -> bool;

    /// `self + steps * step`, saturating at the type's limits.
    fn offset(self, steps: i64, step: Self) -> Self;

    /// Number of grid points in `[min, max]`.
    fn count(min: Self, max: Self, step: Self) -> usize;

    /// The `index`-th grid point, if it lies inside the bounds.
    fn nth(min: Self, max: Self, step: Self, index: usize) -> Option<Self>;

    /// Position of the grid point `self` counted from `min`.
    fn index_of(self, min: Self, step: Self) -> Option<usize>;

    fn to_f64(self) -> f64;

    /// Nearest representable value, saturating.
    fn from_f64(value: f64) -> Self;
}

macro_rules! integer_bounds {
    ($($ty:ty),*) => {$(
        impl NumericBounds for $ty {
            const UNIT: Self = 1;

            fn validate(min: Self, max: Self, step: Self) -> Result<()> {
                if step <= 0 {
                    return Err(DomainError::invalid_step(step));
                }
                if min > max {
                    return Err(DomainError::inverted(min, max));
                }
                if (i128::from(max) - i128::from(min)) % i128::from(step) != 0 {
                    return Err(DomainError::MisalignedBounds {
                        min: min.to_string(),
                        max: max.to_string(),
                        step: step.to_string(),
                    });
                }
                Ok(())
            }

            fn normalize(self, min: Self, max: Self, step: Self) -> Self {
                let (x, lo, hi, s) = (
                    i128::from(self),
                    i128::from(min),
                    i128::from(max),
                    i128::from(step),
                );
                let offset = x - lo;
                let mut quotient = offset.div_euclid(s);
                if 2 * offset.rem_euclid(s) > s {
                    quotient += 1;
                }
                let snapped = (lo + quotient * s).clamp(lo, hi);
                Self::try_from(snapped).unwrap_or(min)
            }

            fn on_grid(self, min: Self, max: Self, step: Self) -> bool {
                self >= min
                    && self <= max
                    && (i128::from(self) - i128::from(min)) % i128::from(step) == 0
            }

            fn offset(self, steps: i64, step: Self) -> Self {
                let moved = i128::from(self) + i128::from(steps) * i128::from(step);
                let clamped = moved.clamp(i128::from(Self::MIN), i128::from(Self::MAX));
                Self::try_from(clamped).unwrap_or(self)
            }

            fn count(min: Self, max: Self, step: Self) -> usize {
                let span = (i128::from(max) - i128::from(min)) / i128::from(step);
                usize::try_from(span + 1).unwrap_or(usize::MAX)
            }

            fn nth(min: Self, max: Self, step: Self, index: usize) -> Option<Self> {
                let index = i128::try_from(index).ok()?;
                let value = i128::from(min) + index * i128::from(step);
                if value > i128::from(max) {
                    return None;
                }
                Self::try_from(value).ok()
            }

            fn index_of(self, min: Self, step: Self) -> Option<usize> {
                let offset = i128::from(self) - i128::from(min);
                usize::try_from(offset.div_euclid(i128::from(step))).ok()
            }

            #[allow(clippy::cast_precision_loss)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[allow(clippy::cast_possible_truncation)]
            fn from_f64(value: f64) -> Self {
                // Float-to-int `as` saturates and maps NaN to zero.
                value.round() as Self
            }
        }
    )*};
}

integer_bounds!(i32, i64);

/// Relative tolerance for grid membership of floating-point values.
const GRID_EPSILON: f64 = 1e-9;

impl NumericBounds for f64 {
    const UNIT: Self = 1.0;

    fn validate(min: Self, max: Self, step: Self) -> Result<()> {
        if !min.is_finite() || !max.is_finite() {
            return Err(DomainError::NonFiniteBounds);
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(DomainError::invalid_step(step));
        }
        if min > max {
            return Err(DomainError::inverted(min, max));
        }
        Ok(())
    }

    fn normalize(self, min: Self, max: Self, step: Self) -> Self {
        if self.is_nan() {
            return min;
        }
        if self.is_infinite() {
            return if self > 0.0 { max } else { min };
        }
        let offset = self - min;
        let mut quotient = (offset / step).floor();
        let remainder = offset - quotient * step;
        if 2.0 * remainder > step {
            quotient += 1.0;
        }
        quotient.mul_add(step, min).clamp(min, max)
    }

    fn on_grid(self, min: Self, max: Self, step: Self) -> bool {
        if !(min..=max).contains(&self) {
            return false;
        }
        (self.normalize(min, max, step) - self).abs() <= step * GRID_EPSILON
    }

    #[allow(clippy::cast_precision_loss)]
    fn offset(self, steps: i64, step: Self) -> Self {
        (steps as f64).mul_add(step, self)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn count(min: Self, max: Self, step: Self) -> usize {
        // `as` saturates, so an overflowing span counts as `usize::MAX`.
        (((max - min) / step + GRID_EPSILON).floor() as usize).saturating_add(1)
    }

    #[allow(clippy::cast_precision_loss)]
    fn nth(min: Self, max: Self, step: Self, index: usize) -> Option<Self> {
        if index >= Self::count(min, max, step) {
            return None;
        }
        Some((index as f64).mul_add(step, min).min(max))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn index_of(self, min: Self, step: Self) -> Option<usize> {
        let fraction = ((self - min) / step).round();
        (fraction.is_finite() && fraction >= 0.0).then_some(fraction as usize)
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

/// A validated `(min, max, step)` grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stepped<N> {
    min: N,
    max: N,
    step: N,
}

impl<N: NumericBounds> Stepped<N> {
    /// Validate and build a grid.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidStep`] for a non-positive or non-finite step,
    /// [`DomainError::InvertedBounds`] when `min > max`,
    /// [`DomainError::NonFiniteBounds`] for infinite or NaN float bounds, and
    /// [`DomainError::MisalignedBounds`] when an integer `max` is not a whole
    /// number of steps from `min`.
    pub fn new(min: N, max: N, step: N) -> Result<Self> {
        N::validate(min, max, step)?;
        Ok(Self { min, max, step })
    }

    #[must_use]
    pub fn min(&self) -> N {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> N {
        self.max
    }

    #[must_use]
    pub fn step_size(&self) -> N {
        self.step
    }

    /// Nearest grid point inside the bounds.
    #[must_use]
    pub fn normalize(&self, value: N) -> N {
        value.normalize(self.min, self.max, self.step)
    }

    #[must_use]
    pub fn contains(&self, value: N) -> bool {
        value.on_grid(self.min, self.max, self.step)
    }

    fn clamp(&self, value: N) -> N {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

impl<N: NumericBounds> Enumeration<N> for Stepped<N> {
    fn size(&self) -> usize {
        N::count(self.min, self.max, self.step)
    }

    fn get(&self, index: usize) -> Option<N> {
        N::nth(self.min, self.max, self.step, index)
    }

    fn index_of(&self, value: &N) -> Option<usize> {
        let normalized = self.normalize(*value);
        let index = normalized.index_of(self.min, self.step)?;
        (Enumeration::get(self, index) == Some(normalized)).then_some(index)
    }
}

impl<N: NumericBounds> Stepping<N> for Stepped<N> {
    fn step(&self, value: Option<&N>, steps: i64) -> Option<N> {
        if steps == 0 {
            return value.copied();
        }
        let mut remaining = steps;
        let start = match value {
            Some(&v) => {
                if !self.contains(v) {
                    remaining -= steps.signum();
                }
                self.normalize(v)
            }
            None => {
                remaining -= steps.signum();
                self.min
            }
        };
        Some(self.clamp(start.offset(remaining, self.step)))
    }
}

impl<N: NumericBounds> Snapping<N> for Stepped<N> {
    fn snap(&self, value: Option<&N>) -> Option<N> {
        Some(value.map_or(self.min, |v| self.normalize(*v)))
    }
}

impl<N: NumericBounds> Continuous<N> for Stepped<N> {
    fn get(&self, fraction: f64) -> Option<N> {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let (lo, hi) = (self.min.to_f64(), self.max.to_f64());
        Some(self.normalize(N::from_f64(fraction.mul_add(hi - lo, lo))))
    }

    fn fraction_of(&self, value: Option<&N>) -> f64 {
        let Some(&value) = value else {
            return 0.0;
        };
        let (lo, hi) = (self.min.to_f64(), self.max.to_f64());
        if hi <= lo {
            return 0.0;
        }
        (self.normalize(value).to_f64() - lo) / (hi - lo)
    }
}

/// Unstepped closed interval of floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Span {
    min: f64,
    max: f64,
}

impl Span {
    pub(crate) fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(DomainError::NonFiniteBounds);
        }
        if min > max {
            return Err(DomainError::inverted(min, max));
        }
        Ok(Self { min, max })
    }

    pub(crate) fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

impl Continuous<f64> for Span {
    fn get(&self, fraction: f64) -> Option<f64> {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        Some(fraction.mul_add(self.max - self.min, self.min))
    }

    fn fraction_of(&self, value: Option<&f64>) -> f64 {
        let Some(&value) = value else {
            return 0.0;
        };
        if self.max <= self.min {
            return 0.0;
        }
        (self.clamp(value) - self.min) / (self.max - self.min)
    }
}

impl Snapping<f64> for Span {
    fn snap(&self, value: Option<&f64>) -> Option<f64> {
        Some(value.map_or(self.min, |v| self.clamp(*v)))
    }
}
