#![forbid(unsafe_code)]

//! The [`Domain`] handle and its factories.
//!
//! # Design
//!
//! A domain is an `Arc` over an immutable interior: a membership predicate for
//! non-null values, the "allows null" and "is empty" flags, and the ordered
//! view registry. Cloning is cheap. Two handles compare equal only when they
//! share the same interior, which is what an observable domain slot needs to
//! detect a replacement.
//!
//! # Invariants
//!
//! 1. An empty domain contains nothing, not even `None`.
//! 2. Otherwise `contains(None) == allows_null()`, and `contains(Some(v))` is
//!    the predicate applied to `v`.
//! 3. Every refinement returns a new handle; the receiver never changes.
//! 4. View lookup is first match in registry order.
//!
//! # Failure Modes
//!
//! - A missing view resolves to a no-op through [`Domain::capability`].
//!   Only [`Domain::require`] reports [`DomainError::MissingView`].

use std::fmt;
use std::sync::Arc;

use crate::error::{DomainError, Result};
use crate::numeric::{NumericBounds, Span, Stepped};
use crate::ordered::Between;
use crate::view::{
    Capability, ContinuousView, EnumerationView, Listed, NullPassing, SnappingView, SteppingView,
    View, ViewTag,
};

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

struct DomainInner<T> {
    predicate: Predicate<T>,
    allows_null: bool,
    empty: bool,
    views: Vec<View<T>>,
}

/// Immutable description of the values a model may hold.
pub struct Domain<T> {
    inner: Arc<DomainInner<T>>,
}

impl<T> Clone for Domain<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for Domain<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for Domain<T> {}

impl<T> fmt::Debug for Domain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("allows_null", &self.inner.allows_null)
            .field("empty", &self.inner.empty)
            .field(
                "views",
                &self.inner.views.iter().map(View::tag).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T: 'static> Domain<T> {
    fn build(
        predicate: Predicate<T>,
        allows_null: bool,
        empty: bool,
        views: Vec<View<T>>,
    ) -> Self {
        Self {
            inner: Arc::new(DomainInner {
                predicate,
                allows_null,
                empty,
                views,
            }),
        }
    }

    /// The domain with no values at all. Models under it are inapplicable.
    #[must_use]
    pub fn empty() -> Self {
        Self::build(Arc::new(|_: &T| false), false, true, Vec::new())
    }

    /// Every non-null value.
    #[must_use]
    pub fn any() -> Self {
        Self::of(|_: &T| true)
    }

    /// Non-null values accepted by `predicate`.
    #[must_use]
    pub fn of(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self::build(Arc::new(predicate), false, false, Vec::new())
    }

    #[must_use]
    pub fn contains(&self, value: Option<&T>) -> bool {
        if self.inner.empty {
            return false;
        }
        match value {
            None => self.inner.allows_null,
            Some(v) => (self.inner.predicate)(v),
        }
    }

    #[must_use]
    pub fn allows_null(&self) -> bool {
        self.inner.allows_null
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.empty
    }

    /// The view registry in lookup order.
    #[must_use]
    pub fn views(&self) -> &[View<T>] {
        &self.inner.views
    }

    /// First registered view whose tag is one of `tags`.
    #[must_use]
    pub fn view(&self, tags: &[ViewTag]) -> Option<&View<T>> {
        self.inner.views.iter().find(|view| tags.contains(&view.tag()))
    }

    #[must_use]
    pub fn has_view(&self, tag: ViewTag) -> bool {
        self.view(&[tag]).is_some()
    }

    /// Typed view lookup, falling back to the capability's no-op.
    #[must_use]
    pub fn capability<V: Capability<T>>(&self) -> V {
        self.find::<V>().unwrap_or_else(V::noop)
    }

    /// Typed view lookup for callers whose logic depends on the view.
    ///
    /// # Errors
    ///
    /// [`DomainError::MissingView`] if the domain was built without it.
    pub fn require<V: Capability<T>>(&self) -> Result<V> {
        self.find::<V>().ok_or_else(|| {
            let tag = V::TAG;
            tracing::debug!(message = "domain.require_missing", %tag);
            DomainError::MissingView { tag }
        })
    }

    fn find<V: Capability<T>>(&self) -> Option<V> {
        self.view(&[V::TAG]).and_then(V::extract)
    }

    #[must_use]
    pub fn enumeration(&self) -> EnumerationView<T> {
        self.capability()
    }

    #[must_use]
    pub fn continuous(&self) -> ContinuousView<T> {
        self.capability()
    }

    /// A new domain with `view` registered.
    ///
    /// A view with the same tag is replaced in place; otherwise `view` is
    /// appended.
    #[must_use]
    pub fn with_view(&self, view: View<T>) -> Self {
        let mut views = self.inner.views.clone();
        match views.iter().position(|v| v.tag() == view.tag()) {
            Some(pos) => views[pos] = view,
            None => views.push(view),
        }
        Self::build(
            Arc::clone(&self.inner.predicate),
            self.inner.allows_null,
            self.inner.empty,
            views,
        )
    }

    /// A new domain that also accepts `None`.
    ///
    /// A snapping view is wrapped so `None` passes through it unsnapped.
    #[must_use]
    pub fn nullable(&self) -> Self {
        let views = self
            .inner
            .views
            .iter()
            .map(|view| match view {
                View::Snapping(snap) => {
                    let wrapped: SnappingView<T> = Arc::new(NullPassing::wrap(Arc::clone(snap)));
                    View::Snapping(wrapped)
                }
                other => other.clone(),
            })
            .collect();
        Self::build(Arc::clone(&self.inner.predicate), true, false, views)
    }
}

impl<T: Clone + 'static> Domain<T> {
    #[must_use]
    pub fn stepping(&self) -> SteppingView<T> {
        self.capability()
    }

    #[must_use]
    pub fn snapping(&self) -> SnappingView<T> {
        self.capability()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Domain<T> {
    /// Exactly the listed values, enumerated in the given order.
    ///
    /// An empty list yields an empty domain.
    #[must_use]
    pub fn values(values: impl IntoIterator<Item = T>) -> Self {
        let values: Arc<[T]> = values.into_iter().collect();
        let empty = values.is_empty();
        let members = Arc::clone(&values);
        Self::build(
            Arc::new(move |v: &T| members.contains(v)),
            false,
            empty,
            vec![View::Enumeration(
                Arc::new(Listed::new(values)) as EnumerationView<T>
            )],
        )
    }

    #[must_use]
    pub fn single(value: T) -> Self {
        Self::values([value])
    }
}

impl<T: Ord + Clone + fmt::Debug + Send + Sync + 'static> Domain<T> {
    /// `[first, last]` under `Ord`, snapping `None` to `first`.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvertedBounds`] when `first > last`.
    pub fn between(first: T, last: T) -> Result<Self> {
        let interval = Arc::new(Between::new(first, last)?);
        let members = Arc::clone(&interval);
        Ok(Self::build(
            Arc::new(move |v: &T| members.contains(v)),
            false,
            false,
            vec![View::Snapping(interval as SnappingView<T>)],
        ))
    }
}

impl<N: NumericBounds> Domain<N> {
    /// The grid `min, min + step, ... max`.
    ///
    /// # Errors
    ///
    /// See [`Stepped::new`].
    pub fn bounded(min: N, max: N, step: N) -> Result<Self> {
        let grid = Arc::new(Stepped::new(min, max, step)?);
        let members = Arc::clone(&grid);
        Ok(Self::build(
            Arc::new(move |v: &N| members.contains(*v)),
            false,
            false,
            vec![
                View::Enumeration(Arc::clone(&grid) as EnumerationView<N>),
                View::Stepping(Arc::clone(&grid) as SteppingView<N>),
                View::Snapping(Arc::clone(&grid) as SnappingView<N>),
                View::Continuous(grid as ContinuousView<N>),
            ],
        ))
    }

    /// [`bounded`](Self::bounded) with a unit step.
    ///
    /// # Errors
    ///
    /// See [`Stepped::new`].
    pub fn range(min: N, max: N) -> Result<Self> {
        Self::bounded(min, max, N::UNIT)
    }
}

impl Domain<f64> {
    /// Every finite float in `[min, max]`, without a step.
    ///
    /// # Errors
    ///
    /// [`DomainError::NonFiniteBounds`] or [`DomainError::InvertedBounds`].
    pub fn continuous_between(min: f64, max: f64) -> Result<Self> {
        let span = Arc::new(Span::new(min, max)?);
        let members = Arc::clone(&span);
        Ok(Self::build(
            Arc::new(move |v: &f64| members.contains(*v)),
            false,
            false,
            vec![
                View::Continuous(Arc::clone(&span) as ContinuousView<f64>),
                View::Snapping(span as SnappingView<f64>),
            ],
        ))
    }
}
