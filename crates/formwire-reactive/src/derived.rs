#![forbid(unsafe_code)]

//! Lazily attached derived values.
//!
//! # Design
//!
//! [`Derived<T>`] wraps a compute function over K source observables. Unlike a
//! memoized value that subscribes once and forever, a `Derived` attaches one
//! invalidation listener to each source **only while it has at least one
//! observer of its own**, and detaches all of them as soon as its last
//! observer unsubscribes. Nothing outside the observer set keeps a `Derived`
//! registered anywhere, so an unobserved `Derived` cannot leak listeners.
//!
//! # Invariants
//!
//! 1. Zero observers ⇒ zero listeners on every source, and every `get()`
//!    recomputes (nothing is cached).
//! 2. At least one observer ⇒ exactly one listener per source, and `get()`
//!    returns the cached value until a source invalidates it.
//! 3. On a source invalidation with change listeners present, the new value is
//!    computed before invalidation listeners run; change listeners run only if
//!    old ≠ new.
//! 4. Invalidation listeners are told once per valid → invalid edge. A value
//!    that has been invalidated and not read again does not re-notify.
//! 5. `version()` increments by exactly 1 per evaluation of the compute
//!    function.
//!
//! # Failure Modes
//!
//! - **Compute function panics**: the cache stays invalid; the next `get()`
//!   retries.
//! - **Source dropped while attached**: its subscription becomes inert and the
//!   derived value simply stops hearing from it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::listener::{ListenerId, ListenerSet};
use crate::observable::ObservableValue;
use crate::subscription::Subscription;

/// A type-erased way to attach an invalidation listener to one source.
pub struct Dependency {
    attach: Box<dyn Fn(Rc<dyn Fn()>) -> Subscription>,
}

impl Dependency {
    /// Dependency on any observable value.
    pub fn on<T, S>(source: &S) -> Self
    where
        S: ObservableValue<T> + Clone + 'static,
    {
        let source = source.clone();
        Self {
            attach: Box::new(move |listener| source.add_invalidation_listener(listener)),
        }
    }

    /// Dependency from a raw attach function.
    pub fn from_fn(attach: impl Fn(Rc<dyn Fn()>) -> Subscription + 'static) -> Self {
        Self {
            attach: Box::new(attach),
        }
    }

    fn attach(&self, listener: Rc<dyn Fn()>) -> Subscription {
        (self.attach)(listener)
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency").finish_non_exhaustive()
    }
}

struct CacheState<T> {
    cached: Option<T>,
    valid: bool,
}

struct DerivedInner<T> {
    compute: Box<dyn Fn() -> T>,
    dependencies: Vec<Dependency>,
    state: RefCell<CacheState<T>>,
    /// Listeners this value holds on its sources; non-empty only while observed.
    attached: RefCell<Vec<Subscription>>,
    invalidation: ListenerSet<dyn Fn()>,
    change: ListenerSet<dyn Fn(&T, &T)>,
    version: Cell<u64>,
}

#[derive(Clone, Copy)]
enum ListenerKind {
    Invalidation,
    Change,
}

/// A value derived from other observables, attached to them only on demand.
///
/// Cloning a `Derived` creates a new handle to the **same** inner state.
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Derived<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Derived")
            .field("cached", &state.cached)
            .field("valid", &state.valid)
            .field("observers", &self.inner.observer_count())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Derived<T> {
    /// Create a derived value from its dependencies and a compute function.
    ///
    /// The compute function reads the sources itself; `dependencies` only say
    /// where to listen for invalidation.
    pub fn new(dependencies: Vec<Dependency>, compute: impl Fn() -> T + 'static) -> Self {
        Self {
            inner: Rc::new(DerivedInner {
                compute: Box::new(compute),
                dependencies,
                state: RefCell::new(CacheState {
                    cached: None,
                    valid: false,
                }),
                attached: RefCell::new(Vec::new()),
                invalidation: ListenerSet::new(),
                change: ListenerSet::new(),
                version: Cell::new(0),
            }),
        }
    }

    /// Current value.
    ///
    /// While unobserved this always recomputes; while observed it returns the
    /// cached value unless a source has invalidated it.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value()
    }

    /// Whether this value is currently attached to its sources.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.observer_count() > 0
    }

    /// Number of observers (invalidation and change listeners).
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.observer_count()
    }

    /// Number of evaluations of the compute function so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Type-erased handle to this value.
    #[must_use]
    pub fn as_dyn(&self) -> crate::observable::DynObservable<T> {
        Rc::new(self.clone())
    }
}

impl<T> DerivedInner<T> {
    fn observer_count(&self) -> usize {
        self.invalidation.len() + self.change.len()
    }
}

impl<T: Clone + PartialEq + 'static> DerivedInner<T> {
    fn evaluate(&self) -> T {
        self.version.set(self.version.get() + 1);
        (self.compute)()
    }

    fn value(&self) -> T {
        if self.observer_count() == 0 {
            return self.evaluate();
        }
        {
            let state = self.state.borrow();
            if state.valid
                && let Some(cached) = state.cached.as_ref()
            {
                return cached.clone();
            }
        }
        // No borrow across the compute call: it reads other observables.
        let fresh = self.evaluate();
        let mut state = self.state.borrow_mut();
        state.cached = Some(fresh.clone());
        state.valid = true;
        fresh
    }

    fn add_listener(
        self: &Rc<Self>,
        kind: ListenerKind,
        insert: impl FnOnce(&Self) -> ListenerId,
    ) -> Subscription {
        let first = self.observer_count() == 0;
        let id = insert(&**self);
        if first {
            self.attach();
        }
        // Prime the cache so the first invalidation is reported and change
        // listeners have an old value to compare against.
        let _ = self.value();

        let weak: Weak<Self> = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove_listener(kind, id);
            }
        })
    }

    fn remove_listener(&self, kind: ListenerKind, id: ListenerId) {
        let removed = match kind {
            ListenerKind::Invalidation => self.invalidation.remove(id),
            ListenerKind::Change => self.change.remove(id),
        };
        if removed && self.observer_count() == 0 {
            self.detach();
        }
    }

    fn attach(self: &Rc<Self>) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let on_source: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.source_invalidated();
            }
        });
        let subs: Vec<Subscription> = self
            .dependencies
            .iter()
            .map(|dep| dep.attach(Rc::clone(&on_source)))
            .collect();
        tracing::trace!(message = "derived.attach", sources = subs.len());
        *self.attached.borrow_mut() = subs;
    }

    fn detach(&self) {
        let subs = std::mem::take(&mut *self.attached.borrow_mut());
        tracing::trace!(message = "derived.detach", sources = subs.len());
        drop(subs);
        let mut state = self.state.borrow_mut();
        state.cached = None;
        state.valid = false;
    }

    fn source_invalidated(&self) {
        let old = {
            let mut state = self.state.borrow_mut();
            if !state.valid {
                return;
            }
            state.valid = false;
            state.cached.take()
        };

        let new = if self.change.is_empty() {
            None
        } else {
            Some(self.value())
        };

        self.invalidation.for_each(|listener| listener());

        if let (Some(old), Some(new)) = (old, new)
            && old != new
        {
            self.change.for_each(|listener| listener(&old, &new));
        }
    }
}

impl<T: Clone + PartialEq + 'static> ObservableValue<T> for Derived<T> {
    fn get(&self) -> T {
        self.inner.value()
    }

    fn add_invalidation_listener(&self, listener: Rc<dyn Fn()>) -> Subscription {
        self.inner.add_listener(ListenerKind::Invalidation, |inner| {
            inner.invalidation.insert(listener)
        })
    }

    fn add_change_listener(&self, listener: Rc<dyn Fn(&T, &T)>) -> Subscription {
        self.inner
            .add_listener(ListenerKind::Change, |inner| inner.change.insert(listener))
    }

    fn listener_count(&self) -> usize {
        self.inner.observer_count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::Observable;

    fn doubled(source: &Observable<i32>, count: &Rc<Cell<u32>>) -> Derived<i32> {
        let src = source.clone();
        let c = Rc::clone(count);
        Derived::new(vec![Dependency::on(source)], move || {
            c.set(c.get() + 1);
            src.get() * 2
        })
    }

    #[test]
    fn unobserved_reads_recompute_every_time() {
        let count = Rc::new(Cell::new(0u32));
        let source = Observable::new(21);
        let derived = doubled(&source, &count);

        assert_eq!(derived.get(), 42);
        assert_eq!(derived.get(), 42);
        assert_eq!(derived.get(), 42);
        assert_eq!(count.get(), 3);
        assert_eq!(source.listener_count(), 0);
        assert!(!derived.is_attached());
    }

    #[test]
    fn observed_reads_use_cache() {
        let count = Rc::new(Cell::new(0u32));
        let source = Observable::new(1);
        let derived = doubled(&source, &count);

        let _sub = derived.add_invalidation_listener(Rc::new(|| {}));
        let primed = count.get();
        assert_eq!(derived.get(), 2);
        assert_eq!(derived.get(), 2);
        assert_eq!(count.get(), primed, "cached while attached");

        source.set(5);
        assert_eq!(derived.get(), 10);
        assert_eq!(count.get(), primed + 1);
    }

    #[test]
    fn attach_and_detach_follow_observer_count() {
        let count = Rc::new(Cell::new(0u32));
        let source = Observable::new(0);
        let derived = doubled(&source, &count);

        let first = derived.add_invalidation_listener(Rc::new(|| {}));
        assert_eq!(source.listener_count(), 1);

        let second = derived.add_change_listener(Rc::new(|_: &i32, _: &i32| {}));
        assert_eq!(source.listener_count(), 1, "one listener per source");
        assert_eq!(derived.observer_count(), 2);

        drop(first);
        assert_eq!(source.listener_count(), 1);

        drop(second);
        assert_eq!(source.listener_count(), 0);
        assert!(!derived.is_attached());
    }

    #[test]
    fn change_listener_sees_old_and_new() {
        let source = Observable::new(1);
        let count = Rc::new(Cell::new(0u32));
        let derived = doubled(&source, &count);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = derived.add_change_listener(Rc::new(move |old: &i32, new: &i32| {
            s.borrow_mut().push((*old, *new));
        }));

        source.set(2);
        source.set(3);
        assert_eq!(*seen.borrow(), vec![(2, 4), (4, 6)]);
    }

    #[test]
    fn change_listener_silent_when_value_unchanged() {
        let source = Observable::new(3);
        let src = source.clone();
        let parity = Derived::new(vec![Dependency::on(&source)], move || src.get() % 2);

        let changes = Rc::new(Cell::new(0u32));
        let invalidations = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&changes);
        let _change =
            parity.add_change_listener(Rc::new(move |_: &i32, _: &i32| c.set(c.get() + 1)));
        let i = Rc::clone(&invalidations);
        let _inval = parity.add_invalidation_listener(Rc::new(move || i.set(i.get() + 1)));

        source.set(5);
        assert_eq!(invalidations.get(), 1);
        assert_eq!(changes.get(), 0);

        source.set(6);
        assert_eq!(invalidations.get(), 2);
        assert_eq!(changes.get(), 1);
    }

    #[test]
    fn new_value_computed_before_invalidation_listeners_run() {
        let source = Observable::new(1);
        let count = Rc::new(Cell::new(0u32));
        let derived = doubled(&source, &count);

        let _change = derived.add_change_listener(Rc::new(|_: &i32, _: &i32| {}));
        let seen_count = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&seen_count);
        let counter = Rc::clone(&count);
        let _inval =
            derived.add_invalidation_listener(Rc::new(move || seen.set(counter.get())));

        let before = count.get();
        source.set(2);
        assert_eq!(seen_count.get(), before + 1);
    }

    #[test]
    fn invalidation_reported_once_until_read() {
        let source = Observable::new(0);
        let count = Rc::new(Cell::new(0u32));
        let derived = doubled(&source, &count);

        let calls = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&calls);
        let _sub = derived.add_invalidation_listener(Rc::new(move || c.set(c.get() + 1)));

        source.set(1);
        source.set(2);
        assert_eq!(calls.get(), 1);

        assert_eq!(derived.get(), 4);
        source.set(3);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn detach_discards_cache() {
        let source = Observable::new(1);
        let count = Rc::new(Cell::new(0u32));
        let derived = doubled(&source, &count);

        let sub = derived.add_invalidation_listener(Rc::new(|| {}));
        drop(sub);

        source.set(7);
        assert_eq!(derived.get(), 14, "stale cache must not survive detach");
    }

    #[test]
    fn version_counts_evaluations() {
        let source = Observable::new(0);
        let src = source.clone();
        let derived = Derived::new(vec![Dependency::on(&source)], move || src.get());
        assert_eq!(derived.version(), 0);
        let _ = derived.get();
        let _ = derived.get();
        assert_eq!(derived.version(), 2);
    }

    #[test]
    fn derived_of_derived_chains_attachment() {
        let source = Observable::new(2);
        let src = source.clone();
        let squared =
            Derived::new(vec![Dependency::on(&source)], move || src.get() * src.get());
        let sq = squared.clone();
        let plus_one = Derived::new(vec![Dependency::on(&squared)], move || sq.get() + 1);

        assert_eq!(source.listener_count(), 0);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let sub =
            plus_one.add_change_listener(Rc::new(move |_: &i32, new: &i32| s.set(*new)));
        assert!(squared.is_attached());
        assert_eq!(source.listener_count(), 1);

        source.set(3);
        assert_eq!(seen.get(), 10);

        drop(sub);
        assert!(!squared.is_attached());
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn source_dropped_while_attached() {
        let derived;
        let _sub;
        {
            let source = Observable::new(42);
            let src = source.clone();
            derived = Derived::new(vec![Dependency::on(&source)], move || src.get());
            _sub = derived.add_invalidation_listener(Rc::new(|| {}));
        }
        assert_eq!(derived.get(), 42);
    }

    #[test]
    fn debug_format() {
        let source = Observable::new(5);
        let src = source.clone();
        let derived = Derived::new(vec![Dependency::on(&source)], move || src.get());
        let dbg = format!("{derived:?}");
        assert!(dbg.contains("Derived"));
        assert!(dbg.contains("observers: 0"));
    }

    fn describe<T: fmt::Debug>(derived: &Derived<T>) -> String {
        format!("{derived:?}")
    }

    #[test]
    fn debug_format_needs_only_debug() {
        let source = Observable::new(String::from("a"));
        let src = source.clone();
        let derived = Derived::new(vec![Dependency::on(&source)], move || src.get());
        let _sub = derived.add_change_listener(Rc::new(|_: &String, _: &String| {}));
        assert!(describe(&derived).contains("observers: 1"));
    }
}
