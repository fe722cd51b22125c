#![forbid(unsafe_code)]

//! Version-tracked observable cells.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value in shared, reference-counted storage. Two
//! kinds of listeners can be attached:
//!
//! - **invalidation listeners** (`Fn()`): told that the value changed, without
//!   being handed either value;
//! - **change listeners** (`Fn(&T, &T)`): handed the old and the new value.
//!
//! [`ObservableValue<T>`] abstracts over anything readable that emits these
//! two notifications, so derived values and plain cells compose.
//!
//! # Invariants
//!
//! 1. `set()` with a value equal to the current one is a no-op.
//! 2. Each effective `set()` bumps the version by exactly one.
//! 3. On an effective `set()`, every invalidation listener runs before any
//!    change listener, each group in registration order.
//! 4. No borrow of the cell is held while listeners run, so listeners may read
//!    or write the observable.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::listener::ListenerSet;
use crate::subscription::Subscription;

/// A readable value that emits invalidation and change notifications.
pub trait ObservableValue<T> {
    /// Current value.
    fn get(&self) -> T;

    /// Register a listener told about every invalidation.
    fn add_invalidation_listener(&self, listener: Rc<dyn Fn()>) -> Subscription;

    /// Register a listener handed `(old, new)` whenever the value changes.
    fn add_change_listener(&self, listener: Rc<dyn Fn(&T, &T)>) -> Subscription;

    /// Number of listeners currently registered (both kinds).
    fn listener_count(&self) -> usize;
}

/// Type-erased shared observable.
pub type DynObservable<T> = Rc<dyn ObservableValue<T>>;

impl<T> ObservableValue<T> for Rc<dyn ObservableValue<T>> {
    fn get(&self) -> T {
        (**self).get()
    }

    fn add_invalidation_listener(&self, listener: Rc<dyn Fn()>) -> Subscription {
        (**self).add_invalidation_listener(listener)
    }

    fn add_change_listener(&self, listener: Rc<dyn Fn(&T, &T)>) -> Subscription {
        (**self).add_change_listener(listener)
    }

    fn listener_count(&self) -> usize {
        (**self).listener_count()
    }
}

struct ObservableInner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    invalidation: Rc<ListenerSet<dyn Fn()>>,
    change: Rc<ListenerSet<dyn Fn(&T, &T)>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** value.
pub struct Observable<T> {
    inner: Rc<ObservableInner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .field(
                "listeners",
                &(self.inner.invalidation.len() + self.inner.change.len()),
            )
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                value: RefCell::new(value),
                version: Cell::new(0),
                invalidation: Rc::new(ListenerSet::new()),
                change: Rc::new(ListenerSet::new()),
            }),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Access the current value by reference.
    ///
    /// # Panics
    ///
    /// Panics if `f` calls [`set`](Self::set) on the same observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value. Returns `true` if the value changed.
    ///
    /// Equal values are ignored: no version bump, no notification.
    pub fn set(&self, value: T) -> bool {
        let old = {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return false;
            }
            std::mem::replace(&mut *current, value)
        };
        self.inner.version.set(self.inner.version.get() + 1);
        self.notify(&old);
        true
    }

    /// Modify the value in place through `f`, notifying if it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.get();
        f(&mut next);
        self.set(next)
    }

    /// Number of effective mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Register a callback receiving the new value after every change.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner
            .change
            .subscribe(Rc::new(move |_old: &T, new: &T| callback(new)))
    }

    /// Type-erased handle to this observable.
    #[must_use]
    pub fn as_dyn(&self) -> DynObservable<T> {
        Rc::new(self.clone())
    }

    fn notify(&self, old: &T) {
        self.inner.invalidation.for_each(|listener| listener());
        if self.inner.change.is_empty() {
            return;
        }
        let new = self.get();
        self.inner.change.for_each(|listener| listener(old, &new));
    }
}

impl<T: Clone + PartialEq + 'static> ObservableValue<T> for Observable<T> {
    fn get(&self) -> T {
        Observable::get(self)
    }

    fn add_invalidation_listener(&self, listener: Rc<dyn Fn()>) -> Subscription {
        self.inner.invalidation.subscribe(listener)
    }

    fn add_change_listener(&self, listener: Rc<dyn Fn(&T, &T)>) -> Subscription {
        self.inner.change.subscribe(listener)
    }

    fn listener_count(&self) -> usize {
        self.inner.invalidation.len() + self.inner.change.len()
    }
}
