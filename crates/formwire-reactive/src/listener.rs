#![forbid(unsafe_code)]

//! Ordered listener registry with snapshot dispatch.
//!
//! [`ListenerSet<F>`] stores reference-counted callbacks of an arbitrary
//! (usually unsized) callable type such as `dyn Fn()` or `dyn Fn(&T, &T)`.
//!
//! # Invariants
//!
//! 1. [`for_each`](ListenerSet::for_each) visits listeners in registration
//!    order.
//! 2. Dispatch iterates a snapshot: a listener inserted while a dispatch is in
//!    flight is not visited by that dispatch.
//! 3. A listener removed while a dispatch is in flight is not visited after its
//!    removal, even though it is part of the snapshot.
//! 4. Removing an id twice is harmless.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::subscription::Subscription;

/// Identifier of a listener inside one [`ListenerSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

struct Entry<F: ?Sized> {
    id: ListenerId,
    alive: Rc<Cell<bool>>,
    callback: Rc<F>,
}

impl<F: ?Sized> Clone for Entry<F> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            alive: Rc::clone(&self.alive),
            callback: Rc::clone(&self.callback),
        }
    }
}

/// An ordered set of listeners of callable type `F`.
pub struct ListenerSet<F: ?Sized> {
    entries: RefCell<Vec<Entry<F>>>,
    next_id: Cell<u64>,
}

impl<F: ?Sized> ListenerSet<F> {
    /// Create an empty listener set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a listener and return its id.
    pub fn insert(&self, callback: Rc<F>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push(Entry {
            id,
            alive: Rc::new(Cell::new(true)),
            callback,
        });
        id
    }

    /// Remove a listener. Returns `false` if the id was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        // The entry is dropped after the borrow ends: its callback may own a
        // subscription that reaches back into this set.
        let removed = {
            let mut entries = self.entries.borrow_mut();
            entries
                .iter()
                .position(|e| e.id == id)
                .map(|pos| entries.remove(pos))
        };
        match removed {
            Some(entry) => {
                entry.alive.set(false);
                true
            }
            None => false,
        }
    }

    /// Remove every listener.
    pub fn clear(&self) {
        let drained = std::mem::take(&mut *self.entries.borrow_mut());
        for entry in &drained {
            entry.alive.set(false);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Invoke `f` for every listener of the current snapshot that is still
    /// registered when its turn comes.
    ///
    /// No borrow of the set is held while `f` runs, so callbacks may freely
    /// add or remove listeners.
    pub fn for_each(&self, mut f: impl FnMut(&F)) {
        let snapshot: Vec<Entry<F>> = self.entries.borrow().clone();
        for entry in &snapshot {
            if entry.alive.get() {
                f(entry.callback.as_ref());
            }
        }
    }
}

impl<F: ?Sized + 'static> ListenerSet<F> {
    /// Register a listener on a shared set and return a [`Subscription`] that
    /// removes it again.
    ///
    /// The subscription holds only a weak reference to the set; if the set is
    /// dropped first, unsubscribing does nothing.
    pub fn subscribe(self: &Rc<Self>, callback: Rc<F>) -> Subscription {
        let id = self.insert(callback);
        let weak: Weak<Self> = Rc::downgrade(self);
        Subscription::new(move || {
            if let Some(set) = weak.upgrade() {
                set.remove(id);
            }
        })
    }
}

impl<F: ?Sized> Default for ListenerSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> fmt::Debug for ListenerSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.len())
            .finish()
    }
}
