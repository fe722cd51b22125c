#![forbid(unsafe_code)]

//! Show/hide edges of a host window.
//!
//! A [`Host`] stands in for the visibility layer of the window a control
//! lives in. It delivers exactly two edge-triggered signals,
//! [`LifecycleEdge::Showing`] and [`LifecycleEdge::Hidden`]; repeating the
//! current state is not an edge and notifies nobody.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use formwire_reactive::{ListenerSet, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEdge {
    Showing,
    Hidden,
}

struct HostInner {
    showing: Cell<bool>,
    listeners: Rc<ListenerSet<dyn Fn(LifecycleEdge)>>,
}

/// Edge source for one host. Cloning yields another handle to the same host.
#[derive(Clone)]
pub struct Host {
    inner: Rc<HostInner>,
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    /// A host that is not yet showing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(HostInner {
                showing: Cell::new(false),
                listeners: Rc::new(ListenerSet::new()),
            }),
        }
    }

    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.inner.showing.get()
    }

    /// Raise the `Showing` edge. No-op if already showing.
    pub fn show(&self) {
        self.transition(true, LifecycleEdge::Showing);
    }

    /// Raise the `Hidden` edge. No-op if already hidden.
    pub fn hide(&self) {
        self.transition(false, LifecycleEdge::Hidden);
    }

    /// Register a listener for both edges.
    pub fn on_edge(&self, listener: impl Fn(LifecycleEdge) + 'static) -> Subscription {
        self.inner.listeners.subscribe(Rc::new(listener))
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    fn transition(&self, showing: bool, edge: LifecycleEdge) {
        if self.inner.showing.replace(showing) == showing {
            return;
        }
        tracing::trace!(message = "host.edge", edge = ?edge);
        self.inner.listeners.for_each(|listener| listener(edge));
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("showing", &self.is_showing())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
